use super::attribute::{entity_named, Declaring};
use super::foreign_key::{
    check_mapped_by_target, implicit_column_prefix, relative_path, resolve_foreign_key, KeySide,
    TargetSide,
};
use super::state::{register, register_post, settle, CreationState, Registrar, StepResult};
use super::Slot;
use crate::boot;
use crate::mapping::{
    AttributeId, AttributeMapping, AttributeMetadata, EntityId, ForeignKeyId, Metamodel, PartRef,
    SelectableMappings, SideNature, ToOneAttributeMapping,
};
use crate::Error;

/// Builds a to-one attribute and queues the resolution of its key columns
/// and foreign key.
///
/// The owning side holds the join columns. The inverse side of a one-to-one
/// (`mapped_by`) has none and borrows the owning side's foreign key.
pub(crate) fn build<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    declaring: &Declaring,
    id: AttributeId,
    meta: AttributeMetadata,
    to_one: &boot::ToOne,
) -> StepResult<AttributeMapping> {
    let role = meta.role.clone();
    let target = entity_named(state, &role, &to_one.entity)?;

    let side = match &to_one.mapped_by {
        Some(_) if !to_one.columns.is_empty() => {
            return Err(Error::invalid_mapping(
                &role,
                "the inverse side of an association declares no columns",
            )
            .into())
        }
        Some(_) => SideNature::Target,
        None => SideNature::Key,
    };

    let key_selectables = match side {
        SideNature::Key => Slot::new(),
        SideNature::Target => Slot::ready(SelectableMappings::empty()),
    };

    let mapping = ToOneAttributeMapping {
        meta,
        kind: to_one.kind,
        target,
        referenced_property: to_one.referenced_property.clone(),
        side,
        mapped_by: to_one.mapped_by.clone(),
        not_found: to_one.not_found,
        constrained: to_one.constrained,
        key_table: declaring.table.clone(),
        key_selectables,
        foreign_key: Slot::new(),
        bidirectional_attribute: Slot::new(),
    };

    if side == SideNature::Key {
        let to_one = to_one.clone();

        register(
            steps,
            format!("ToOneAttributeMapping({role})#keySelectables"),
            move |state, _| init_key_selectables(state, id, &to_one),
        );
    }

    let entity = declaring.entity;

    register_post(
        steps,
        format!("ToOneAttributeMapping({role})#foreignKey"),
        move |state, steps| init_foreign_key(state, steps, id, entity),
    );

    Ok(AttributeMapping::ToOne(mapping))
}

pub(crate) fn to_one(mm: &Metamodel, id: AttributeId) -> StepResult<&ToOneAttributeMapping> {
    let attr = mm.attribute(id)?;

    attr.as_to_one().ok_or_else(|| {
        crate::err!("{:?} is a {} attribute, not a to-one", id, attr.kind_name()).into()
    })
}

fn to_one_mut<'s>(
    state: &'s mut CreationState<'_>,
    id: AttributeId,
) -> StepResult<&'s mut ToOneAttributeMapping> {
    state
        .metamodel
        .attribute_mut(id)
        .and_then(AttributeMapping::as_to_one_mut)
        .ok_or_else(|| crate::err!("{id:?} is not a built to-one attribute").into())
}

/// Resolves the join columns of an owning to-one against the identifier
/// (or referenced unique key) of the target entity.
fn init_key_selectables(
    state: &mut CreationState<'_>,
    id: AttributeId,
    boot: &boot::ToOne,
) -> StepResult {
    to_one_mut(state, id)?.key_selectables.begin();
    let result = key_selectables(state, id, boot);
    settle(&mut to_one_mut(state, id)?.key_selectables, result)
}

fn key_selectables(
    state: &CreationState<'_>,
    id: AttributeId,
    boot: &boot::ToOne,
) -> StepResult<SelectableMappings> {
    let mm = &state.metamodel;
    let attr = to_one(mm, id)?;
    let role = &attr.meta.role;
    let target = TargetSide::resolve(mm, role, attr.target, attr.referenced_property.as_deref())?;

    target.key_selectables(
        mm,
        state.cx,
        role,
        &attr.key_table,
        &boot.columns,
        &implicit_column_prefix(&attr.meta.name),
        boot.sorted,
        (attr.meta.insertable, attr.meta.updatable),
    )
}

/// Resolves the foreign key of a to-one and the attribute pointing back at
/// it, if any.
fn init_foreign_key<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: AttributeId,
    entity: EntityId,
) -> StepResult {
    {
        let attr = to_one_mut(state, id)?;
        attr.foreign_key.begin();
        attr.bidirectional_attribute.begin();
    }

    let result = match to_one(&state.metamodel, id)?.mapped_by.clone() {
        Some(mapped_by) => inverse_foreign_key(&state.metamodel, id, entity, &mapped_by)
            .map(|fk| (fk, Some(mapped_by))),
        None => owning_foreign_key(state, steps, id, entity),
    };

    let (foreign_key, bidirectional) = match result {
        Ok(resolved) => resolved,
        Err(interrupt) => {
            let attr = to_one_mut(state, id)?;
            attr.foreign_key.wait();
            attr.bidirectional_attribute.wait();
            return Err(interrupt);
        }
    };

    let attr = to_one_mut(state, id)?;
    attr.foreign_key.complete(foreign_key);
    attr.bidirectional_attribute.complete(bidirectional);
    Ok(())
}

/// The inverse side shares the foreign key of the owning attribute named by
/// `mapped_by`, once that one is resolved.
fn inverse_foreign_key(
    mm: &Metamodel,
    id: AttributeId,
    entity: EntityId,
    mapped_by: &str,
) -> StepResult<ForeignKeyId> {
    let attr = to_one(mm, id)?;
    let target = mm.entity(attr.target);

    let Some(owning) = mm.find_attribute(attr.target, mapped_by)? else {
        return Err(Error::invalid_mapping(
            &attr.meta.role,
            format!("mapped-by attribute `{}.{mapped_by}` does not exist", target.name),
        )
        .into());
    };

    match mm.attribute(owning)? {
        AttributeMapping::ToOne(owning) if owning.is_owning() => {
            let owning_name = format!("{}.{mapped_by}", target.name);
            check_mapped_by_target(mm, &attr.meta.role, &owning_name, owning.target, entity)?;
            Ok(owning.foreign_key()?)
        }
        other => Err(Error::invalid_mapping(
            &attr.meta.role,
            format!(
                "mapped-by attribute `{}.{mapped_by}` must be an owning to-one, found {}",
                target.name,
                other.kind_name()
            ),
        )
        .into()),
    }
}

fn owning_foreign_key<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: AttributeId,
    entity: EntityId,
) -> StepResult<(ForeignKeyId, Option<String>)> {
    let mm = &state.metamodel;
    let root = mm.entity(entity).root;
    let attr = to_one(mm, id)?;
    let role = attr.meta.role.clone();

    let key = KeySide {
        part: PartRef::Attribute(id),
        table: attr.key_table.clone(),
        selectables: attr.key_selectables()?.clone(),
    };
    let target = TargetSide::resolve(mm, &role, attr.target, attr.referenced_property.as_deref())?;

    // An attribute of the target whose `mapped_by` names this one points back
    // at it.
    let path = relative_path(&mm.entity(entity).role, &role);
    let bidirectional = mm
        .entity(attr.target)
        .attributes()?
        .iter()
        .find(|candidate| {
            let (mapped_by, points_at) = match candidate {
                AttributeMapping::ToOne(candidate) => {
                    (candidate.mapped_by.as_deref(), Some(candidate.target))
                }
                AttributeMapping::Plural(candidate) => {
                    (candidate.mapped_by.as_deref(), candidate.element_entity())
                }
                _ => (None, None),
            };

            mapped_by == Some(path)
                && points_at.is_some_and(|target| mm.entity(target).root == root)
        })
        .map(|candidate| candidate.name().to_string());

    let foreign_key = resolve_foreign_key(state, steps, &role, key, target)?;
    Ok((foreign_key, bidirectional))
}
