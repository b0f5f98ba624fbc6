use super::attribute::{basic_selectable, entity_named, Declaring};
use super::embeddable::create_embeddable;
use super::foreign_key::{
    check_mapped_by_target, implicit_column_prefix, resolve_foreign_key, KeySide, TargetSide,
};
use super::state::{register_post, CreationState, Registrar, StepResult};
use super::Slot;
use crate::boot::{self, CollectionElement};
use crate::mapping::{
    AttributeId, AttributeMapping, AttributeMetadata, CollectionPart, CollectionPartNature,
    EntityId, ForeignKeyId, Metamodel, PartRef, PluralAttributeMapping, SelectableMappings,
};
use crate::{err, Error, NavigableRole};

/// Builds a collection attribute: its element, index and row identifier
/// parts. The key descriptor, and the element foreign key of a
/// many-to-many, are resolved by post-initialization steps.
pub(crate) fn build<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    declaring: &Declaring,
    id: AttributeId,
    meta: AttributeMetadata,
    collection: &boot::Collection,
) -> StepResult<AttributeMapping> {
    let role = meta.role.clone();
    let cx = state.cx;

    let collection_table = match (&collection.table, &collection.element) {
        (Some(table), _) => cx.table_expression(table),
        (None, CollectionElement::OneToMany { entity }) => {
            let entity = entity_named(state, &role, entity)?;
            state.metamodel.entity(entity).table.clone()
        }
        (None, element) => {
            return Err(Error::invalid_mapping(
                &role,
                format!(
                    "a collection of {} elements requires a collection table",
                    element_kind(element)
                ),
            )
            .into())
        }
    };

    let element_role = role.append(NavigableRole::ELEMENT);
    state.metamodel.register_role(
        element_role.clone(),
        PartRef::CollectionPart {
            attribute: id,
            nature: CollectionPartNature::Element,
        },
    )?;

    let element = match &collection.element {
        CollectionElement::Basic(basic) => CollectionPart::Basic {
            selectable: SelectableMappings::single(basic_selectable(
                state,
                &collection_table,
                basic,
                true,
                true,
            )),
            role: element_role,
        },
        CollectionElement::Component(component) => {
            let embeddable = create_embeddable(
                state,
                steps,
                element_role.clone(),
                component,
                Some(component.type_name.clone()),
                collection_table.clone(),
                declaring.entity,
            )?;

            CollectionPart::Embedded {
                role: element_role,
                embeddable,
            }
        }
        CollectionElement::OneToMany { entity } => CollectionPart::OneToMany {
            entity: entity_named(state, &role, entity)?,
            role: element_role,
        },
        CollectionElement::ManyToMany {
            entity,
            referenced_property,
            ..
        } => CollectionPart::ManyToMany {
            entity: entity_named(state, &role, entity)?,
            referenced_property: referenced_property.clone(),
            foreign_key: Slot::new(),
            role: element_role,
        },
    };

    let index = match &collection.index {
        Some(index) => Some(basic_part(
            state,
            id,
            &role,
            NavigableRole::INDEX,
            CollectionPartNature::Index,
            &collection_table,
            index,
        )?),
        None => None,
    };

    let identifier = match &collection.identifier {
        Some(identifier) => Some(basic_part(
            state,
            id,
            &role,
            NavigableRole::COLLECTION_ID,
            CollectionPartNature::Identifier,
            &collection_table,
            identifier,
        )?),
        None => None,
    };

    let is_many_to_many = matches!(element, CollectionPart::ManyToMany { .. });

    let mapping = PluralAttributeMapping {
        meta,
        nature: collection.nature,
        collection_table,
        element,
        index,
        identifier,
        mapped_by: collection.mapped_by.clone(),
        key: Slot::new(),
    };

    let owner = declaring.entity;
    let boot = collection.clone();

    register_post(
        steps,
        format!("PluralAttributeMapping({role})#keyDescriptor"),
        move |state, steps| init_key_descriptor(state, steps, id, owner, &boot),
    );

    if is_many_to_many {
        let boot = collection.clone();

        register_post(
            steps,
            format!("PluralAttributeMapping({role})#elementForeignKey"),
            move |state, steps| init_element_foreign_key(state, steps, id, &boot),
        );
    }

    Ok(AttributeMapping::Plural(mapping))
}

fn element_kind(element: &CollectionElement) -> &'static str {
    match element {
        CollectionElement::Basic(_) => "basic",
        CollectionElement::Component(_) => "composite",
        CollectionElement::OneToMany { .. } => "one-to-many",
        CollectionElement::ManyToMany { .. } => "many-to-many",
    }
}

#[allow(clippy::too_many_arguments)]
fn basic_part(
    state: &mut CreationState<'_>,
    id: AttributeId,
    role: &NavigableRole,
    local: &str,
    nature: CollectionPartNature,
    table: &str,
    basic: &boot::BasicValue,
) -> StepResult<CollectionPart> {
    let role = role.append(local);
    let selectable = SelectableMappings::single(basic_selectable(state, table, basic, true, true));

    state.metamodel.register_role(
        role.clone(),
        PartRef::CollectionPart {
            attribute: id,
            nature,
        },
    )?;

    Ok(CollectionPart::Basic { role, selectable })
}

fn plural(mm: &Metamodel, id: AttributeId) -> StepResult<&PluralAttributeMapping> {
    let attr = mm.attribute(id)?;

    attr.as_plural()
        .ok_or_else(|| err!("{id:?} is a {} attribute, not a collection", attr.kind_name()).into())
}

fn plural_mut<'s>(
    state: &'s mut CreationState<'_>,
    id: AttributeId,
) -> StepResult<&'s mut PluralAttributeMapping> {
    state
        .metamodel
        .attribute_mut(id)
        .and_then(AttributeMapping::as_plural_mut)
        .ok_or_else(|| err!("{id:?} is not a built collection attribute").into())
}

/// Resolves the foreign key joining the collection rows to their owner.
///
/// A `mapped_by` collection reuses the key of the owning attribute on the
/// element entity. Otherwise the key columns reference the owner's
/// identifier.
fn init_key_descriptor<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: AttributeId,
    owner: EntityId,
    boot: &boot::Collection,
) -> StepResult {
    plural_mut(state, id)?.key.begin();

    let result = match &boot.mapped_by {
        Some(mapped_by) => mapped_key(&state.metamodel, id, owner, mapped_by),
        None => owned_key(state, steps, id, owner, boot),
    };

    let attr = plural_mut(state, id)?;

    match result {
        Ok(foreign_key) => {
            attr.key.complete(foreign_key);
            Ok(())
        }
        Err(interrupt) => {
            attr.key.wait();
            Err(interrupt)
        }
    }
}

fn mapped_key(
    mm: &Metamodel,
    id: AttributeId,
    owner: EntityId,
    mapped_by: &str,
) -> StepResult<ForeignKeyId> {
    let attr = plural(mm, id)?;
    let role = &attr.meta.role;

    let Some(element) = attr.element_entity() else {
        return Err(Error::invalid_mapping(
            role,
            "a mapped-by collection must have entity elements",
        )
        .into());
    };

    let element_name = &mm.entity(element).name;
    let owning_name = format!("{element_name}.{mapped_by}");

    let Some(owning) = mm.find_attribute(element, mapped_by)? else {
        return Err(Error::invalid_mapping(
            role,
            format!("mapped-by attribute `{owning_name}` does not exist"),
        )
        .into());
    };

    match mm.attribute(owning)? {
        AttributeMapping::ToOne(owning) if owning.is_owning() => {
            check_mapped_by_target(mm, role, &owning_name, owning.target, owner)?;
            Ok(owning.foreign_key()?)
        }
        // The inverse side of a many-to-many joins on the owning side's
        // element foreign key.
        AttributeMapping::Plural(owning) if owning.mapped_by.is_none() => {
            match (owning.element_entity(), owning.element.foreign_key()) {
                (Some(referenced), Some(foreign_key)) => {
                    check_mapped_by_target(mm, role, &owning_name, referenced, owner)?;
                    Ok(foreign_key?)
                }
                _ => Err(Error::invalid_mapping(
                    role,
                    format!("mapped-by collection `{owning_name}` is not a many-to-many"),
                )
                .into()),
            }
        }
        other => Err(Error::invalid_mapping(
            role,
            format!(
                "mapped-by attribute `{owning_name}` cannot own this collection, found {}",
                other.kind_name()
            ),
        )
        .into()),
    }
}

fn owned_key<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: AttributeId,
    owner: EntityId,
    boot: &boot::Collection,
) -> StepResult<ForeignKeyId> {
    let mm = &state.metamodel;
    let attr = plural(mm, id)?;
    let role = attr.meta.role.clone();
    let target = TargetSide::resolve(mm, &role, owner, None)?;

    let selectables = target.key_selectables(
        mm,
        state.cx,
        &role,
        &attr.collection_table,
        &boot.key_columns,
        &implicit_column_prefix(&mm.entity(owner).name),
        boot.sorted,
        (true, true),
    )?;

    let key = KeySide {
        part: PartRef::Attribute(id),
        table: attr.collection_table.clone(),
        selectables,
    };

    resolve_foreign_key(state, steps, &role, key, target)
}

/// Resolves the foreign key from the join table of a many-to-many to the
/// element entity.
fn init_element_foreign_key<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: AttributeId,
    boot: &boot::Collection,
) -> StepResult {
    if let CollectionPart::ManyToMany { foreign_key, .. } = &mut plural_mut(state, id)?.element {
        foreign_key.begin();
    }

    let result = match &boot.mapped_by {
        Some(mapped_by) => mapped_element_key(&state.metamodel, id, mapped_by),
        None => owned_element_key(state, steps, id, boot),
    };

    let CollectionPart::ManyToMany { foreign_key, .. } = &mut plural_mut(state, id)?.element else {
        return Err(err!("{id:?} is not a many-to-many collection").into());
    };

    match result {
        Ok(resolved) => {
            foreign_key.complete(resolved);
            Ok(())
        }
        Err(interrupt) => {
            foreign_key.wait();
            Err(interrupt)
        }
    }
}

/// The inverse side's elements are the owning side's owners, so its element
/// key is the owning side's key descriptor.
fn mapped_element_key(
    mm: &Metamodel,
    id: AttributeId,
    mapped_by: &str,
) -> StepResult<ForeignKeyId> {
    let attr = plural(mm, id)?;

    let owning = attr
        .element_entity()
        .map(|element| mm.find_attribute(element, mapped_by))
        .transpose()?
        .flatten()
        .map(|owning| mm.attribute(owning))
        .transpose()?;

    match owning {
        Some(AttributeMapping::Plural(owning)) => Ok(owning.key_descriptor()?),
        _ => Err(Error::invalid_mapping(
            &attr.meta.role,
            format!("mapped-by attribute `{mapped_by}` is not a many-to-many collection"),
        )
        .into()),
    }
}

fn owned_element_key<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: AttributeId,
    boot: &boot::Collection,
) -> StepResult<ForeignKeyId> {
    let CollectionElement::ManyToMany { columns, .. } = &boot.element else {
        return Err(err!("{id:?} is not a many-to-many collection").into());
    };

    let mm = &state.metamodel;
    let attr = plural(mm, id)?;

    let CollectionPart::ManyToMany {
        role,
        entity,
        referenced_property,
        ..
    } = &attr.element
    else {
        return Err(err!("{id:?} is not a many-to-many collection").into());
    };

    let role = role.clone();
    let target = TargetSide::resolve(mm, &role, *entity, referenced_property.as_deref())?;

    let selectables = target.key_selectables(
        mm,
        state.cx,
        &role,
        &attr.collection_table,
        columns,
        &implicit_column_prefix(&mm.entity(*entity).name),
        boot.sorted,
        (true, true),
    )?;

    let key = KeySide {
        part: PartRef::CollectionPart {
            attribute: id,
            nature: CollectionPartNature::Element,
        },
        table: attr.collection_table.clone(),
        selectables,
    };

    resolve_foreign_key(state, steps, &role, key, target)
}
