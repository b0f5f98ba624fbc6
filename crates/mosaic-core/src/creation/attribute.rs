use super::embeddable::create_embeddable;
use super::state::{CreationState, Registrar, StepResult};
use super::{plural, to_one};
use crate::boot::{self, BootValue};
use crate::mapping::{
    AttributeMapping, AttributeMetadata, BasicAttributeMapping, DiscriminatedAttributeMapping,
    EmbeddedAttributeMapping, EntityId, ManagedTypeId, PartRef, SelectableMapping,
    SelectableMappings, SubtypeSet,
};
use crate::{Error, NavigableRole, PropertyAccess, Result};

/// The managed type an attribute is being built for.
#[derive(Debug, Clone)]
pub(crate) struct Declaring {
    pub(crate) owner: ManagedTypeId,

    /// Role of the owner; attribute roles append to it.
    pub(crate) role: NavigableRole,

    /// Entity the owner ultimately belongs to.
    pub(crate) entity: EntityId,

    /// Table expression the owner's columns live in.
    pub(crate) table: String,
}

pub(crate) fn metadata(
    owner: ManagedTypeId,
    role: NavigableRole,
    property: &boot::Property,
    position: usize,
    access: PropertyAccess,
    declared_by: SubtypeSet,
) -> AttributeMetadata {
    AttributeMetadata {
        name: property.name.clone(),
        role,
        position,
        declaring: owner,
        fetch_timing: property.fetch_timing,
        fetch_style: property.fetch_style,
        mutable: property.updatable,
        nullable: property.optional,
        insertable: property.insertable,
        updatable: property.updatable,
        optimistic_lock: property.optimistic_lock,
        natural_id: property.natural_id,
        declared_by,
        access,
    }
}

/// Builds the mapping of one boot property, dispatching on the kind of its
/// value. Association and collection keys are resolved by steps queued here.
pub(crate) fn build_attribute<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    declaring: &Declaring,
    property: &boot::Property,
    index: usize,
    access: PropertyAccess,
    declared_by: SubtypeSet,
) -> StepResult<AttributeMapping> {
    let id = declaring.owner.attribute(index);
    let role = declaring.role.append(&property.name);
    let meta = metadata(declaring.owner, role.clone(), property, index, access, declared_by);

    state.metamodel.register_role(role.clone(), PartRef::Attribute(id))?;

    let mapping = match &property.value {
        BootValue::Basic(basic) => AttributeMapping::Basic(BasicAttributeMapping {
            selectable: SelectableMappings::single(basic_selectable(
                state,
                &declaring.table,
                basic,
                property.insertable,
                property.updatable,
            )),
            meta,
        }),
        BootValue::Component(component) => {
            let embeddable = create_embeddable(
                state,
                steps,
                role,
                component,
                Some(component.type_name.clone()),
                declaring.table.clone(),
                declaring.entity,
            )?;

            AttributeMapping::Embedded(EmbeddedAttributeMapping { meta, embeddable })
        }
        BootValue::ToOne(to_one) => to_one::build(state, steps, declaring, id, meta, to_one)?,
        BootValue::Collection(collection) => {
            plural::build(state, steps, declaring, id, meta, collection)?
        }
        BootValue::Any(any) => {
            AttributeMapping::Discriminated(build_discriminated(state, declaring, meta, any)?)
        }
    };

    Ok(mapping)
}

pub(crate) fn basic_selectable(
    state: &CreationState<'_>,
    table: &str,
    basic: &boot::BasicValue,
    insertable: bool,
    updatable: bool,
) -> SelectableMapping {
    let cx = state.cx;
    SelectableMapping::from_boot(
        cx,
        table,
        &basic.selectable,
        cx.jdbc_mapping(basic.ty),
        insertable,
        updatable,
    )
}

/// Looks up an entity named by a mapping.
pub(crate) fn entity_named(
    state: &CreationState<'_>,
    role: &NavigableRole,
    name: &str,
) -> Result<EntityId> {
    state
        .metamodel
        .entities
        .get_index_of(name)
        .map(EntityId)
        .ok_or_else(|| Error::invalid_mapping(role, format!("unknown entity `{name}`")))
}

fn build_discriminated(
    state: &CreationState<'_>,
    declaring: &Declaring,
    meta: AttributeMetadata,
    any: &boot::AnyValue,
) -> Result<DiscriminatedAttributeMapping> {
    let mut meta_values = vec![];

    for (value, entity) in &any.meta_values {
        if !value.is_a(any.discriminator.ty) {
            return Err(Error::invalid_mapping(
                &meta.role,
                format!(
                    "meta value {value:?} is not of type {}",
                    any.discriminator.ty
                ),
            ));
        }

        if meta_values.iter().any(|(candidate, _)| candidate == value) {
            return Err(Error::invalid_mapping(
                &meta.role,
                format!("meta value {value:?} is declared twice"),
            ));
        }

        meta_values.push((value.clone(), entity_named(state, &meta.role, entity)?));
    }

    let discriminator = basic_selectable(
        state,
        &declaring.table,
        &any.discriminator,
        meta.insertable,
        meta.updatable,
    );
    let key = basic_selectable(state, &declaring.table, &any.key, meta.insertable, meta.updatable);

    Ok(DiscriminatedAttributeMapping {
        meta,
        discriminator: SelectableMappings::single(discriminator),
        key: SelectableMappings::single(key),
        meta_values,
    })
}
