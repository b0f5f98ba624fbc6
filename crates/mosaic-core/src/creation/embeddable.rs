use super::attribute::{basic_selectable, build_attribute, Declaring};
use super::state::{register, settle, CreationState, Registrar, StepResult};
use super::Slot;
use crate::boot;
use crate::mapping::{
    AttributeMapping, BasicAttributeMapping, ConcreteEmbeddableType, DiscriminatedAttributeMapping,
    DiscriminatorMapping, EmbeddableId, EmbeddableMappingType, EmbeddedAttributeMapping, EntityId,
    ManagedTypeId, Metamodel, PartRef, SelectableMappings, SubtypeSet, ToOneAttributeMapping,
};
use crate::{Error, NavigableRole, NotReady, Result};

use tracing::debug;

/// Reserves a composite node and queues the creation of its attributes.
pub(crate) fn create_embeddable<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    role: NavigableRole,
    component: &boot::Component,
    type_name: Option<String>,
    table: String,
    entity: EntityId,
) -> StepResult<EmbeddableId> {
    validate_component(&role, component)?;

    let property_order = original_property_order(&role, component)?;
    let id = EmbeddableId(state.metamodel.embeddables.len());

    let discriminator = match &component.discriminator {
        Some(basic) => {
            let discriminator_role = role.append(NavigableRole::DISCRIMINATOR);
            state.metamodel.register_role(
                discriminator_role.clone(),
                PartRef::Discriminator(ManagedTypeId::Embeddable(id)),
            )?;

            Some(DiscriminatorMapping {
                role: discriminator_role,
                selectable: SelectableMappings::single(basic_selectable(
                    state, &table, basic, true, true,
                )),
            })
        }
        None => None,
    };

    let subtypes = component
        .subtypes
        .iter()
        .enumerate()
        .map(|(index, subtype)| ConcreteEmbeddableType {
            index,
            type_name: subtype.type_name.clone(),
            discriminator_value: subtype.discriminator_value.clone(),
            accessors: component
                .properties
                .iter()
                .map(|property| {
                    subtype
                        .properties
                        .iter()
                        .position(|name| *name == property.name)
                        .map(|position| subtype.accessors.resolve(&property.name, position))
                })
                .collect(),
        })
        .collect();

    state.metamodel.embeddables.push(EmbeddableMappingType {
        id,
        role: role.clone(),
        type_name,
        table,
        discriminator,
        subtypes,
        inverse_of: None,
        property_order,
        attributes: Slot::new(),
        selectables: Slot::new(),
    });

    let component = component.clone();

    register(
        steps,
        format!("EmbeddableMappingType({role})#finishInitialization"),
        move |state, steps| finish_initialization(state, steps, id, &component, entity),
    );

    Ok(id)
}

fn validate_component(role: &NavigableRole, component: &boot::Component) -> Result<()> {
    if component.properties.is_empty() {
        return Err(Error::invalid_mapping(role, "composite declares no attributes"));
    }

    let discriminator = match (&component.discriminator, component.subtypes.is_empty()) {
        (None, true) => return Ok(()),
        (None, false) => {
            return Err(Error::invalid_mapping(
                role,
                "composite subtypes require a discriminator",
            ))
        }
        (Some(_), true) => {
            return Err(Error::invalid_mapping(
                role,
                "polymorphic composite declares no subtypes",
            ))
        }
        (Some(discriminator), false) => discriminator,
    };

    if component.subtypes.len() > SubtypeSet::CAPACITY {
        return Err(Error::invalid_mapping(
            role,
            format!(
                "polymorphic composite has {} subtypes; at most {} are supported",
                component.subtypes.len(),
                SubtypeSet::CAPACITY
            ),
        ));
    }

    for (index, subtype) in component.subtypes.iter().enumerate() {
        let value = &subtype.discriminator_value;

        if !value.is_a(discriminator.ty) {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "discriminator value {value:?} of `{}` is not of type {}",
                    subtype.type_name, discriminator.ty
                ),
            ));
        }

        if let Some(other) = component.subtypes[..index]
            .iter()
            .find(|other| {
                other.discriminator_value == *value || other.type_name == subtype.type_name
            })
        {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "subtypes `{}` and `{}` are not distinct",
                    other.type_name, subtype.type_name
                ),
            ));
        }

        if let Some(name) = subtype
            .properties
            .iter()
            .find(|name| component.property_named(name).is_none())
        {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "subtype `{}` declares unknown attribute `{name}`",
                    subtype.type_name
                ),
            ));
        }
    }

    for property in &component.properties {
        if !component
            .subtypes
            .iter()
            .any(|subtype| subtype.properties.contains(&property.name))
        {
            return Err(Error::invalid_mapping(
                role,
                format!("attribute `{}` is declared by no subtype", property.name),
            ));
        }
    }

    Ok(())
}

/// Canonical index of every property, listed in original declaration order.
fn original_property_order(
    role: &NavigableRole,
    component: &boot::Component,
) -> Result<Option<Vec<usize>>> {
    let Some(names) = &component.original_property_order else {
        return Ok(None);
    };

    if names.len() != component.properties.len() {
        return Err(Error::invalid_mapping(
            role,
            format!(
                "original property order lists {} attribute(s), composite has {}",
                names.len(),
                component.properties.len()
            ),
        ));
    }

    let mut order = Vec::with_capacity(names.len());

    for name in names {
        let Some(index) = component
            .properties
            .iter()
            .position(|property| property.name == *name)
        else {
            return Err(Error::invalid_mapping(
                role,
                format!("original property order names unknown attribute `{name}`"),
            ));
        };

        if order.contains(&index) {
            return Err(Error::invalid_mapping(
                role,
                format!("original property order lists `{name}` twice"),
            ));
        }

        order.push(index);
    }

    Ok(Some(order))
}

fn finish_initialization<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: EmbeddableId,
    component: &boot::Component,
    entity: EntityId,
) -> StepResult {
    let embeddable = state.metamodel.embeddable_mut(id);
    embeddable.attributes.begin();

    let declaring = Declaring {
        owner: ManagedTypeId::Embeddable(id),
        role: embeddable.role.clone(),
        entity,
        table: embeddable.table.clone(),
    };

    let mut attributes = Vec::with_capacity(component.properties.len());

    for (index, property) in component.properties.iter().enumerate() {
        let declared_by = if component.is_polymorphic() {
            let mut declared_by = SubtypeSet::empty();

            for (subtype, declaring) in component.subtypes.iter().enumerate() {
                if declaring.properties.contains(&property.name) {
                    declared_by.insert(subtype);
                }
            }

            declared_by
        } else {
            SubtypeSet::all()
        };

        let access = component.accessors.resolve(&property.name, index);

        attributes.push(build_attribute(
            state,
            steps,
            &declaring,
            property,
            index,
            access,
            declared_by,
        )?);
    }

    state.metamodel.embeddable_mut(id).attributes.complete(attributes);

    register(
        steps,
        format!("EmbeddableMappingType({})#initColumnMappings", declaring.role),
        move |state, _| init_column_mappings(state, id),
    );

    Ok(())
}

/// Flattens the attributes' columns, with the discriminator last.
fn init_column_mappings(state: &mut CreationState<'_>, id: EmbeddableId) -> StepResult {
    state.metamodel.embeddable_mut(id).selectables.begin();
    let result = collect_selectables(&state.metamodel, id);
    settle(&mut state.metamodel.embeddable_mut(id).selectables, result)
}

fn collect_selectables(mm: &Metamodel, id: EmbeddableId) -> StepResult<SelectableMappings> {
    let embeddable = mm.embeddable(id);

    let mut parts = embeddable
        .attributes()?
        .iter()
        .map(|attr| attr.selectables(mm))
        .collect::<core::result::Result<Vec<_>, NotReady>>()?;

    if let Some(discriminator) = &embeddable.discriminator {
        parts.push(discriminator.selectable.clone());
    }

    Ok(SelectableMappings::concat(&parts))
}

/// Synthesizes the key-side mirror of `original`: the same attributes,
/// mapped onto the foreign-key columns `selectables` of `table`.
///
/// `selectables` follow the canonical column order of `original`.
pub(crate) fn create_inverse_embeddable<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    original: EmbeddableId,
    role: NavigableRole,
    table: String,
    selectables: SelectableMappings,
) -> Result<EmbeddableId> {
    let id = EmbeddableId(state.metamodel.embeddables.len());
    let source = state.metamodel.embeddable(original);

    let discriminator = match (&source.discriminator, selectables.len()) {
        (Some(_), len) if len > 0 => Some(DiscriminatorMapping {
            role: role.append(NavigableRole::DISCRIMINATOR),
            selectable: selectables.slice(len - 1, 1),
        }),
        _ => None,
    };

    debug!(
        role = %role,
        original = %source.role,
        columns = selectables.len(),
        "key-side composite synthesized"
    );

    let inverse = EmbeddableMappingType {
        id,
        role: role.clone(),
        type_name: source.type_name.clone(),
        table,
        discriminator,
        subtypes: source.subtypes.clone(),
        inverse_of: Some(original),
        property_order: source.property_order.clone(),
        attributes: Slot::new(),
        selectables: Slot::ready(selectables),
    };

    if let Some(discriminator) = &inverse.discriminator {
        state.metamodel.register_role(
            discriminator.role.clone(),
            PartRef::Discriminator(ManagedTypeId::Embeddable(id)),
        )?;
    }

    state.metamodel.embeddables.push(inverse);
    state.metamodel.register_role(role.clone(), PartRef::Embeddable(id))?;

    register(
        steps,
        format!("EmbeddableMappingType({role})#inverseAttributes"),
        move |state, steps| init_inverse_attributes(state, steps, id, original),
    );

    Ok(id)
}

/// Mirrors the attributes of `original` onto the key columns of `id`,
/// handing each attribute the slice of columns it spans.
fn init_inverse_attributes<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: EmbeddableId,
    original: EmbeddableId,
) -> StepResult {
    state.metamodel.embeddable_mut(id).attributes.begin();

    // Everything that may not be built yet is read before anything is
    // created, so a retry starts from a clean state.
    let originals = match mirror_plan(&state.metamodel, original) {
        Ok(originals) => originals,
        Err(interrupt) => {
            state.metamodel.embeddable_mut(id).attributes.wait();
            return Err(interrupt);
        }
    };

    let inverse = state.metamodel.embeddable(id);
    let role = inverse.role.clone();
    let table = inverse.table.clone();
    let selectables = inverse.selectables()?.clone();

    let mut attributes = Vec::with_capacity(originals.len());
    let mut position = 0;

    for (index, (attr, span)) in originals.into_iter().enumerate() {
        let columns = selectables.slice(position, span);
        position += span;

        let attr_role = role.append(attr.name());
        let mut meta = attr.metadata().clone();
        meta.role = attr_role.clone();
        meta.declaring = ManagedTypeId::Embeddable(id);

        let mirrored = match attr {
            AttributeMapping::Basic(_) => AttributeMapping::Basic(BasicAttributeMapping {
                meta,
                selectable: columns,
            }),
            AttributeMapping::Embedded(attr) => {
                let embeddable = create_inverse_embeddable(
                    state,
                    steps,
                    attr.embeddable,
                    attr_role.clone(),
                    table.clone(),
                    columns,
                )?;

                AttributeMapping::Embedded(EmbeddedAttributeMapping { meta, embeddable })
            }
            AttributeMapping::ToOne(attr) => {
                let foreign_key = attr.foreign_key()?;

                AttributeMapping::ToOne(ToOneAttributeMapping {
                    meta,
                    key_table: table.clone(),
                    key_selectables: Slot::ready(columns),
                    foreign_key: Slot::ready(foreign_key),
                    bidirectional_attribute: Slot::ready(None),
                    ..attr
                })
            }
            AttributeMapping::Discriminated(attr) => {
                AttributeMapping::Discriminated(DiscriminatedAttributeMapping {
                    meta,
                    discriminator: columns.slice(0, 1),
                    key: columns.slice(1, 1),
                    meta_values: attr.meta_values,
                })
            }
            AttributeMapping::Plural(_) => {
                return Err(Error::invalid_mapping(
                    &attr_role,
                    "a collection cannot be part of a referenced key",
                )
                .into())
            }
        };

        let part = PartRef::Attribute(ManagedTypeId::Embeddable(id).attribute(index));
        state.metamodel.register_role(attr_role, part)?;
        attributes.push(mirrored);
    }

    state.metamodel.embeddable_mut(id).attributes.complete(attributes);
    Ok(())
}

/// The attributes of `original` with their column spans.
fn mirror_plan(
    mm: &Metamodel,
    original: EmbeddableId,
) -> StepResult<Vec<(AttributeMapping, usize)>> {
    let mut plan = vec![];

    for attr in mm.embeddable(original).attributes()? {
        if let AttributeMapping::ToOne(to_one) = attr {
            to_one.foreign_key()?;
        }

        plan.push((attr.clone(), attr.jdbc_type_count(mm)?));
    }

    Ok(plan)
}
