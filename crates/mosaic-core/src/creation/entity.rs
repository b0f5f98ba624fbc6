use super::attribute::{build_attribute, metadata, Declaring};
use super::embeddable::create_embeddable;
use super::state::{progress, register, settle, CreationState, Registrar, StepResult};
use super::{Scheduler, Slot};
use crate::boot::{self, BootValue, Identifier, InheritanceStrategy, PersistentClass};
use crate::mapping::{
    BasicAttributeMapping, EmbeddedAttributeMapping, EntityDiscriminatorMapping, EntityId,
    EntityIdentifierMapping, EntityMappingType, ManagedTypeId, Metamodel, NaturalIdMapping,
    NonAggregatedIdentifier, PartRef, SelectableMapping, SelectableMappings, SubtypeSet,
};
use crate::{AccessorTable, Error, NavigableRole, PropertyAccess, Result, Value};

use tracing::debug;

/// Reserves an entity node for every boot class, in declaration order, and
/// queues its preparation.
///
/// Shells carry everything later steps may need before the entity itself is
/// prepared: identity, table and place in the inheritance hierarchy.
pub(crate) fn declare_entities<'a>(
    state: &mut CreationState<'a>,
    scheduler: &mut Scheduler<CreationState<'a>>,
) -> Result<()> {
    let boot = state.boot;
    let cx = state.cx;

    for (index, class) in boot.entities().enumerate() {
        let id = EntityId(index);
        let role = NavigableRole::new(&class.name);
        let root_class = root_class_of(boot, &role, class)?;

        if !class.is_root() && class.identifier.is_some() {
            return Err(Error::invalid_mapping(
                &role,
                "a subclass cannot redeclare the identifier",
            ));
        }

        let strategy = root_class.inheritance;

        let table = match strategy {
            InheritanceStrategy::SingleTable => cx.entity_table(
                &NavigableRole::new(&root_class.name),
                &root_class.name,
                root_class.table.as_ref(),
            )?,
            InheritanceStrategy::Joined | InheritanceStrategy::Union => {
                cx.entity_table(&role, &class.name, class.table.as_ref())?
            }
        };

        // Members of a discriminated hierarchy default to their entity name.
        let discriminator_value = class.discriminator_value.clone().or_else(|| {
            root_class
                .discriminator
                .as_ref()
                .map(|_| Value::from(class.name.as_str()))
        });

        let entity = EntityMappingType {
            id,
            name: class.name.clone(),
            role: role.clone(),
            table,
            root: entity_id(boot, &root_class.name),
            superclass: class
                .superclass
                .as_deref()
                .map(|superclass| entity_id(boot, superclass)),
            inheritance: strategy,
            discriminator_value,
            identifier: Slot::new(),
            attributes: Slot::new(),
            discriminator: Slot::new(),
            natural_id: Slot::new(),
            selectables: Slot::new(),
        };

        state.metamodel.entities.insert(class.name.clone(), entity);
        state.metamodel.register_role(role, PartRef::Entity(id))?;

        scheduler.register(
            format!("EntityMappingType({})#prepareMappingModel", class.name),
            move |state, steps| progress(prepare_mapping_model(state, steps, id)),
        );
    }

    Ok(())
}

fn root_class_of<'a>(
    boot: &'a boot::BootModel,
    role: &NavigableRole,
    class: &'a PersistentClass,
) -> Result<&'a PersistentClass> {
    let root = boot.root_of(&class.name).unwrap_or(class);

    match &root.superclass {
        None => Ok(root),
        Some(superclass) if boot.get(superclass).is_none() => Err(Error::invalid_mapping(
            role,
            format!("unknown superclass `{superclass}`"),
        )),
        Some(_) => Err(Error::invalid_mapping(role, "inheritance hierarchy is cyclic")),
    }
}

/// Boot classes are declared before any step runs, so every name seen by a
/// step has an entity ID.
fn entity_id(boot: &boot::BootModel, name: &str) -> EntityId {
    EntityId(
        boot.entities
            .get_index_of(name)
            .expect("entity declared in boot model"),
    )
}

/// Builds the identifier, attributes, discriminator and natural id of an
/// entity. Attributes of superclasses come first, root first.
fn prepare_mapping_model<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: EntityId,
) -> StepResult {
    let boot = state.boot;
    let entity = state.metamodel.entity(id);
    let name = entity.name.clone();
    let role = entity.role.clone();
    let table = entity.table.clone();
    let strategy = entity.inheritance;
    let root_table = state.metamodel.entity(entity.root).table.clone();

    let hierarchy = boot.hierarchy(&name);
    let (Some(&class), Some(&root_class)) = (hierarchy.first(), hierarchy.last()) else {
        return Err(Error::invalid_mapping(&role, "entity is missing from the boot model").into());
    };

    {
        let entity = state.metamodel.entity_mut(id);
        entity.identifier.begin();
        entity.attributes.begin();
        entity.discriminator.begin();
        entity.natural_id.begin();
    }

    // Joined subclasses share the root's primary key columns.
    let identifier_table = match strategy {
        InheritanceStrategy::Union => &table,
        InheritanceStrategy::SingleTable | InheritanceStrategy::Joined => &root_table,
    };

    let identifier = build_identifier(
        state,
        steps,
        id,
        &role,
        class,
        root_class,
        identifier_table,
    )?;

    let mut attributes = vec![];

    for declaring_class in hierarchy.iter().rev() {
        let table = match strategy {
            InheritanceStrategy::Joined => state
                .metamodel
                .entity(entity_id(boot, &declaring_class.name))
                .table
                .clone(),
            InheritanceStrategy::SingleTable | InheritanceStrategy::Union => table.clone(),
        };

        let declaring = Declaring {
            owner: ManagedTypeId::Entity(id),
            role: role.clone(),
            entity: id,
            table,
        };

        for property in &declaring_class.properties {
            let index = attributes.len();
            // Field 0 of an entity instance holds the identifier.
            let access = class.accessors.resolve(&property.name, index + 1);

            attributes.push(build_attribute(
                state,
                steps,
                &declaring,
                property,
                index,
                access,
                SubtypeSet::all(),
            )?);
        }
    }

    let discriminator = build_discriminator(state, id, &role, root_class)?;

    let natural_id_attributes: Vec<_> = attributes
        .iter()
        .enumerate()
        .filter(|(_, attr)| attr.metadata().natural_id)
        .map(|(index, _)| ManagedTypeId::Entity(id).attribute(index))
        .collect();

    let natural_id = if natural_id_attributes.is_empty() {
        None
    } else {
        Some(NaturalIdMapping {
            role: role.clone(),
            mutable: attributes
                .iter()
                .any(|attr| attr.metadata().natural_id && attr.metadata().updatable),
            attributes: natural_id_attributes,
        })
    };

    debug!(
        entity = %name,
        attributes = attributes.len(),
        table = %table,
        "entity prepared"
    );

    let entity = state.metamodel.entity_mut(id);
    entity.identifier.complete(identifier);
    entity.attributes.complete(attributes);
    entity.discriminator.complete(discriminator);
    entity.natural_id.complete(natural_id);

    register(
        steps,
        format!("EntityMappingType({name})#selectables"),
        move |state, _| init_selectables(state, id),
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_identifier<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    id: EntityId,
    role: &NavigableRole,
    class: &PersistentClass,
    root_class: &PersistentClass,
    table: &str,
) -> StepResult<EntityIdentifierMapping> {
    let Some(identifier) = &root_class.identifier else {
        return Err(Error::invalid_mapping(
            role,
            format!("entity `{}` declares no identifier", root_class.name),
        )
        .into());
    };

    let owner = ManagedTypeId::Entity(id);
    let cx = state.cx;

    match identifier {
        Identifier::Simple(property) => {
            let BootValue::Basic(basic) = &property.value else {
                return Err(Error::invalid_mapping(
                    role,
                    format!(
                        "simple identifier `{}` must be basic, found {}",
                        property.name,
                        property.value.kind_name()
                    ),
                )
                .into());
            };

            let id_role = role.append(&property.name);
            let selectable = SelectableMapping::from_boot(
                cx,
                table,
                &basic.selectable,
                cx.jdbc_mapping(basic.ty),
                property.insertable,
                false,
            );

            state.metamodel.register_role(id_role.clone(), PartRef::Identifier(id))?;

            Ok(EntityIdentifierMapping::Simple(BasicAttributeMapping {
                meta: identifier_metadata(
                    owner,
                    id_role,
                    property,
                    class.accessors.resolve(&property.name, 0),
                ),
                selectable: SelectableMappings::single(selectable),
            }))
        }
        Identifier::Embedded(property) => {
            let BootValue::Component(component) = &property.value else {
                return Err(Error::invalid_mapping(
                    role,
                    format!(
                        "embedded identifier `{}` must be a composite, found {}",
                        property.name,
                        property.value.kind_name()
                    ),
                )
                .into());
            };

            let id_role = role.append(&property.name);
            state.metamodel.register_role(id_role.clone(), PartRef::Identifier(id))?;

            let embeddable = create_embeddable(
                state,
                steps,
                id_role.clone(),
                component,
                Some(component.type_name.clone()),
                table.to_string(),
                id,
            )?;

            Ok(EntityIdentifierMapping::AggregatedComposite(EmbeddedAttributeMapping {
                meta: identifier_metadata(
                    owner,
                    id_role,
                    property,
                    class.accessors.resolve(&property.name, 0),
                ),
                embeddable,
            }))
        }
        Identifier::NonAggregated {
            properties,
            id_class,
        } => {
            let id_role = role.append(NavigableRole::IDENTIFIER);
            let mut accessors = AccessorTable::new();

            match id_class {
                Some(id_class) => {
                    if let Some(extra) = id_class
                        .properties
                        .iter()
                        .find(|name| !properties.iter().any(|property| property.name == **name))
                    {
                        return Err(Error::invalid_mapping(
                            &id_role,
                            format!(
                                "id class `{}` declares `{extra}`, which is not an \
                                 identifier attribute",
                                id_class.type_name
                            ),
                        )
                        .into());
                    }

                    for property in properties {
                        let Some(position) = id_class
                            .properties
                            .iter()
                            .position(|name| *name == property.name)
                        else {
                            return Err(Error::invalid_mapping(
                                &id_role,
                                format!(
                                    "identifier attribute `{}` has no match in id class `{}`",
                                    property.name, id_class.type_name
                                ),
                            )
                            .into());
                        };

                        accessors = accessors.with(
                            &property.name,
                            id_class.accessors.resolve(&property.name, position),
                        );
                    }
                }
                None => {
                    for (position, property) in properties.iter().enumerate() {
                        accessors =
                            accessors.with(&property.name, PropertyAccess::positional(position));
                    }
                }
            }

            let mut component = boot::Component::new(&root_class.name).accessors(accessors);
            component.properties = properties.clone();

            state.metamodel.register_role(id_role.clone(), PartRef::Identifier(id))?;

            let type_name = id_class.as_ref().map(|id_class| id_class.type_name.clone());
            let embeddable = create_embeddable(
                state,
                steps,
                id_role.clone(),
                &component,
                type_name.clone(),
                table.to_string(),
                id,
            )?;

            Ok(EntityIdentifierMapping::NonAggregatedComposite(NonAggregatedIdentifier {
                role: id_role,
                embeddable,
                id_class: type_name,
                access: class.accessors.resolve(NavigableRole::IDENTIFIER, 0),
            }))
        }
    }
}

fn identifier_metadata(
    owner: ManagedTypeId,
    role: NavigableRole,
    property: &boot::Property,
    access: PropertyAccess,
) -> crate::mapping::AttributeMetadata {
    let mut meta = metadata(owner, role, property, 0, access, SubtypeSet::all());
    meta.mutable = false;
    meta.nullable = false;
    meta.updatable = false;
    meta
}

fn build_discriminator(
    state: &mut CreationState<'_>,
    id: EntityId,
    role: &NavigableRole,
    root_class: &PersistentClass,
) -> Result<Option<EntityDiscriminatorMapping>> {
    let mm = &state.metamodel;
    let root = mm.entity(id).root;
    let members: Vec<EntityId> = mm
        .entities()
        .filter(|entity| entity.root == root)
        .map(|entity| entity.id)
        .collect();

    let Some(discriminator) = &root_class.discriminator else {
        if members.len() > 1 && root_class.inheritance == InheritanceStrategy::SingleTable {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "single-table hierarchy `{}` declares no discriminator",
                    root_class.name
                ),
            ));
        }

        return Ok(None);
    };

    let mut values: Vec<(Value, EntityId)> = vec![];

    for member in members {
        let member = mm.entity(member);
        let value = member.discriminator_value.clone().unwrap_or_default();

        if !value.is_a(discriminator.ty) {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "discriminator value {value:?} of `{}` is not of type {}",
                    member.name, discriminator.ty
                ),
            ));
        }

        if let Some((_, other)) = values.iter().find(|(candidate, _)| *candidate == value) {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "discriminator value {value:?} is used by both `{}` and `{}`",
                    mm.entity(*other).name,
                    member.name
                ),
            ));
        }

        values.push((value, member.id));
    }

    let cx = state.cx;
    let table = mm.entity(root).table.clone();
    let selectable = SelectableMapping::from_boot(
        cx,
        &table,
        &discriminator.selectable,
        cx.jdbc_mapping(discriminator.ty),
        true,
        false,
    );

    let discriminator_role = role.append(NavigableRole::DISCRIMINATOR);
    state.metamodel.register_role(
        discriminator_role.clone(),
        PartRef::Discriminator(ManagedTypeId::Entity(id)),
    )?;

    Ok(Some(EntityDiscriminatorMapping {
        role: discriminator_role,
        selectable: SelectableMappings::single(selectable),
        values,
    }))
}

fn init_selectables(state: &mut CreationState<'_>, id: EntityId) -> StepResult {
    state.metamodel.entity_mut(id).selectables.begin();
    let result = collect_selectables(&state.metamodel, id);
    settle(&mut state.metamodel.entity_mut(id).selectables, result)
}

fn collect_selectables(mm: &Metamodel, id: EntityId) -> StepResult<SelectableMappings> {
    let entity = mm.entity(id);
    let mut parts = vec![entity.identifier()?.selectables(mm)?];

    for attr in entity.attributes()? {
        parts.push(attr.selectables(mm)?);
    }

    if let Some(discriminator) = entity.discriminator()? {
        parts.push(discriminator.selectable.clone());
    }

    Ok(SelectableMappings::concat(&parts))
}
