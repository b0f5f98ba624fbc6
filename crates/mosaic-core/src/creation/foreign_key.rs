use super::embeddable::create_inverse_embeddable;
use super::state::{CreationState, Registrar, StepResult};
use crate::boot;
use crate::context::CreationContext;
use crate::mapping::{
    AssociationKey, AttributeMapping, EmbeddableId, EmbeddedForeignKeyDescriptor, EntityId,
    ForeignKeyDescriptor, ForeignKeyId, ForeignKeySide, Metamodel, PartRef, SelectableMappings,
    SideNature, SimpleForeignKeyDescriptor,
};
use crate::{Error, NavigableRole};

use std_util::str as strs;
use tracing::debug;

/// The referenced side of a foreign key being resolved.
#[derive(Debug, Clone)]
pub(crate) struct TargetSide {
    pub(crate) part: PartRef,
    pub(crate) table: String,
    pub(crate) selectables: SelectableMappings,

    /// Composite backing the target part, if any.
    pub(crate) embeddable: Option<EmbeddableId>,
}

/// The key side of a foreign key being resolved.
#[derive(Debug, Clone)]
pub(crate) struct KeySide {
    pub(crate) part: PartRef,
    pub(crate) table: String,
    pub(crate) selectables: SelectableMappings,
}

impl TargetSide {
    /// Resolves the identifier of `entity`, or its unique attribute
    /// `referenced_property`.
    pub(crate) fn resolve(
        mm: &Metamodel,
        role: &NavigableRole,
        entity: EntityId,
        referenced_property: Option<&str>,
    ) -> StepResult<TargetSide> {
        let target = mm.entity(entity);

        let Some(name) = referenced_property else {
            let identifier = target.identifier()?;
            let selectables = identifier.selectables(mm)?;

            return Ok(TargetSide {
                part: PartRef::Identifier(entity),
                table: table_of(&selectables, &target.table),
                selectables,
                embeddable: identifier.embeddable(),
            });
        };

        let Some(id) = mm.find_attribute(entity, name)? else {
            return Err(Error::invalid_mapping(
                role,
                format!("`{}` has no attribute `{name}`", target.name),
            )
            .into());
        };

        let attr = mm.attribute(id)?;

        let embeddable = match attr {
            AttributeMapping::Basic(_) => None,
            AttributeMapping::Embedded(attr) => Some(attr.embeddable),
            AttributeMapping::ToOne(attr) if attr.is_owning() => None,
            attr => {
                return Err(Error::invalid_mapping(
                    role,
                    format!(
                        "cannot reference {} attribute `{}.{name}`",
                        attr.kind_name(),
                        target.name
                    ),
                )
                .into())
            }
        };

        let selectables = attr.selectables(mm)?;

        Ok(TargetSide {
            part: PartRef::Attribute(id),
            table: table_of(&selectables, &target.table),
            selectables,
            embeddable,
        })
    }

    /// Canonical position of every column in the target's original
    /// declaration order.
    pub(crate) fn column_order(&self, mm: &Metamodel) -> StepResult<Vec<usize>> {
        match self.embeddable {
            Some(embeddable) => Ok(mm.embeddable(embeddable).column_order(mm)?),
            None => Ok((0..self.selectables.len()).collect()),
        }
    }

    /// Builds key columns on `table` referencing this target.
    ///
    /// Declared columns follow the target's original declaration order
    /// unless `sorted` says they already follow its canonical order. With no
    /// declared columns, names are derived from `prefix` and the target
    /// columns.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn key_selectables(
        &self,
        mm: &Metamodel,
        cx: &CreationContext,
        role: &NavigableRole,
        table: &str,
        columns: &[boot::Selectable],
        prefix: &str,
        sorted: bool,
        writable: (bool, bool),
    ) -> StepResult<SelectableMappings> {
        let (columns, order) = if columns.is_empty() {
            let implicit: Vec<_> = self
                .selectables
                .iter()
                .map(|target| boot::Selectable::column(format!("{prefix}_{}", target.name)))
                .collect();
            let order = (0..implicit.len()).collect();
            (implicit, order)
        } else if sorted {
            (columns.to_vec(), (0..columns.len()).collect())
        } else {
            (columns.to_vec(), self.column_order(mm)?)
        };

        let (insertable, updatable) = writable;

        Ok(SelectableMappings::from_columns(
            cx,
            role,
            table,
            &columns,
            &self.selectables.jdbc_mappings(),
            &order,
            insertable,
            updatable,
        )?)
    }
}

fn table_of(selectables: &SelectableMappings, fallback: &str) -> String {
    selectables
        .first()
        .map(|selectable| selectable.table.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Prefix of implicit join column names.
pub(crate) fn implicit_column_prefix(name: &str) -> String {
    strs::snake_case(name)
}

/// Returns the descriptor of the physical key formed by `key`, creating it
/// on first use.
///
/// Associations mapped onto the same key table and columns share one
/// descriptor as long as they reference the same target part. Sibling
/// subclasses reusing a column for different targets get one each.
pub(crate) fn resolve_foreign_key<'a>(
    state: &mut CreationState<'a>,
    steps: &mut Registrar<'a>,
    role: &NavigableRole,
    key: KeySide,
    target: TargetSide,
) -> StepResult<ForeignKeyId> {
    let association_key = AssociationKey::new(
        key.table.clone(),
        key.selectables
            .iter()
            .map(|selectable| selectable.expression.clone())
            .collect(),
    );

    let shared = state
        .metamodel
        .foreign_keys_by_association_key(&association_key)
        .find(|fk| fk.target_side().part == target.part && fk.target_table() == target.table);

    if let Some(fk) = shared {
        debug!(
            role = %role,
            key = %association_key,
            shared_with = %fk.role(),
            "foreign key shared"
        );
        return Ok(fk.id());
    }

    if key.selectables.len() != target.selectables.len() {
        return Err(Error::invalid_mapping(
            role,
            format!(
                "foreign key has {} key column(s) for {} target column(s)",
                key.selectables.len(),
                target.selectables.len()
            ),
        )
        .into());
    }

    for (key_column, target_column) in key.selectables.iter().zip(target.selectables.iter()) {
        if !key_column.jdbc.is_compatible(&target_column.jdbc) {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "key column `{}` ({:?}) is incompatible with target column `{}` ({:?})",
                    key_column.name,
                    key_column.jdbc.jdbc_type,
                    target_column.name,
                    target_column.jdbc.jdbc_type
                ),
            )
            .into());
        }
    }

    let id = ForeignKeyId(state.metamodel.foreign_keys.len());
    let fk_role = role.append(NavigableRole::FOREIGN_KEY);

    let target_side = ForeignKeySide {
        nature: SideNature::Target,
        part: target.part,
        table: target.table,
        selectables: target.selectables,
    };

    let descriptor = match target.embeddable {
        Some(target_embeddable) => {
            let key_embeddable = create_inverse_embeddable(
                state,
                steps,
                target_embeddable,
                role.append(NavigableRole::INVERSE),
                key.table.clone(),
                key.selectables.clone(),
            )?;

            ForeignKeyDescriptor::Embedded(EmbeddedForeignKeyDescriptor {
                id,
                role: fk_role.clone(),
                association_key: association_key.clone(),
                key: ForeignKeySide {
                    nature: SideNature::Key,
                    part: PartRef::Embeddable(key_embeddable),
                    table: key.table,
                    selectables: key.selectables,
                },
                target: target_side,
                key_embeddable,
                target_embeddable,
            })
        }
        None => ForeignKeyDescriptor::Simple(SimpleForeignKeyDescriptor {
            id,
            role: fk_role.clone(),
            association_key: association_key.clone(),
            key: ForeignKeySide {
                nature: SideNature::Key,
                part: key.part,
                table: key.table,
                selectables: key.selectables,
            },
            target: target_side,
        }),
    };

    debug!(
        role = %fk_role,
        key = %association_key,
        target = %descriptor.target_table(),
        columns = descriptor.column_count(),
        "foreign key resolved"
    );

    state.metamodel.foreign_keys.push(descriptor);
    state
        .metamodel
        .association_keys
        .entry(association_key)
        .or_default()
        .push(id);
    state.metamodel.register_role(fk_role, PartRef::ForeignKey(id))?;

    Ok(id)
}

/// Checks that the `mapped_by` attribute `owning_name` references the
/// hierarchy of `owner`, the entity declaring the inverse side.
pub(crate) fn check_mapped_by_target(
    mm: &Metamodel,
    role: &NavigableRole,
    owning_name: &str,
    referenced: EntityId,
    owner: EntityId,
) -> StepResult {
    if mm.entity(referenced).root == mm.entity(owner).root {
        return Ok(());
    }

    Err(Error::invalid_mapping(
        role,
        format!(
            "mapped-by attribute `{owning_name}` references `{}`, not `{}`",
            mm.entity(referenced).name,
            mm.entity(owner).name
        ),
    )
    .into())
}

/// Path of `role` relative to the entity role `entity`, as used by
/// `mapped_by`.
pub(crate) fn relative_path<'r>(entity: &NavigableRole, role: &'r NavigableRole) -> &'r str {
    role.full_path()
        .strip_prefix(entity.full_path())
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(role.full_path())
}
