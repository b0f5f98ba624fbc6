use super::{built, EmbeddableId, Metamodel, PartRef, SelectableMappings};
use crate::{err, stmt, Error, NavigableRole, Result, Value};

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKeyId(pub usize);

/// Which end of a foreign key a part sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideNature {
    /// The side holding the foreign-key columns.
    Key,

    /// The referenced side: an identifier or unique key.
    Target,
}

/// Physical identity of a foreign key: key table and ordered key columns.
///
/// Associations mapped onto the same physical key share one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssociationKey {
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeySide {
    pub nature: SideNature,

    /// Model part whose columns form this side.
    pub part: PartRef,

    pub table: String,
    pub selectables: SelectableMappings,
}

/// A relational join between a key side and a target side.
///
/// Both sides have the same column count and pairwise compatible JDBC
/// types; column `i` of the key side references column `i` of the target
/// side.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignKeyDescriptor {
    Simple(SimpleForeignKeyDescriptor),
    Embedded(EmbeddedForeignKeyDescriptor),
}

/// Single-column foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleForeignKeyDescriptor {
    pub id: ForeignKeyId,
    pub role: NavigableRole,
    pub association_key: AssociationKey,
    pub key: ForeignKeySide,
    pub target: ForeignKeySide,
}

/// Multi-column foreign key referencing a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedForeignKeyDescriptor {
    pub id: ForeignKeyId,
    pub role: NavigableRole,
    pub association_key: AssociationKey,
    pub key: ForeignKeySide,
    pub target: ForeignKeySide,

    /// Key-side mirror of the target composite.
    pub key_embeddable: EmbeddableId,

    pub target_embeddable: EmbeddableId,
}

impl ForeignKeyDescriptor {
    pub fn id(&self) -> ForeignKeyId {
        match self {
            ForeignKeyDescriptor::Simple(fk) => fk.id,
            ForeignKeyDescriptor::Embedded(fk) => fk.id,
        }
    }

    pub fn role(&self) -> &NavigableRole {
        match self {
            ForeignKeyDescriptor::Simple(fk) => &fk.role,
            ForeignKeyDescriptor::Embedded(fk) => &fk.role,
        }
    }

    pub fn association_key(&self) -> &AssociationKey {
        match self {
            ForeignKeyDescriptor::Simple(fk) => &fk.association_key,
            ForeignKeyDescriptor::Embedded(fk) => &fk.association_key,
        }
    }

    pub fn key_side(&self) -> &ForeignKeySide {
        match self {
            ForeignKeyDescriptor::Simple(fk) => &fk.key,
            ForeignKeyDescriptor::Embedded(fk) => &fk.key,
        }
    }

    pub fn target_side(&self) -> &ForeignKeySide {
        match self {
            ForeignKeyDescriptor::Simple(fk) => &fk.target,
            ForeignKeyDescriptor::Embedded(fk) => &fk.target,
        }
    }

    pub fn side(&self, nature: SideNature) -> &ForeignKeySide {
        match nature {
            SideNature::Key => self.key_side(),
            SideNature::Target => self.target_side(),
        }
    }

    pub fn key_table(&self) -> &str {
        &self.key_side().table
    }

    pub fn target_table(&self) -> &str {
        &self.target_side().table
    }

    pub fn column_count(&self) -> usize {
        self.key_side().selectables.len()
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ForeignKeyDescriptor::Embedded(_))
    }

    /// Equi-join of the key table, aliased `key_alias`, with the target table,
    /// aliased `target_alias`.
    pub fn join_predicate(&self, key_alias: &str, target_alias: &str) -> stmt::Expr {
        let key = &self.key_side().selectables;
        let target = &self.target_side().selectables;

        stmt::Expr::and_from_vec(
            key.iter()
                .zip(target.iter())
                .map(|(key, target)| {
                    stmt::Expr::eq(
                        stmt::Expr::column(key_alias, key),
                        stmt::Expr::column(target_alias, target),
                    )
                })
                .collect(),
        )
    }

    /// Key column values referencing the target part value `target`.
    pub fn key_values_from_target(&self, mm: &Metamodel, target: &Value) -> Result<Vec<Value>> {
        let mut values = vec![];
        part_disassemble(mm, self.target_side().part, target, &mut values)?;

        if values.len() != self.column_count() {
            return Err(Error::invalid_value(format!(
                "`{}` references {} column(s), target value produced {}",
                self.role(),
                self.column_count(),
                values.len()
            )));
        }

        Ok(values)
    }

    /// Target part value referenced by the key column values `key`.
    pub fn target_value_from_key(&self, mm: &Metamodel, key: &[Value]) -> Result<Value> {
        part_assemble(mm, self.target_side().part, key)
    }

    /// Reads the referenced target part value off a target entity instance.
    pub fn target_value_of_instance(&self, mm: &Metamodel, instance: &Value) -> Result<Value> {
        match self.target_side().part {
            PartRef::Identifier(entity) => mm.entity(entity).identifier_value(instance),
            PartRef::Attribute(attribute) => built(mm.attribute(attribute))?
                .metadata()
                .access
                .get(instance),
            part => Err(err!("`{}` cannot read {part:?} off an instance", self.role())),
        }
    }
}

fn part_disassemble(
    mm: &Metamodel,
    part: PartRef,
    value: &Value,
    out: &mut Vec<Value>,
) -> Result<()> {
    match part {
        PartRef::Identifier(entity) => {
            built(mm.entity(entity).identifier())?.disassemble(mm, value, out)
        }
        PartRef::Attribute(attribute) => {
            built(mm.attribute(attribute))?.disassemble(mm, value, out)
        }
        PartRef::Embeddable(embeddable) => mm.embeddable(embeddable).disassemble(mm, value, out),
        part => Err(err!("{part:?} has no value to disassemble")),
    }
}

fn part_assemble(mm: &Metamodel, part: PartRef, values: &[Value]) -> Result<Value> {
    match part {
        PartRef::Identifier(entity) => built(mm.entity(entity).identifier())?.assemble(mm, values),
        PartRef::Attribute(attribute) => built(mm.attribute(attribute))?.assemble(mm, values),
        PartRef::Embeddable(embeddable) => mm.embeddable(embeddable).assemble(mm, values),
        part => Err(err!("{part:?} has no value to assemble")),
    }
}

impl AssociationKey {
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> AssociationKey {
        AssociationKey {
            table: table.into(),
            columns,
        }
    }
}

impl fmt::Display for AssociationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, [{}])", self.table, self.columns.join(", "))
    }
}

impl fmt::Debug for ForeignKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignKeyId({})", self.0)
    }
}
