use super::{
    built, AttributeId, AttributeMapping, EntityIdentifierMapping, Metamodel, SelectableMappings,
};
use crate::boot::InheritanceStrategy;
use crate::creation::Slot;
use crate::{Error, NavigableRole, NotReady, Result, Value};

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub usize);

#[derive(Debug)]
pub struct EntityMappingType {
    /// Uniquely identifies the entity within the metamodel
    pub id: EntityId,

    pub name: String,
    pub role: NavigableRole,

    /// Table expression holding this entity's own attributes.
    pub table: String,

    /// Root of the inheritance hierarchy; the entity itself for roots.
    pub root: EntityId,

    pub superclass: Option<EntityId>,
    pub inheritance: InheritanceStrategy,
    pub discriminator_value: Option<Value>,

    pub(crate) identifier: Slot<EntityIdentifierMapping>,
    pub(crate) attributes: Slot<Vec<AttributeMapping>>,
    pub(crate) discriminator: Slot<Option<EntityDiscriminatorMapping>>,
    pub(crate) natural_id: Slot<Option<NaturalIdMapping>>,

    /// Flattened row: identifier columns, attribute columns, then the
    /// discriminator.
    pub(crate) selectables: Slot<SelectableMappings>,
}

/// Maps discriminator values of a hierarchy to its entities.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDiscriminatorMapping {
    pub role: NavigableRole,
    pub selectable: SelectableMappings,
    pub values: Vec<(Value, EntityId)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NaturalIdMapping {
    pub role: NavigableRole,
    pub attributes: Vec<AttributeId>,
    pub mutable: bool,
}

impl EntityMappingType {
    pub fn identifier(&self) -> core::result::Result<&EntityIdentifierMapping, NotReady> {
        self.identifier.get(&self.role, "identifier")
    }

    pub fn attributes(&self) -> core::result::Result<&[AttributeMapping], NotReady> {
        self.attributes
            .get(&self.role, "attributes")
            .map(Vec::as_slice)
    }

    pub fn attribute(
        &self,
        name: &str,
    ) -> core::result::Result<Option<&AttributeMapping>, NotReady> {
        Ok(self.attributes()?.iter().find(|attr| attr.name() == name))
    }

    pub fn discriminator(
        &self,
    ) -> core::result::Result<Option<&EntityDiscriminatorMapping>, NotReady> {
        Ok(self.discriminator.get(&self.role, "discriminator")?.as_ref())
    }

    pub fn natural_id(&self) -> core::result::Result<Option<&NaturalIdMapping>, NotReady> {
        Ok(self.natural_id.get(&self.role, "natural id")?.as_ref())
    }

    pub fn selectables(&self) -> core::result::Result<&SelectableMappings, NotReady> {
        self.selectables.get(&self.role, "selectables")
    }

    pub fn is_root(&self) -> bool {
        self.root == self.id
    }

    /// Reads the identifier value off an entity instance.
    pub fn identifier_value(&self, instance: &Value) -> Result<Value> {
        built(self.identifier())?.access().get(instance)
    }

    /// Breaks an entity instance into the values of its row selectables.
    pub fn disassemble(&self, mm: &Metamodel, instance: &Value) -> Result<Vec<Value>> {
        let mut row = vec![];

        built(self.identifier())?.disassemble(mm, &self.identifier_value(instance)?, &mut row)?;

        for attr in built(self.attributes())? {
            attr.disassemble(mm, &attr.metadata().access.get(instance)?, &mut row)?;
        }

        if built(self.discriminator())?.is_some() {
            row.push(self.discriminator_value.clone().unwrap_or_default());
        }

        Ok(row)
    }

    /// Rebuilds an entity instance from the values of its row selectables.
    pub fn assemble(&self, mm: &Metamodel, row: &[Value]) -> Result<Value> {
        let expected = built(self.selectables())?.len();

        if row.len() != expected {
            return Err(Error::invalid_value(format!(
                "`{}` row has {expected} column(s), got {} value(s)",
                self.name,
                row.len()
            )));
        }

        let identifier = built(self.identifier())?;
        let mut instance = Value::object(self.name.clone(), vec![]);
        let mut offset = built(identifier.selectables(mm))?.len();

        identifier
            .access()
            .set(&mut instance, identifier.assemble(mm, &row[..offset])?)?;

        for attr in built(self.attributes())? {
            let count = built(attr.jdbc_type_count(mm))?;
            let value = attr.assemble(mm, &row[offset..offset + count])?;
            offset += count;

            attr.metadata().access.set(&mut instance, value)?;
        }

        Ok(instance)
    }
}

impl EntityDiscriminatorMapping {
    pub fn resolve(&self, value: &Value) -> Option<EntityId> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == value)
            .map(|(_, entity)| *entity)
    }

    pub fn value_for(&self, entity: EntityId) -> Option<&Value> {
        self.values
            .iter()
            .find(|(_, candidate)| *candidate == entity)
            .map(|(value, _)| value)
    }
}

impl NaturalIdMapping {
    /// Normalizes a natural-id value into one value per natural-id attribute.
    ///
    /// A single-attribute natural id accepts the bare value; a composite one
    /// requires a record of matching arity.
    pub fn normalize(&self, value: &Value) -> Result<Vec<Value>> {
        let arity = self.attributes.len();

        match value {
            Value::Record(values) if values.len() == arity => Ok(values.clone()),
            Value::Record(values) => Err(Error::invalid_mapping(
                &self.role,
                format!(
                    "natural id has {arity} attribute(s), value has {}",
                    values.len()
                ),
            )),
            value if arity == 1 => Ok(vec![value.clone()]),
            value => Err(Error::invalid_mapping(
                &self.role,
                format!("natural id has {arity} attributes, expected a record, found {value:?}"),
            )),
        }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}
