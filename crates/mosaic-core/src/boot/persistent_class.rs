use super::{BasicValue, Identifier, Property, Table};
use crate::{AccessorTable, Value};

/// How the attributes of an entity hierarchy are spread over tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritanceStrategy {
    /// No subclasses, or all subclasses share the root table.
    #[default]
    SingleTable,

    /// Each class stores its own attributes in its own table, joined on the
    /// identifier.
    Joined,

    /// Each concrete class stores every attribute in its own table.
    Union,
}

#[derive(Debug, Clone)]
pub struct PersistentClass {
    pub name: String,

    /// Explicit table. When unset the table is named after the entity, or
    /// the root's table is reused for single-table subclasses.
    pub table: Option<Table>,

    /// Required on hierarchy roots, inherited by subclasses.
    pub identifier: Option<Identifier>,

    pub properties: Vec<Property>,
    pub superclass: Option<String>,

    /// Declared on the hierarchy root.
    pub inheritance: InheritanceStrategy,

    /// Discriminator column of the hierarchy, declared on the root.
    pub discriminator: Option<BasicValue>,

    pub discriminator_value: Option<Value>,

    pub accessors: AccessorTable,
}

impl PersistentClass {
    pub fn new(name: impl Into<String>) -> PersistentClass {
        PersistentClass {
            name: name.into(),
            table: None,
            identifier: None,
            properties: vec![],
            superclass: None,
            inheritance: InheritanceStrategy::default(),
            discriminator: None,
            discriminator_value: None,
            accessors: AccessorTable::new(),
        }
    }

    pub fn table(mut self, table: impl Into<Table>) -> PersistentClass {
        self.table = Some(table.into());
        self
    }

    pub fn id(mut self, identifier: Identifier) -> PersistentClass {
        self.identifier = Some(identifier);
        self
    }

    pub fn property(mut self, property: Property) -> PersistentClass {
        self.properties.push(property);
        self
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> PersistentClass {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn inheritance(mut self, strategy: InheritanceStrategy) -> PersistentClass {
        self.inheritance = strategy;
        self
    }

    pub fn discriminator(mut self, discriminator: BasicValue) -> PersistentClass {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn discriminator_value(mut self, value: impl Into<Value>) -> PersistentClass {
        self.discriminator_value = Some(value.into());
        self
    }

    pub fn accessors(mut self, accessors: AccessorTable) -> PersistentClass {
        self.accessors = accessors;
        self
    }

    pub fn is_root(&self) -> bool {
        self.superclass.is_none()
    }
}
