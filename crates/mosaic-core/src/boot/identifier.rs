use super::{Component, Property, Selectable};
use crate::{AccessorTable, Type};

#[derive(Debug, Clone)]
pub enum Identifier {
    /// A single basic attribute.
    Simple(Property),

    /// A single attribute of composite type.
    Embedded(Property),

    /// Several attributes that together identify the entity, optionally
    /// exposed through an id class.
    NonAggregated {
        properties: Vec<Property>,
        id_class: Option<IdClass>,
    },
}

/// Shape of a non-aggregated identifier as a standalone value.
#[derive(Debug, Clone)]
pub struct IdClass {
    pub type_name: String,
    pub properties: Vec<String>,
    pub accessors: AccessorTable,
}

impl Identifier {
    pub fn simple(name: impl Into<String>, ty: Type, column: impl Into<Selectable>) -> Identifier {
        Identifier::Simple(Property::basic(name, ty, column).not_optional())
    }

    pub fn embedded(name: impl Into<String>, component: Component) -> Identifier {
        Identifier::Embedded(Property::new(name, component).not_optional())
    }

    pub fn non_aggregated(properties: Vec<Property>) -> Identifier {
        Identifier::NonAggregated {
            properties,
            id_class: None,
        }
    }

    pub fn with_id_class(self, id_class: IdClass) -> Identifier {
        match self {
            Identifier::NonAggregated { properties, .. } => Identifier::NonAggregated {
                properties,
                id_class: Some(id_class),
            },
            other => other,
        }
    }
}

impl IdClass {
    pub fn new(type_name: impl Into<String>, properties: &[&str]) -> IdClass {
        IdClass {
            type_name: type_name.into(),
            properties: properties.iter().map(|name| name.to_string()).collect(),
            accessors: AccessorTable::new(),
        }
    }

    pub fn accessors(mut self, accessors: AccessorTable) -> IdClass {
        self.accessors = accessors;
        self
    }
}
