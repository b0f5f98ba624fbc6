use super::{BasicValue, Property};
use crate::{AccessorTable, Value};

/// An embeddable composite value.
#[derive(Debug, Clone)]
pub struct Component {
    pub type_name: String,

    /// Properties in canonical order. The flattened column list follows this
    /// order.
    pub properties: Vec<Property>,

    /// Property names in the order they were originally declared, when that
    /// differs from the canonical order. Join columns referencing the
    /// composite are listed in this order.
    pub original_property_order: Option<Vec<String>>,

    /// Discriminator of a polymorphic composite.
    pub discriminator: Option<BasicValue>,

    /// Concrete subtypes of a polymorphic composite.
    pub subtypes: Vec<ComponentSubtype>,

    pub accessors: AccessorTable,
}

/// One concrete type of a polymorphic composite.
#[derive(Debug, Clone)]
pub struct ComponentSubtype {
    pub type_name: String,
    pub discriminator_value: Value,

    /// Names of the composite properties this subtype declares.
    pub properties: Vec<String>,

    pub accessors: AccessorTable,
}

impl Component {
    pub fn new(type_name: impl Into<String>) -> Component {
        Component {
            type_name: type_name.into(),
            properties: vec![],
            original_property_order: None,
            discriminator: None,
            subtypes: vec![],
            accessors: AccessorTable::new(),
        }
    }

    pub fn property(mut self, property: Property) -> Component {
        self.properties.push(property);
        self
    }

    pub fn original_order(mut self, names: &[&str]) -> Component {
        self.original_property_order = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    pub fn discriminator(mut self, discriminator: BasicValue) -> Component {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn subtype(mut self, subtype: ComponentSubtype) -> Component {
        self.subtypes.push(subtype);
        self
    }

    pub fn accessors(mut self, accessors: AccessorTable) -> Component {
        self.accessors = accessors;
        self
    }

    pub fn is_polymorphic(&self) -> bool {
        self.discriminator.is_some()
    }

    pub fn property_named(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }
}

impl ComponentSubtype {
    pub fn new(
        type_name: impl Into<String>,
        discriminator_value: impl Into<Value>,
        properties: &[&str],
    ) -> ComponentSubtype {
        ComponentSubtype {
            type_name: type_name.into(),
            discriminator_value: discriminator_value.into(),
            properties: properties.iter().map(|name| name.to_string()).collect(),
            accessors: AccessorTable::new(),
        }
    }

    pub fn accessors(mut self, accessors: AccessorTable) -> ComponentSubtype {
        self.accessors = accessors;
        self
    }
}
