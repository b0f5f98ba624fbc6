use super::{AnyValue, BasicValue, Collection, Component, ToOne};

/// Declared kind of a property's value.
#[derive(Debug, Clone)]
pub enum BootValue {
    Basic(BasicValue),
    Component(Component),
    ToOne(ToOne),
    Collection(Collection),
    Any(AnyValue),
}

impl BootValue {
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            BootValue::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn as_to_one(&self) -> Option<&ToOne> {
        match self {
            BootValue::ToOne(to_one) => Some(to_one),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            BootValue::Basic(_) => "basic",
            BootValue::Component(_) => "component",
            BootValue::ToOne(_) => "to-one",
            BootValue::Collection(_) => "collection",
            BootValue::Any(_) => "any",
        }
    }
}

impl From<BasicValue> for BootValue {
    fn from(value: BasicValue) -> Self {
        BootValue::Basic(value)
    }
}

impl From<Component> for BootValue {
    fn from(value: Component) -> Self {
        BootValue::Component(value)
    }
}

impl From<ToOne> for BootValue {
    fn from(value: ToOne) -> Self {
        BootValue::ToOne(value)
    }
}

impl From<Collection> for BootValue {
    fn from(value: Collection) -> Self {
        BootValue::Collection(value)
    }
}

impl From<AnyValue> for BootValue {
    fn from(value: AnyValue) -> Self {
        BootValue::Any(value)
    }
}
