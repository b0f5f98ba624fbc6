use super::BasicValue;
use crate::Value;

/// A discriminated ("any") association: a type column selects the entity and
/// a key column holds its identifier.
#[derive(Debug, Clone)]
pub struct AnyValue {
    pub discriminator: BasicValue,
    pub key: BasicValue,

    /// Discriminator value and the name of the entity it selects.
    pub meta_values: Vec<(Value, String)>,
}

impl AnyValue {
    pub fn new(discriminator: BasicValue, key: BasicValue) -> AnyValue {
        AnyValue {
            discriminator,
            key,
            meta_values: vec![],
        }
    }

    pub fn meta_value(mut self, value: impl Into<Value>, entity: impl Into<String>) -> AnyValue {
        self.meta_values.push((value.into(), entity.into()));
        self
    }
}
