use std::fmt;
use uuid::Uuid;

/// A domain value, as seen by property accessors and produced by assembly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Uuid(Uuid),

    /// Ordered values with no type name, such as a multi-column natural id
    Record(Vec<Value>),

    /// Elements of a collection
    List(Vec<Value>),

    /// An instance of an entity or composite type
    Object(ValueObject),

    /// A to-one reference, identified by the target's identifier value
    Reference(ValueReference),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueObject {
    pub type_name: String,
    pub fields: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueReference {
    pub entity: String,
    pub key: Box<Value>,
}

/// Scalar domain types a basic attribute can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Bool,
    I32,
    I64,
    F64,
    String,
    Uuid,
}

impl Value {
    pub fn null() -> Value {
        Value::Null
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn object(type_name: impl Into<String>, fields: Vec<Value>) -> Value {
        Value::Object(ValueObject {
            type_name: type_name.into(),
            fields,
        })
    }

    pub fn reference(entity: impl Into<String>, key: impl Into<Value>) -> Value {
        Value::Reference(ValueReference {
            entity: entity.into(),
            key: Box::new(key.into()),
        })
    }

    pub fn as_object(&self) -> Option<&ValueObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ValueReference> {
        match self {
            Value::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// The scalar type of this value, if it is a scalar.
    pub fn ty(&self) -> Option<Type> {
        Some(match self {
            Value::Bool(_) => Type::Bool,
            Value::I32(_) => Type::I32,
            Value::I64(_) => Type::I64,
            Value::F64(_) => Type::F64,
            Value::String(_) => Type::String,
            Value::Uuid(_) => Type::Uuid,
            _ => return None,
        })
    }

    /// Returns `true` if the value is null or of type `ty`.
    pub fn is_a(&self, ty: Type) -> bool {
        self.is_null() || self.ty() == Some(ty)
    }
}

impl ValueObject {
    pub fn field(&self, index: usize) -> &Value {
        self.fields.get(index).unwrap_or(&Value::Null)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Bool => "bool",
            Type::I32 => "i32",
            Type::I64 => "i64",
            Type::F64 => "f64",
            Type::String => "string",
            Type::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
