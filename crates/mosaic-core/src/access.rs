use crate::{Error, Result, Value};

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

type Getter = dyn Fn(&Value) -> Result<Value> + Send + Sync;
type Setter = dyn Fn(&mut Value, Value) -> Result<()> + Send + Sync;

/// Statically declared getter / setter pair for one attribute.
///
/// Accessors are resolved once, while the metamodel is created, and are
/// then invoked directly when values are assembled or disassembled.
#[derive(Clone)]
pub struct PropertyAccess {
    getter: Arc<Getter>,
    setter: Arc<Setter>,
    position: Option<usize>,
}

/// Accessors of an entity or composite type, keyed by attribute name.
///
/// Attributes with no entry fall back to positional access.
#[derive(Clone, Default)]
pub struct AccessorTable {
    accessors: IndexMap<String, PropertyAccess>,
}

impl PropertyAccess {
    pub fn new(
        getter: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static,
        setter: impl Fn(&mut Value, Value) -> Result<()> + Send + Sync + 'static,
    ) -> PropertyAccess {
        PropertyAccess {
            getter: Arc::new(getter),
            setter: Arc::new(setter),
            position: None,
        }
    }

    /// Reads and writes the `index`-th field of an object or record.
    pub fn positional(index: usize) -> PropertyAccess {
        PropertyAccess {
            getter: Arc::new(move |owner| match owner {
                Value::Null => Ok(Value::Null),
                Value::Object(object) => Ok(object.field(index).clone()),
                Value::Record(fields) => Ok(fields.get(index).cloned().unwrap_or_default()),
                other => Err(Error::invalid_value(format!(
                    "expected an object or record, found {other:?}"
                ))),
            }),
            setter: Arc::new(move |owner, value| {
                let fields = match owner {
                    Value::Object(object) => &mut object.fields,
                    Value::Record(fields) => fields,
                    other => {
                        return Err(Error::invalid_value(format!(
                            "cannot set field {index} on {other:?}"
                        )))
                    }
                };

                if fields.len() <= index {
                    fields.resize(index + 1, Value::Null);
                }

                fields[index] = value;
                Ok(())
            }),
            position: Some(index),
        }
    }

    pub fn get(&self, owner: &Value) -> Result<Value> {
        (self.getter)(owner)
    }

    pub fn set(&self, owner: &mut Value, value: Value) -> Result<()> {
        (self.setter)(owner, value)
    }

    /// The field position, for positional accessors.
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl AccessorTable {
    pub fn new() -> AccessorTable {
        AccessorTable::default()
    }

    pub fn with(mut self, name: impl Into<String>, access: PropertyAccess) -> AccessorTable {
        self.accessors.insert(name.into(), access);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyAccess> {
        self.accessors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Returns the declared accessor for `name`, or positional access at
    /// `position` when none is declared.
    pub fn resolve(&self, name: &str, position: usize) -> PropertyAccess {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| PropertyAccess::positional(position))
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

impl fmt::Debug for PropertyAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "PropertyAccess(#{position})"),
            None => f.write_str("PropertyAccess(custom)"),
        }
    }
}

impl fmt::Debug for AccessorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.accessors.keys()).finish()
    }
}
