use super::{Flavor, Formatter, ToSql};

use mosaic_core::Value;

pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;
}

/// One-based position of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl Flavor {
    pub(super) fn placeholder(self, placeholder: Placeholder) -> String {
        match self {
            Flavor::Mysql => "?".to_string(),
            Flavor::Postgresql => format!("${}", placeholder.0),
            Flavor::Sqlite => format!("?{}", placeholder.0),
        }
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let text = f.serializer.flavor.placeholder(self);
        f.dst.push_str(&text);
    }
}
