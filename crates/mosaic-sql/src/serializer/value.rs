use super::{Comma, Params, ToSql};

use mosaic_core::Value;

impl ToSql for &Value {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            Value::Record(values) | Value::List(values) => {
                fmt!(f, "(" Comma(values) ")");
            }
            value => {
                let placeholder = f.params.push(value);
                fmt!(f, placeholder)
            }
        }
    }
}
