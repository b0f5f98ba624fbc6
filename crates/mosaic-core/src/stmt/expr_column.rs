use super::*;
use crate::mapping::SelectableMapping;

/// A selectable read through a table alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprColumn {
    /// Alias of the table group the selectable is read from.
    pub alias: String,

    /// Column name, or formula template when `is_formula` is set.
    pub expression: String,

    pub is_formula: bool,

    /// Custom read fragment wrapping the column, if any.
    pub custom_read: Option<String>,
}

impl ExprColumn {
    pub fn new(alias: impl Into<String>, selectable: &SelectableMapping) -> ExprColumn {
        ExprColumn {
            alias: alias.into(),
            expression: selectable.expression.clone(),
            is_formula: selectable.is_formula,
            custom_read: selectable.custom_read.clone(),
        }
    }
}

impl Expr {
    pub fn column(alias: impl Into<String>, selectable: &SelectableMapping) -> Self {
        ExprColumn::new(alias, selectable).into()
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Self::Column(value)
    }
}
