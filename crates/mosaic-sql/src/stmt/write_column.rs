use mosaic_core::mapping::SelectableMapping;

/// A column receiving a bound value in an INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteColumn {
    /// Rendered column name.
    pub expression: String,

    /// Fragment wrapping the bound value; `?` stands for the placeholder.
    pub custom_write: Option<String>,
}

impl WriteColumn {
    pub fn new(selectable: &SelectableMapping) -> WriteColumn {
        WriteColumn {
            expression: selectable.expression.clone(),
            custom_write: selectable.custom_write.clone(),
        }
    }
}
