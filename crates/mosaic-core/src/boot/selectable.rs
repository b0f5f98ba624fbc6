use crate::Type;

/// A physical table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    pub name: String,

    /// Always quote the name, even when it is not a reserved word.
    pub quoted: bool,
}

/// Where a basic value is read from.
#[derive(Debug, Clone, PartialEq)]
pub enum Selectable {
    Column(Column),
    Formula(Formula),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub quoted: bool,
    pub nullable: bool,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,

    /// Declared type of the column. Join columns without one take the type of
    /// the column they reference.
    pub ty: Option<Type>,

    /// SQL fragment wrapping the column when it is read, `?` stands for the
    /// column.
    pub custom_read: Option<String>,

    /// SQL fragment wrapping the bound value when it is written.
    pub custom_write: Option<String>,
}

/// A derived, read-only selection. `{alias}` in the template is replaced by
/// the alias of the containing table.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    pub template: String,
}

/// A single-column value of a scalar type.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicValue {
    pub ty: Type,
    pub selectable: Selectable,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            quoted: true,
        }
    }
}

impl From<&str> for Table {
    fn from(value: &str) -> Self {
        Table::new(value)
    }
}

impl Selectable {
    pub fn column(name: impl Into<String>) -> Selectable {
        Selectable::Column(Column::new(name))
    }

    pub fn formula(template: impl Into<String>) -> Selectable {
        Selectable::Formula(Formula {
            template: template.into(),
        })
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Selectable::Formula(_))
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Selectable::Column(column) => Some(column),
            Selectable::Formula(_) => None,
        }
    }

    /// Column name, or formula template.
    pub fn text(&self) -> &str {
        match self {
            Selectable::Column(column) => &column.name,
            Selectable::Formula(formula) => &formula.template,
        }
    }
}

impl Column {
    pub fn new(name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            quoted: false,
            nullable: true,
            length: None,
            precision: None,
            scale: None,
            ty: None,
            custom_read: None,
            custom_write: None,
        }
    }

    pub fn quoted(mut self) -> Column {
        self.quoted = true;
        self
    }

    pub fn not_null(mut self) -> Column {
        self.nullable = false;
        self
    }

    pub fn length(mut self, length: u32) -> Column {
        self.length = Some(length);
        self
    }

    pub fn precision(mut self, precision: u32, scale: u32) -> Column {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn ty(mut self, ty: Type) -> Column {
        self.ty = Some(ty);
        self
    }

    pub fn read(mut self, fragment: impl Into<String>) -> Column {
        self.custom_read = Some(fragment.into());
        self
    }

    pub fn write(mut self, fragment: impl Into<String>) -> Column {
        self.custom_write = Some(fragment.into());
        self
    }
}

impl BasicValue {
    pub fn new(ty: Type, selectable: impl Into<Selectable>) -> BasicValue {
        BasicValue {
            ty,
            selectable: selectable.into(),
        }
    }
}

impl From<Column> for Selectable {
    fn from(value: Column) -> Self {
        Selectable::Column(value)
    }
}

impl From<Formula> for Selectable {
    fn from(value: Formula) -> Self {
        Selectable::Formula(value)
    }
}

impl From<&str> for Selectable {
    fn from(value: &str) -> Self {
        Selectable::column(value)
    }
}
