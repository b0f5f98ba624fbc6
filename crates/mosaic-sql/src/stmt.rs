mod insert;
pub use insert::Insert;

mod select;
pub use select::{Join, JoinKind, Select, TableRef};

mod update;
pub use update::Update;

mod write_column;
pub use write_column::WriteColumn;

pub use mosaic_core::stmt::*;

use mosaic_core::{err, NotReady, Result};

#[derive(Debug, Clone)]
pub enum Statement {
    Insert(Insert),
    Select(Select),
    Update(Update),
}

impl Statement {
    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_))
    }

    /// Returns the number of values the statement binds or selects.
    pub fn width(&self) -> usize {
        match self {
            Statement::Insert(insert) => insert.columns.len(),
            Statement::Select(select) => select.columns.len(),
            Statement::Update(update) => update.assignments.len(),
        }
    }
}

/// Statements are built from a frozen metamodel, where every part is ready.
fn built<T>(read: core::result::Result<T, NotReady>) -> Result<T> {
    read.map_err(|not_ready| err!("{not_ready} is not built"))
}
