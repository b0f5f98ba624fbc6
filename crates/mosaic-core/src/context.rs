mod dialect;
pub use dialect::Dialect;

mod settings;
pub use settings::MappingSettings;

mod type_registry;
pub use type_registry::{JdbcMapping, JdbcType, TypeRegistry};

use crate::{boot, Error, NavigableRole, Result, Type};
use std_util::str as strs;

/// Services threaded through every construction call.
///
/// The context is immutable for the duration of a bootstrap, so independent
/// bootstraps never share mutable state.
#[derive(Debug, Clone, Default)]
pub struct CreationContext {
    pub dialect: Dialect,
    pub types: TypeRegistry,
    pub settings: MappingSettings,
}

impl CreationContext {
    pub fn new(
        dialect: Dialect,
        types: TypeRegistry,
        settings: MappingSettings,
    ) -> CreationContext {
        CreationContext {
            dialect,
            types,
            settings,
        }
    }

    /// Resolves the rendered table expression of an entity.
    pub fn entity_table(
        &self,
        role: &NavigableRole,
        entity: &str,
        table: Option<&boot::Table>,
    ) -> Result<String> {
        match table {
            Some(table) => Ok(self.table_expression(table)),
            None if self.settings.implicit_table_names => {
                let name = strs::pluralize(&strs::snake_case(entity));
                Ok(self.table_expression(&boot::Table::new(name)))
            }
            None => Err(Error::invalid_mapping(
                role,
                format!("entity `{entity}` declares no table"),
            )),
        }
    }

    /// Renders a table reference, applying the configured prefix and quoting.
    pub fn table_expression(&self, table: &boot::Table) -> String {
        let name = match &self.settings.table_name_prefix {
            Some(prefix) => format!("{prefix}{}", table.name),
            None => table.name.clone(),
        };

        self.dialect.render_identifier(&name, table.quoted)
    }

    pub fn column_expression(&self, column: &boot::Column) -> String {
        self.dialect.render_identifier(&column.name, column.quoted)
    }

    pub fn jdbc_mapping(&self, ty: Type) -> JdbcMapping {
        self.types.resolve(self.dialect, ty)
    }
}
