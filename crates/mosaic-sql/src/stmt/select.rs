use super::*;

use mosaic_core::mapping::{EntityMappingType, ForeignKeyDescriptor, Metamodel, SelectableMappings};
use mosaic_core::Value;

/// A SELECT over a table group: one root table and the tables joined to it.
#[derive(Debug, Clone)]
pub struct Select {
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub columns: Vec<ExprColumn>,
    pub filter: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    /// Rendered table expression
    pub table: String,
    pub alias: String,
}

#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl Select {
    /// Starts a select from `table`, aliased `tbl_0`.
    pub fn from_table(table: impl Into<String>) -> Select {
        Select {
            from: TableRef {
                table: table.into(),
                alias: alias(0),
            },
            joins: vec![],
            columns: vec![],
            filter: None,
        }
    }

    /// Selects the full row of an entity, in selectable order.
    ///
    /// Tables other than the identifier's own (the subclass tables of a
    /// joined hierarchy) are inner-joined on the identifier columns.
    pub fn entity(mm: &Metamodel, entity: &EntityMappingType) -> Result<Select> {
        let identifier = built(built(entity.identifier())?.selectables(mm))?;
        let root_table = identifier
            .first()
            .map(|selectable| selectable.table.as_str())
            .unwrap_or(&entity.table);

        let mut select = Select::from_table(root_table);

        for selectable in built(entity.selectables())?.iter() {
            let alias = match select.alias_of(&selectable.table) {
                Some(alias) => alias.to_string(),
                None => {
                    let table = select.next_table(&selectable.table);
                    let root = select.from.alias.clone();
                    let on = Expr::and_from_vec(
                        identifier
                            .iter()
                            .map(|id| {
                                Expr::eq(Expr::column(&table.alias, id), Expr::column(&root, id))
                            })
                            .collect(),
                    );

                    let alias = table.alias.clone();
                    select.joins.push(Join {
                        kind: JoinKind::Inner,
                        table,
                        on,
                    });
                    alias
                }
            };

            select.columns.push(ExprColumn::new(alias, selectable));
        }

        Ok(select)
    }

    /// Selects the row of the entity instance identified by `id`.
    pub fn entity_by_identifier(
        mm: &Metamodel,
        entity: &EntityMappingType,
        id: &Value,
    ) -> Result<Select> {
        let mut select = Select::entity(mm, entity)?;
        let identifier = built(entity.identifier())?;

        let mut values = vec![];
        identifier.disassemble(mm, id, &mut values)?;

        let root = select.from.alias.clone();
        let filter = Expr::and_from_vec(
            built(identifier.selectables(mm))?
                .iter()
                .zip(values)
                .map(|(selectable, value)| match value {
                    Value::Null => Expr::is_null(Expr::column(&root, selectable)),
                    value => Expr::eq(Expr::column(&root, selectable), value),
                })
                .collect(),
        );

        select.and_filter(filter);
        Ok(select)
    }

    /// Adds the selectables of a part read through `alias`.
    pub fn columns(&mut self, alias: &str, selectables: &SelectableMappings) -> &mut Self {
        self.columns
            .extend(selectables.iter().map(|selectable| ExprColumn::new(alias, selectable)));
        self
    }

    /// Left-joins the target table of `foreign_key`, whose key table is read
    /// through `key_alias`. Returns the alias of the joined table.
    pub fn join_foreign_key(
        &mut self,
        foreign_key: &ForeignKeyDescriptor,
        key_alias: &str,
    ) -> String {
        let table = self.next_table(foreign_key.target_table());
        let on = foreign_key.join_predicate(key_alias, &table.alias);
        let alias = table.alias.clone();

        self.joins.push(Join {
            kind: JoinKind::Left,
            table,
            on,
        });

        alias
    }

    /// Left-joins the key table of `foreign_key` from its target table, read
    /// through `target_alias`. Collections reach their collection table this
    /// way. Returns the alias of the joined table.
    pub fn join_key_table(
        &mut self,
        foreign_key: &ForeignKeyDescriptor,
        target_alias: &str,
    ) -> String {
        let table = self.next_table(foreign_key.key_table());
        let on = foreign_key.join_predicate(&table.alias, target_alias);
        let alias = table.alias.clone();

        self.joins.push(Join {
            kind: JoinKind::Left,
            table,
            on,
        });

        alias
    }

    pub fn and_filter(&mut self, expr: impl Into<Expr>) -> &mut Self {
        self.filter = Some(match self.filter.take() {
            Some(filter) => Expr::and(filter, expr),
            None => expr.into(),
        });
        self
    }

    /// Alias of the first occurrence of `table` in the table group.
    pub fn alias_of(&self, table: &str) -> Option<&str> {
        std::iter::once(&self.from)
            .chain(self.joins.iter().map(|join| &join.table))
            .find(|table_ref| table_ref.table == table)
            .map(|table_ref| table_ref.alias.as_str())
    }

    fn next_table(&self, table: &str) -> TableRef {
        TableRef {
            table: table.to_string(),
            alias: alias(self.joins.len() + 1),
        }
    }
}

fn alias(index: usize) -> String {
    format!("tbl_{index}")
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Self::Select(value)
    }
}
