use super::*;

use mosaic_core::mapping::{EntityMappingType, Metamodel};
use mosaic_core::Value;

/// Updates the row of one table matched by `filter`.
#[derive(Debug, Clone)]
pub struct Update {
    /// Rendered table expression
    pub table: String,
    pub assignments: Vec<(WriteColumn, Value)>,
    pub filter: Expr,
}

impl Update {
    /// Writes the updatable columns of an entity instance, one update per
    /// table, each matched on the identifier columns.
    ///
    /// Tables with no updatable column produce no statement.
    pub fn entity(
        mm: &Metamodel,
        entity: &EntityMappingType,
        instance: &Value,
    ) -> Result<Vec<Update>> {
        let row = entity.disassemble(mm, instance)?;
        let selectables = built(entity.selectables())?;
        let identifier = built(built(entity.identifier())?.selectables(mm))?;
        let id_len = identifier.len();

        let mut updates: Vec<Update> = vec![];

        for (selectable, value) in selectables.iter().zip(&row).skip(id_len) {
            if selectable.is_formula || !selectable.updatable {
                continue;
            }

            let position = match updates
                .iter()
                .position(|update| update.table == selectable.table)
            {
                Some(position) => position,
                None => {
                    let filter = Expr::and_from_vec(
                        identifier
                            .iter()
                            .zip(&row[..id_len])
                            .map(|(id, value)| {
                                let column = Expr::column(&selectable.table, id);
                                match value {
                                    Value::Null => Expr::is_null(column),
                                    value => Expr::eq(column, value.clone()),
                                }
                            })
                            .collect(),
                    );

                    updates.push(Update {
                        table: selectable.table.clone(),
                        assignments: vec![],
                        filter,
                    });
                    updates.len() - 1
                }
            };

            updates[position]
                .assignments
                .push((WriteColumn::new(selectable), value.clone()));
        }

        Ok(updates)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}
