use super::*;

use mosaic_core::mapping::{EntityMappingType, Metamodel, SelectableMapping};
use mosaic_core::Value;

/// Inserts one row into a single table.
#[derive(Debug, Clone)]
pub struct Insert {
    /// Rendered table expression
    pub table: String,
    pub columns: Vec<WriteColumn>,
    pub values: Vec<Value>,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Insert {
        Insert {
            table: table.into(),
            columns: vec![],
            values: vec![],
        }
    }

    pub fn push(&mut self, selectable: &SelectableMapping, value: Value) {
        self.columns.push(WriteColumn::new(selectable));
        self.values.push(value);
    }

    /// Breaks an entity instance into one insert per table, in the order the
    /// tables first appear in the entity's row.
    ///
    /// Formulas and non-insertable columns are skipped. A table other than the
    /// identifier's own repeats the identifier columns.
    pub fn entity(
        mm: &Metamodel,
        entity: &EntityMappingType,
        instance: &Value,
    ) -> Result<Vec<Insert>> {
        let row = entity.disassemble(mm, instance)?;
        let selectables = built(entity.selectables())?;
        let identifier = built(built(entity.identifier())?.selectables(mm))?;

        let mut inserts: Vec<Insert> = vec![];

        for (index, (selectable, value)) in selectables.iter().zip(&row).enumerate() {
            if selectable.is_formula || !selectable.insertable {
                continue;
            }

            let position = match inserts
                .iter()
                .position(|insert| insert.table == selectable.table)
            {
                Some(position) => position,
                None => {
                    let mut insert = Insert::new(&selectable.table);

                    if index >= identifier.len() {
                        for (id, value) in identifier.iter().zip(&row) {
                            insert.push(id, value.clone());
                        }
                    }

                    inserts.push(insert);
                    inserts.len() - 1
                }
            };

            inserts[position].push(selectable, value.clone());
        }

        Ok(inserts)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
