use crate::context::{CreationContext, JdbcMapping};
use crate::{boot, Error, NavigableRole, Result};

use std::{ops, sync::Arc};

/// How one column (or formula) of a model part is selected and written.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableMapping {
    /// Rendered expression of the containing table.
    pub table: String,

    /// Column name as declared, or the formula template.
    pub name: String,

    /// Rendered selection expression: the quoted column name, or the formula
    /// template.
    pub expression: String,

    pub is_formula: bool,

    /// Read fragment; `?` stands for the aliased column.
    pub custom_read: Option<String>,

    /// Write fragment; `?` stands for the bound value.
    pub custom_write: Option<String>,

    pub nullable: bool,
    pub insertable: bool,
    pub updatable: bool,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub jdbc: JdbcMapping,
}

/// Read-only, ordered selectables of a model part.
///
/// The length is the part's JDBC column count and never changes once the
/// part is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableMappings {
    selectables: Arc<[SelectableMapping]>,
}

impl SelectableMapping {
    pub(crate) fn from_boot(
        cx: &CreationContext,
        table: &str,
        selectable: &boot::Selectable,
        jdbc: JdbcMapping,
        insertable: bool,
        updatable: bool,
    ) -> SelectableMapping {
        match selectable {
            boot::Selectable::Column(column) => SelectableMapping {
                table: table.to_string(),
                name: column.name.clone(),
                expression: cx.column_expression(column),
                is_formula: false,
                custom_read: column.custom_read.clone(),
                custom_write: column.custom_write.clone(),
                nullable: column.nullable,
                insertable,
                updatable,
                length: column.length,
                precision: column.precision,
                scale: column.scale,
                jdbc,
            },
            // Formulas are derived; they are never written.
            boot::Selectable::Formula(formula) => SelectableMapping {
                table: table.to_string(),
                name: formula.template.clone(),
                expression: formula.template.clone(),
                is_formula: true,
                custom_read: None,
                custom_write: None,
                nullable: true,
                insertable: false,
                updatable: false,
                length: None,
                precision: None,
                scale: None,
                jdbc,
            },
        }
    }
}

impl SelectableMappings {
    pub fn new(selectables: Vec<SelectableMapping>) -> SelectableMappings {
        SelectableMappings {
            selectables: selectables.into(),
        }
    }

    pub fn empty() -> SelectableMappings {
        SelectableMappings::new(vec![])
    }

    pub fn single(selectable: SelectableMapping) -> SelectableMappings {
        SelectableMappings::new(vec![selectable])
    }

    /// Concatenates several lists, preserving order.
    pub fn concat<'a>(
        parts: impl IntoIterator<Item = &'a SelectableMappings>,
    ) -> SelectableMappings {
        SelectableMappings::new(
            parts
                .into_iter()
                .flat_map(|part| part.iter().cloned())
                .collect(),
        )
    }

    pub fn jdbc_type_count(&self) -> usize {
        self.selectables.len()
    }

    pub fn jdbc_mappings(&self) -> Vec<JdbcMapping> {
        self.iter().map(|selectable| selectable.jdbc).collect()
    }

    /// Sub-list of `len` selectables starting at `start`.
    pub fn slice(&self, start: usize, len: usize) -> SelectableMappings {
        SelectableMappings::new(self.selectables[start..start + len].to_vec())
    }

    /// Builds selectables for `columns` on `table`.
    ///
    /// `jdbc` describes the columns being matched, in canonical order.
    /// `order[i]` is the canonical position of `columns[i]`: the selectable
    /// built from `columns[i]` lands at `order[i]` and takes
    /// `jdbc[order[i]]`, unless the column declares a type of its own.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_columns(
        cx: &CreationContext,
        role: &NavigableRole,
        table: &str,
        columns: &[boot::Selectable],
        jdbc: &[JdbcMapping],
        order: &[usize],
        insertable: bool,
        updatable: bool,
    ) -> Result<SelectableMappings> {
        if columns.len() != jdbc.len() {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "column count mismatch: {} column(s) for {} referenced column(s)",
                    columns.len(),
                    jdbc.len()
                ),
            ));
        }

        if order.len() != columns.len() {
            return Err(Error::invalid_mapping(
                role,
                format!(
                    "property order covers {} column(s), expected {}",
                    order.len(),
                    columns.len()
                ),
            ));
        }

        let mut placed: Vec<Option<SelectableMapping>> = vec![None; columns.len()];

        for (column, &position) in columns.iter().zip(order) {
            let Some(slot) = placed.get_mut(position) else {
                return Err(Error::invalid_mapping(
                    role,
                    format!("property order position {position} is out of range"),
                ));
            };

            let referenced = jdbc[position];
            let mapping = match column.as_column().and_then(|column| column.ty) {
                Some(ty) => {
                    let declared = cx.jdbc_mapping(ty);

                    if !declared.is_compatible(&referenced) {
                        return Err(Error::invalid_mapping(
                            role,
                            format!(
                                "column `{}` of type {:?} is incompatible with \
                                 referenced type {:?}",
                                column.text(),
                                declared.jdbc_type,
                                referenced.jdbc_type
                            ),
                        ));
                    }

                    declared
                }
                None => referenced,
            };

            *slot = Some(SelectableMapping::from_boot(
                cx, table, column, mapping, insertable, updatable,
            ));
        }

        let selectables = placed
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::invalid_mapping(role, "property order is not a permutation"))?;

        Ok(SelectableMappings::new(selectables))
    }
}

/// Expands a property-level order into a column-level one.
///
/// `property_order[i]` is the canonical index of the `i`-th property in
/// declaration order, and `spans[c]` is the column count of canonical property
/// `c`. The result gives, for every column in declaration order, its canonical
/// column position.
pub fn expand_property_order(property_order: &[usize], spans: &[usize]) -> Vec<usize> {
    let mut starts = Vec::with_capacity(spans.len());
    let mut next = 0;

    for span in spans {
        starts.push(next);
        next += span;
    }

    property_order
        .iter()
        .flat_map(|&canonical| {
            let start = starts[canonical];
            (0..spans[canonical]).map(move |offset| start + offset)
        })
        .collect()
}

impl Default for SelectableMappings {
    fn default() -> Self {
        SelectableMappings::empty()
    }
}

impl ops::Deref for SelectableMappings {
    type Target = [SelectableMapping];

    fn deref(&self) -> &Self::Target {
        &self.selectables
    }
}

impl<'a> IntoIterator for &'a SelectableMappings {
    type IntoIter = std::slice::Iter<'a, SelectableMapping>;
    type Item = &'a SelectableMapping;

    fn into_iter(self) -> Self::IntoIter {
        self.selectables.iter()
    }
}

impl FromIterator<SelectableMapping> for SelectableMappings {
    fn from_iter<T: IntoIterator<Item = SelectableMapping>>(iter: T) -> Self {
        SelectableMappings::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_order_expands_to_columns() {
        // Canonical properties: a (1 column), b (2 columns), c (1 column).
        // Declared as c, a, b.
        let order = expand_property_order(&[2, 0, 1], &[1, 2, 1]);
        assert_eq!(order, vec![3, 0, 1, 2]);
    }

    #[test]
    fn identity_order() {
        assert_eq!(expand_property_order(&[0, 1], &[1, 1]), vec![0, 1]);
        assert!(expand_property_order(&[], &[]).is_empty());
    }
}
