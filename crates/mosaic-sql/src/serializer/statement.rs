use super::{Comma, Params, ToSql};

use crate::stmt;

use mosaic_core::Value;

impl ToSql for &stmt::Statement {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        match self {
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Select(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        let columns = Comma(&self.columns);
        let from = &self.from;

        fmt!(f, "SELECT " columns " FROM " from);

        for join in &self.joins {
            fmt!(f, join);
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

impl ToSql for &stmt::TableRef {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        let alias = &self.alias;
        fmt!(f, &self.table " AS " alias);
    }
}

impl ToSql for &stmt::Join {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        let kind = match self.kind {
            stmt::JoinKind::Inner => " INNER JOIN ",
            stmt::JoinKind::Left => " LEFT JOIN ",
        };

        let (table, on) = (&self.table, &self.on);
        fmt!(f, kind table " ON " on);
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        let columns = Comma(self.columns.iter().map(|column| &column.expression));
        let values = Comma(
            self.columns
                .iter()
                .zip(&self.values)
                .map(|(column, value)| WriteValue { column, value }),
        );

        let table = &self.table;
        fmt!(f, "INSERT INTO " table " (" columns ") VALUES (" values ")");
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        let assignments = Comma(
            self.assignments
                .iter()
                .map(|(column, value)| Assignment(WriteValue { column, value })),
        );

        let (table, filter) = (&self.table, &self.filter);
        fmt!(f, "UPDATE " table " SET " assignments " WHERE " filter);
    }
}

/// A bound value, wrapped in the column's custom write fragment if it has
/// one.
struct WriteValue<'a> {
    column: &'a stmt::WriteColumn,
    value: &'a Value,
}

struct Assignment<'a>(WriteValue<'a>);

impl ToSql for WriteValue<'_> {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        let Some(fragment) = &self.column.custom_write else {
            fmt!(f, self.value);
            return;
        };

        let placeholder = f.params.push(self.value);
        let placeholder = f.serializer.flavor.placeholder(placeholder);
        fmt!(f, &fragment.replace('?', &placeholder));
    }
}

impl ToSql for Assignment<'_> {
    fn to_sql<T: Params>(self, f: &mut super::Formatter<'_, T>) {
        fmt!(f, &self.0.column.expression " = " self.0);
    }
}
