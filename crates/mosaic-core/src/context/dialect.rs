use super::JdbcType;
use crate::Type;

/// Target database flavor. Controls identifier quoting and default JDBC types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    #[default]
    Postgresql,
    Sqlite,
    Mysql,
}

const RESERVED: &[&str] = &[
    "all", "and", "as", "by", "case", "check", "column", "constraint", "create", "default",
    "delete", "desc", "distinct", "drop", "from", "group", "having", "in", "index", "insert",
    "into", "join", "key", "limit", "not", "null", "on", "or", "order", "primary", "references",
    "select", "table", "to", "union", "unique", "update", "user", "values", "when", "where",
];

impl Dialect {
    pub fn quote_chars(self) -> (char, char) {
        match self {
            Dialect::Postgresql | Dialect::Sqlite => ('"', '"'),
            Dialect::Mysql => ('`', '`'),
        }
    }

    pub fn quote(self, ident: &str) -> String {
        let (open, close) = self.quote_chars();
        let escaped = ident.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    pub fn is_reserved(self, word: &str) -> bool {
        let lower = word.to_ascii_lowercase();

        if RESERVED.contains(&lower.as_str()) {
            return true;
        }

        matches!(
            (self, lower.as_str()),
            (Dialect::Mysql, "rank" | "range" | "read" | "condition")
                | (Dialect::Postgresql, "analyse" | "analyze" | "offset")
        )
    }

    /// Quotes `name` when asked to, or when it collides with a reserved word.
    pub fn render_identifier(self, name: &str, quoted: bool) -> String {
        if quoted || self.is_reserved(name) {
            self.quote(name)
        } else {
            name.to_string()
        }
    }

    /// Storage type used for a domain type when nothing is registered.
    pub fn default_jdbc_type(self, ty: Type) -> JdbcType {
        match (self, ty) {
            (Dialect::Sqlite, Type::Bool) => JdbcType::Integer,
            (_, Type::Bool) => JdbcType::Boolean,
            (_, Type::I32) => JdbcType::Integer,
            (_, Type::I64) => JdbcType::BigInt,
            (_, Type::F64) => JdbcType::Double,
            (_, Type::String) => JdbcType::Varchar,
            (Dialect::Postgresql, Type::Uuid) => JdbcType::Uuid,
            (Dialect::Mysql, Type::Uuid) => JdbcType::Binary,
            (Dialect::Sqlite, Type::Uuid) => JdbcType::Varchar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_are_quoted() {
        assert_eq!(Dialect::Postgresql.render_identifier("order", false), "\"order\"");
        assert_eq!(Dialect::Mysql.render_identifier("ORDER", false), "`ORDER`");
        assert_eq!(Dialect::Sqlite.render_identifier("orders", false), "orders");
        assert_eq!(Dialect::Mysql.render_identifier("rank", false), "`rank`");
        assert_eq!(Dialect::Postgresql.render_identifier("rank", false), "rank");
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        assert_eq!(Dialect::Postgresql.quote("a\"b"), "\"a\"\"b\"");
    }
}
