use super::Dialect;
use crate::Type;

use std::collections::HashMap;

/// Storage type of a column, as seen by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JdbcType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Varchar,
    Uuid,
    Binary,
}

/// Storage type of a column together with the domain type it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JdbcMapping {
    pub jdbc_type: JdbcType,
    pub value_type: Type,
}

/// Resolves domain types to JDBC mappings, with per-type overrides.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    overrides: HashMap<Type, JdbcType>,
}

impl JdbcType {
    pub fn is_integral(self) -> bool {
        matches!(self, JdbcType::Integer | JdbcType::BigInt)
    }
}

impl JdbcMapping {
    /// Two columns can be joined when they store the same JDBC type, or both
    /// store integers.
    pub fn is_compatible(&self, other: &JdbcMapping) -> bool {
        self.jdbc_type == other.jdbc_type
            || (self.jdbc_type.is_integral() && other.jdbc_type.is_integral())
    }
}

impl TypeRegistry {
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    pub fn register(&mut self, ty: Type, jdbc_type: JdbcType) -> &mut Self {
        self.overrides.insert(ty, jdbc_type);
        self
    }

    pub fn resolve(&self, dialect: Dialect, ty: Type) -> JdbcMapping {
        let jdbc_type = self
            .overrides
            .get(&ty)
            .copied()
            .unwrap_or_else(|| dialect.default_jdbc_type(ty));

        JdbcMapping {
            jdbc_type,
            value_type: ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_dialect_defaults() {
        let mut types = TypeRegistry::new();
        assert_eq!(
            types.resolve(Dialect::Mysql, Type::Uuid).jdbc_type,
            JdbcType::Binary
        );

        types.register(Type::Uuid, JdbcType::Varchar);
        assert_eq!(
            types.resolve(Dialect::Mysql, Type::Uuid).jdbc_type,
            JdbcType::Varchar
        );
    }

    #[test]
    fn integral_types_are_compatible() {
        let types = TypeRegistry::new();
        let int = types.resolve(Dialect::Postgresql, Type::I32);
        let big = types.resolve(Dialect::Postgresql, Type::I64);
        let text = types.resolve(Dialect::Postgresql, Type::String);

        assert!(int.is_compatible(&big));
        assert!(!int.is_compatible(&text));
    }
}
