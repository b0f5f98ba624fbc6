use super::Serializer;

use mosaic_core::context::Dialect;
use mosaic_core::Metamodel;

#[derive(Debug, Clone, Copy)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl Serializer {
    pub fn sqlite() -> Serializer {
        Serializer {
            flavor: Flavor::Sqlite,
        }
    }

    pub fn postgresql() -> Serializer {
        Serializer {
            flavor: Flavor::Postgresql,
        }
    }

    pub fn mysql() -> Serializer {
        Serializer {
            flavor: Flavor::Mysql,
        }
    }

    /// A serializer for the dialect the metamodel's identifiers were quoted
    /// for.
    pub fn for_metamodel(mm: &Metamodel) -> Serializer {
        match mm.dialect() {
            Dialect::Postgresql => Serializer::postgresql(),
            Dialect::Sqlite => Serializer::sqlite(),
            Dialect::Mysql => Serializer::mysql(),
        }
    }
}
