/// Options controlling how the boot model is turned into a metamodel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MappingSettings {
    /// If set, prefix all table names with this string
    pub table_name_prefix: Option<String>,

    /// Maximum number of to-one joins along one fetch path.
    pub max_fetch_depth: usize,

    /// Name tables of entities without an explicit table after the entity,
    /// pluralized and in snake case.
    pub implicit_table_names: bool,

    /// Assemble a composite whose columns are all null into an empty instance
    /// instead of null.
    pub create_empty_composites: bool,
}

impl Default for MappingSettings {
    fn default() -> Self {
        MappingSettings {
            table_name_prefix: None,
            max_fetch_depth: 3,
            implicit_table_names: true,
            create_empty_composites: false,
        }
    }
}
