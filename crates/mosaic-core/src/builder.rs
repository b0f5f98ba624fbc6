use crate::boot::BootModel;
use crate::context::{CreationContext, Dialect, JdbcType, MappingSettings, TypeRegistry};
use crate::creation::{self, CreationState, Scheduler};
use crate::mapping::Metamodel;
use crate::{Result, Type};

use std::sync::Arc;
use tracing::{debug, info};

/// Turns a boot model into a [`Metamodel`].
///
/// Every build gets its own creation context, so independent builds never
/// share mutable state.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    dialect: Dialect,
    types: TypeRegistry,
    settings: MappingSettings,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// If set, prefix all table names with this string
    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.settings.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn max_fetch_depth(&mut self, depth: usize) -> &mut Self {
        self.settings.max_fetch_depth = depth;
        self
    }

    pub fn implicit_table_names(&mut self, enabled: bool) -> &mut Self {
        self.settings.implicit_table_names = enabled;
        self
    }

    pub fn create_empty_composites(&mut self, enabled: bool) -> &mut Self {
        self.settings.create_empty_composites = enabled;
        self
    }

    /// Maps values of `ty` onto `jdbc_type` instead of the dialect default.
    pub fn register_type(&mut self, ty: Type, jdbc_type: JdbcType) -> &mut Self {
        self.types.register(ty, jdbc_type);
        self
    }

    pub fn settings(&mut self, settings: MappingSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Resolves `boot` into a frozen metamodel.
    ///
    /// Fails if the mapping is invalid or if creation stops making progress,
    /// for example when identifiers reference each other in a cycle.
    pub fn build(&self, boot: &BootModel) -> Result<Arc<Metamodel>> {
        let cx = CreationContext::new(self.dialect, self.types.clone(), self.settings.clone());

        let mut state = CreationState {
            boot,
            cx: &cx,
            metamodel: Metamodel::new(cx.dialect, cx.settings.clone()),
        };

        let mut scheduler = Scheduler::new();

        creation::declare_entities(&mut state, &mut scheduler)?;
        scheduler.run(&mut state)?;

        let metamodel = state.metamodel;
        metamodel.verify()?;

        debug!(passes = scheduler.passes(), "creation finished");
        info!(
            entities = metamodel.entities().len(),
            embeddables = metamodel.embeddables().len(),
            foreign_keys = metamodel.foreign_keys().len(),
            dialect = ?metamodel.dialect(),
            "metamodel built"
        );

        Ok(Arc::new(metamodel))
    }
}
