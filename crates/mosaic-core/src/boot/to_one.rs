use super::Selectable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToOneKind {
    ManyToOne,
    OneToOne,
}

/// What to do when the referenced row is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundAction {
    #[default]
    Exception,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct ToOne {
    pub kind: ToOneKind,

    /// Name of the referenced entity.
    pub entity: String,

    /// Unique attribute of the referenced entity the join columns point at.
    /// The identifier is referenced when unset.
    pub referenced_property: Option<String>,

    /// Join columns, in the declaration order of the referenced attributes.
    /// When empty, columns are named after the property and the referenced
    /// columns.
    pub columns: Vec<Selectable>,

    /// Path of the owning attribute on the referenced entity. Set on the
    /// inverse side of a one-to-one, which has no columns of its own.
    pub mapped_by: Option<String>,

    /// Join columns already follow the canonical order of the referenced
    /// attributes.
    pub sorted: bool,

    pub constrained: bool,
    pub not_found: NotFoundAction,
}

impl ToOne {
    pub fn many_to_one(entity: impl Into<String>) -> ToOne {
        ToOne::new(ToOneKind::ManyToOne, entity)
    }

    pub fn one_to_one(entity: impl Into<String>) -> ToOne {
        ToOne::new(ToOneKind::OneToOne, entity)
    }

    fn new(kind: ToOneKind, entity: impl Into<String>) -> ToOne {
        ToOne {
            kind,
            entity: entity.into(),
            referenced_property: None,
            columns: vec![],
            mapped_by: None,
            sorted: false,
            constrained: false,
            not_found: NotFoundAction::default(),
        }
    }

    pub fn column(mut self, column: impl Into<Selectable>) -> ToOne {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I>(mut self, columns: I) -> ToOne
    where
        I: IntoIterator,
        I::Item: Into<Selectable>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn referenced_property(mut self, name: impl Into<String>) -> ToOne {
        self.referenced_property = Some(name.into());
        self
    }

    pub fn mapped_by(mut self, path: impl Into<String>) -> ToOne {
        self.mapped_by = Some(path.into());
        self
    }

    pub fn sorted(mut self) -> ToOne {
        self.sorted = true;
        self
    }

    pub fn constrained(mut self) -> ToOne {
        self.constrained = true;
        self
    }

    pub fn not_found(mut self, action: NotFoundAction) -> ToOne {
        self.not_found = action;
        self
    }
}
