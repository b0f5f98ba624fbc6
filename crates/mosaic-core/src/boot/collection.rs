use super::{BasicValue, Component, Selectable, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionNature {
    Bag,
    IdBag,
    List,
    Set,
    Map,
}

#[derive(Debug, Clone)]
pub enum CollectionElement {
    Basic(BasicValue),
    Component(Component),
    OneToMany {
        entity: String,
    },
    ManyToMany {
        entity: String,
        columns: Vec<Selectable>,
        referenced_property: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub nature: CollectionNature,
    pub element: CollectionElement,

    /// Columns holding the owner's key. Live on the collection table, or on
    /// the element's table for a one-to-many.
    pub key_columns: Vec<Selectable>,

    /// Collection (or join) table. Unset for a one-to-many.
    pub table: Option<Table>,

    /// Path of the attribute on the element entity that owns the key.
    pub mapped_by: Option<String>,

    /// List index or map key.
    pub index: Option<BasicValue>,

    /// Row identifier of an id-bag.
    pub identifier: Option<BasicValue>,

    /// Key and element columns already follow canonical order.
    pub sorted: bool,
}

impl Collection {
    pub fn new(nature: CollectionNature, element: CollectionElement) -> Collection {
        Collection {
            nature,
            element,
            key_columns: vec![],
            table: None,
            mapped_by: None,
            index: None,
            identifier: None,
            sorted: false,
        }
    }

    pub fn one_to_many(entity: impl Into<String>) -> Collection {
        Collection::new(
            CollectionNature::Bag,
            CollectionElement::OneToMany {
                entity: entity.into(),
            },
        )
    }

    pub fn many_to_many(entity: impl Into<String>, table: impl Into<Table>) -> Collection {
        Collection::new(
            CollectionNature::Bag,
            CollectionElement::ManyToMany {
                entity: entity.into(),
                columns: vec![],
                referenced_property: None,
            },
        )
        .table(table)
    }

    pub fn elements(element: BasicValue, table: impl Into<Table>) -> Collection {
        Collection::new(CollectionNature::Bag, CollectionElement::Basic(element)).table(table)
    }

    pub fn components(element: Component, table: impl Into<Table>) -> Collection {
        Collection::new(CollectionNature::Bag, CollectionElement::Component(element)).table(table)
    }

    pub fn table(mut self, table: impl Into<Table>) -> Collection {
        self.table = Some(table.into());
        self
    }

    pub fn key_column(mut self, column: impl Into<Selectable>) -> Collection {
        self.key_columns.push(column.into());
        self
    }

    pub fn element_column(mut self, column: impl Into<Selectable>) -> Collection {
        if let CollectionElement::ManyToMany { columns, .. } = &mut self.element {
            columns.push(column.into());
        }
        self
    }

    pub fn mapped_by(mut self, path: impl Into<String>) -> Collection {
        self.mapped_by = Some(path.into());
        self
    }

    pub fn set(mut self) -> Collection {
        self.nature = CollectionNature::Set;
        self
    }

    pub fn list(mut self, index: BasicValue) -> Collection {
        self.nature = CollectionNature::List;
        self.index = Some(index);
        self
    }

    pub fn map(mut self, key: BasicValue) -> Collection {
        self.nature = CollectionNature::Map;
        self.index = Some(key);
        self
    }

    pub fn id_bag(mut self, identifier: BasicValue) -> Collection {
        self.nature = CollectionNature::IdBag;
        self.identifier = Some(identifier);
        self
    }

    pub fn sorted(mut self) -> Collection {
        self.sorted = true;
        self
    }

    /// Name of the element entity, for entity-valued collections.
    pub fn element_entity(&self) -> Option<&str> {
        match &self.element {
            CollectionElement::OneToMany { entity } => Some(entity),
            CollectionElement::ManyToMany { entity, .. } => Some(entity),
            _ => None,
        }
    }
}
