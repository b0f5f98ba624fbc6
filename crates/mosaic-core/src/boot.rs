//! Declarative, pre-resolution description of the persistent model.
//!
//! The boot model is plain data. Parsing it from annotations or mapping files
//! happens elsewhere; the metamodel builder only reads it.

mod any;
pub use any::AnyValue;

mod collection;
pub use collection::{Collection, CollectionElement, CollectionNature};

mod component;
pub use component::{Component, ComponentSubtype};

mod identifier;
pub use identifier::{IdClass, Identifier};

mod persistent_class;
pub use persistent_class::{InheritanceStrategy, PersistentClass};

mod property;
pub use property::Property;

mod selectable;
pub use selectable::{BasicValue, Column, Formula, Selectable, Table};

mod to_one;
pub use to_one::{NotFoundAction, ToOne, ToOneKind};

mod value;
pub use value::BootValue;

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct BootModel {
    /// Entity declarations, keyed by entity name, in declaration order.
    pub entities: IndexMap<String, PersistentClass>,
}

impl BootModel {
    pub fn new() -> BootModel {
        BootModel::default()
    }

    /// Adds an entity declaration, replacing any previous one with the same
    /// name.
    pub fn entity(mut self, class: PersistentClass) -> BootModel {
        self.add(class);
        self
    }

    pub fn add(&mut self, class: PersistentClass) {
        self.entities.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&PersistentClass> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl ExactSizeIterator<Item = &PersistentClass> + '_ {
        self.entities.values()
    }

    /// Walks the superclass chain of `name`, starting with `name` itself.
    pub fn hierarchy(&self, name: &str) -> Vec<&PersistentClass> {
        let mut chain = vec![];
        let mut next = self.get(name);

        while let Some(class) = next {
            if chain.iter().any(|seen: &&PersistentClass| seen.name == class.name) {
                break;
            }

            chain.push(class);
            next = class.superclass.as_deref().and_then(|name| self.get(name));
        }

        chain
    }

    /// Returns the root of the inheritance hierarchy containing `name`.
    pub fn root_of(&self, name: &str) -> Option<&PersistentClass> {
        self.hierarchy(name).last().copied()
    }
}
