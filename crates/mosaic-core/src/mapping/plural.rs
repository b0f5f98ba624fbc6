use super::{AttributeMetadata, EmbeddableId, EntityId, ForeignKeyId, SelectableMappings};
use crate::boot::CollectionNature;
use crate::creation::Slot;
use crate::{NavigableRole, NotReady};

/// A collection-valued attribute.
#[derive(Debug, Clone)]
pub struct PluralAttributeMapping {
    pub meta: AttributeMetadata,
    pub nature: CollectionNature,

    /// Table holding the key columns: the collection or join table, or the
    /// element entity's table for a one-to-many.
    pub collection_table: String,

    pub element: CollectionPart,
    pub index: Option<CollectionPart>,
    pub identifier: Option<CollectionPart>,
    pub mapped_by: Option<String>,

    pub(crate) key: Slot<ForeignKeyId>,
}

/// Element, index or row identifier of a collection.
#[derive(Debug, Clone)]
pub enum CollectionPart {
    Basic {
        role: NavigableRole,
        selectable: SelectableMappings,
    },
    Embedded {
        role: NavigableRole,
        embeddable: EmbeddableId,
    },
    OneToMany {
        role: NavigableRole,
        entity: EntityId,
    },
    ManyToMany {
        role: NavigableRole,
        entity: EntityId,
        referenced_property: Option<String>,
        foreign_key: Slot<ForeignKeyId>,
    },
}

impl PluralAttributeMapping {
    /// Foreign key joining the collection rows to the owner.
    pub fn key_descriptor(&self) -> Result<ForeignKeyId, NotReady> {
        self.key.get(&self.meta.role, "key descriptor").copied()
    }

    /// Entity of the elements, for entity-valued collections.
    pub fn element_entity(&self) -> Option<EntityId> {
        self.element.entity()
    }
}

impl CollectionPart {
    pub fn role(&self) -> &NavigableRole {
        match self {
            CollectionPart::Basic { role, .. }
            | CollectionPart::Embedded { role, .. }
            | CollectionPart::OneToMany { role, .. }
            | CollectionPart::ManyToMany { role, .. } => role,
        }
    }

    pub fn entity(&self) -> Option<EntityId> {
        match self {
            CollectionPart::OneToMany { entity, .. }
            | CollectionPart::ManyToMany { entity, .. } => Some(*entity),
            _ => None,
        }
    }

    /// Foreign key from the join table to the element entity.
    pub fn foreign_key(&self) -> Option<Result<ForeignKeyId, NotReady>> {
        match self {
            CollectionPart::ManyToMany {
                role, foreign_key, ..
            } => Some(foreign_key.get(role, "element foreign key").copied()),
            _ => None,
        }
    }
}
