use super::{AttributeId, EmbeddableId, EntityId, ForeignKeyId, ManagedTypeId};

/// Reference to any node of the metamodel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartRef {
    Entity(EntityId),
    Identifier(EntityId),
    Attribute(AttributeId),
    Embeddable(EmbeddableId),
    ForeignKey(ForeignKeyId),
    CollectionPart {
        attribute: AttributeId,
        nature: CollectionPartNature,
    },
    Discriminator(ManagedTypeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionPartNature {
    Element,
    Index,
    Identifier,
}

impl From<EntityId> for PartRef {
    fn from(value: EntityId) -> Self {
        PartRef::Entity(value)
    }
}

impl From<AttributeId> for PartRef {
    fn from(value: AttributeId) -> Self {
        PartRef::Attribute(value)
    }
}

impl From<EmbeddableId> for PartRef {
    fn from(value: EmbeddableId) -> Self {
        PartRef::Embeddable(value)
    }
}

impl From<ForeignKeyId> for PartRef {
    fn from(value: ForeignKeyId) -> Self {
        PartRef::ForeignKey(value)
    }
}
