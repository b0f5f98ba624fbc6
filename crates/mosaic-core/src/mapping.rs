//! The runtime metamodel.
//!
//! Nodes live in arenas owned by [`Metamodel`] and refer to each other by
//! index, so a node never holds a pointer to one that may not exist yet.
//! Parts that are filled in by later creation steps sit in [`Slot`]s.
//!
//! [`Slot`]: crate::creation::Slot

mod attribute;
pub use attribute::{
    AttributeId, AttributeMapping, AttributeMetadata, BasicAttributeMapping,
    EmbeddedAttributeMapping, FetchStyle, FetchTiming, ManagedTypeId,
};

mod discriminated;
pub use discriminated::DiscriminatedAttributeMapping;

mod embeddable;
pub use embeddable::{
    ConcreteEmbeddableType, DiscriminatorMapping, EmbeddableId, EmbeddableMappingType, SubtypeSet,
};

mod entity;
pub use entity::{EntityDiscriminatorMapping, EntityId, EntityMappingType, NaturalIdMapping};

mod foreign_key;
pub use foreign_key::{
    AssociationKey, EmbeddedForeignKeyDescriptor, ForeignKeyDescriptor, ForeignKeyId,
    ForeignKeySide, SideNature, SimpleForeignKeyDescriptor,
};

mod identifier;
pub use identifier::{EntityIdentifierMapping, NonAggregatedIdentifier};

mod metamodel;
pub use metamodel::Metamodel;

mod part;
pub use part::{CollectionPartNature, PartRef};

mod plural;
pub use plural::{CollectionPart, PluralAttributeMapping};

mod selectable;
pub use selectable::{expand_property_order, SelectableMapping, SelectableMappings};

mod to_one;
pub use to_one::ToOneAttributeMapping;

use crate::{err, NotReady, Result};

/// Converts a read of a node that must be built by now.
///
/// Once the metamodel is frozen every slot is ready, so a `NotReady` here
/// means the node was used during creation before its step ran.
pub(crate) fn built<T>(read: core::result::Result<T, NotReady>) -> Result<T> {
    read.map_err(|not_ready| err!("{not_ready} was read before it was built"))
}
