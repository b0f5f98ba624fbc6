use super::{
    AssociationKey, AttributeId, AttributeMapping, EmbeddableId, EmbeddableMappingType, EntityId,
    EntityMappingType, ForeignKeyDescriptor, ForeignKeyId, ManagedTypeId, PartRef,
};
use crate::context::{Dialect, MappingSettings};
use crate::{Builder, Error, NavigableRole, NotReady, Result};

use indexmap::IndexMap;

/// The runtime metamodel: every entity, composite and foreign key of a
/// persistence unit, fully resolved.
///
/// Built once by [`Builder::build`] and shared read-only afterwards.
#[derive(Debug)]
pub struct Metamodel {
    pub(crate) entities: IndexMap<String, EntityMappingType>,
    pub(crate) embeddables: Vec<EmbeddableMappingType>,
    pub(crate) foreign_keys: Vec<ForeignKeyDescriptor>,
    pub(crate) association_keys: IndexMap<AssociationKey, Vec<ForeignKeyId>>,
    pub(crate) roles: IndexMap<NavigableRole, PartRef>,
    pub(crate) dialect: Dialect,
    pub(crate) settings: MappingSettings,
}

impl Metamodel {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn new(dialect: Dialect, settings: MappingSettings) -> Metamodel {
        Metamodel {
            entities: IndexMap::new(),
            embeddables: vec![],
            foreign_keys: vec![],
            association_keys: IndexMap::new(),
            roles: IndexMap::new(),
            dialect,
            settings,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn settings(&self) -> &MappingSettings {
        &self.settings
    }

    pub fn entity(&self, id: impl Into<EntityId>) -> &EntityMappingType {
        let id = id.into();
        self.entities
            .get_index(id.0)
            .map(|(_, entity)| entity)
            .expect("invalid entity ID")
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&EntityMappingType> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl ExactSizeIterator<Item = &EntityMappingType> + '_ {
        self.entities.values()
    }

    pub fn embeddable(&self, id: EmbeddableId) -> &EmbeddableMappingType {
        &self.embeddables[id.0]
    }

    pub fn embeddables(&self) -> &[EmbeddableMappingType] {
        &self.embeddables
    }

    pub fn foreign_key(&self, id: ForeignKeyId) -> &ForeignKeyDescriptor {
        &self.foreign_keys[id.0]
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyDescriptor] {
        &self.foreign_keys
    }

    /// Descriptors of the physical key `key`, one per distinct target.
    pub fn foreign_keys_by_association_key(
        &self,
        key: &AssociationKey,
    ) -> impl Iterator<Item = &ForeignKeyDescriptor> + '_ {
        self.association_keys
            .get(key)
            .into_iter()
            .flatten()
            .map(|id| self.foreign_key(*id))
    }

    pub fn attribute(&self, id: AttributeId) -> core::result::Result<&AttributeMapping, NotReady> {
        let attributes = match id.owner {
            ManagedTypeId::Entity(entity) => self.entity(entity).attributes()?,
            ManagedTypeId::Embeddable(embeddable) => self.embeddable(embeddable).attributes()?,
        };

        Ok(&attributes[id.index])
    }

    pub(crate) fn attribute_mut(&mut self, id: AttributeId) -> Option<&mut AttributeMapping> {
        let attributes = match id.owner {
            ManagedTypeId::Entity(entity) => self
                .entities
                .get_index_mut(entity.0)?
                .1
                .attributes
                .get_mut()?,
            ManagedTypeId::Embeddable(embeddable) => self
                .embeddables
                .get_mut(embeddable.0)?
                .attributes
                .get_mut()?,
        };

        attributes.get_mut(id.index)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut EntityMappingType {
        self.entities
            .get_index_mut(id.0)
            .map(|(_, entity)| entity)
            .expect("invalid entity ID")
    }

    pub(crate) fn embeddable_mut(&mut self, id: EmbeddableId) -> &mut EmbeddableMappingType {
        &mut self.embeddables[id.0]
    }

    /// Resolves a role, such as `Order.customer`, to the node it names.
    pub fn part(&self, role: &str) -> Option<PartRef> {
        self.roles.get(role).copied()
    }

    pub fn roles(&self) -> impl Iterator<Item = (&NavigableRole, PartRef)> + '_ {
        self.roles.iter().map(|(role, part)| (role, *part))
    }

    pub fn attribute_by_role(&self, role: &str) -> Option<&AttributeMapping> {
        match self.part(role)? {
            PartRef::Attribute(id) => self.attribute(id).ok(),
            _ => None,
        }
    }

    /// Foreign key of the association or collection at `role`.
    ///
    /// For a collection this is its key descriptor.
    pub fn foreign_key_of(&self, role: &str) -> Option<&ForeignKeyDescriptor> {
        let id = match self.attribute_by_role(role)? {
            AttributeMapping::ToOne(attr) => attr.foreign_key().ok()?,
            AttributeMapping::Plural(attr) => attr.key_descriptor().ok()?,
            _ => return None,
        };

        Some(self.foreign_key(id))
    }

    /// Walks a dotted attribute path, such as `details.customer`, from an
    /// entity through its embedded attributes.
    pub fn find_attribute(
        &self,
        entity: EntityId,
        path: &str,
    ) -> core::result::Result<Option<AttributeId>, NotReady> {
        let mut owner = ManagedTypeId::Entity(entity);
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let attributes = match owner {
                ManagedTypeId::Entity(entity) => self.entity(entity).attributes()?,
                ManagedTypeId::Embeddable(embeddable) => self.embeddable(embeddable).attributes()?,
            };

            let Some(index) = attributes.iter().position(|attr| attr.name() == segment) else {
                return Ok(None);
            };

            if segments.peek().is_none() {
                return Ok(Some(owner.attribute(index)));
            }

            match &attributes[index] {
                AttributeMapping::Embedded(attr) => {
                    owner = ManagedTypeId::Embeddable(attr.embeddable)
                }
                _ => return Ok(None),
            }
        }

        Ok(None)
    }

    pub(crate) fn register_role(&mut self, role: NavigableRole, part: PartRef) -> Result<()> {
        if self.roles.contains_key(&role) {
            return Err(Error::invalid_mapping(&role, "role is declared twice"));
        }

        self.roles.insert(role, part);
        Ok(())
    }
}
