use super::{
    BasicAttributeMapping, EmbeddableId, EmbeddedAttributeMapping, Metamodel, SelectableMappings,
};
use crate::{NavigableRole, NotReady, PropertyAccess, Result, Value};

/// How an entity is identified.
#[derive(Debug, Clone)]
pub enum EntityIdentifierMapping {
    /// A single basic attribute.
    Simple(BasicAttributeMapping),

    /// A single attribute of composite type.
    AggregatedComposite(EmbeddedAttributeMapping),

    /// Several entity attributes, grouped into a virtual composite.
    NonAggregatedComposite(NonAggregatedIdentifier),
}

#[derive(Debug, Clone)]
pub struct NonAggregatedIdentifier {
    pub role: NavigableRole,

    /// Virtual composite holding the identifier attributes.
    pub embeddable: EmbeddableId,

    /// Id class the identifier value is an instance of. Without one the value
    /// is a record of the attribute values.
    pub id_class: Option<String>,

    pub access: PropertyAccess,
}

impl EntityIdentifierMapping {
    pub fn role(&self) -> &NavigableRole {
        match self {
            EntityIdentifierMapping::Simple(attr) => &attr.meta.role,
            EntityIdentifierMapping::AggregatedComposite(attr) => &attr.meta.role,
            EntityIdentifierMapping::NonAggregatedComposite(id) => &id.role,
        }
    }

    /// Composite backing the identifier, if it is not simple.
    pub fn embeddable(&self) -> Option<EmbeddableId> {
        match self {
            EntityIdentifierMapping::Simple(_) => None,
            EntityIdentifierMapping::AggregatedComposite(attr) => Some(attr.embeddable),
            EntityIdentifierMapping::NonAggregatedComposite(id) => Some(id.embeddable),
        }
    }

    /// Reads the identifier value off an entity instance.
    pub fn access(&self) -> &PropertyAccess {
        match self {
            EntityIdentifierMapping::Simple(attr) => &attr.meta.access,
            EntityIdentifierMapping::AggregatedComposite(attr) => &attr.meta.access,
            EntityIdentifierMapping::NonAggregatedComposite(id) => &id.access,
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, EntityIdentifierMapping::Simple(_))
    }

    pub fn selectables(
        &self,
        mm: &Metamodel,
    ) -> core::result::Result<SelectableMappings, NotReady> {
        match self {
            EntityIdentifierMapping::Simple(attr) => Ok(attr.selectable.clone()),
            _ => match self.embeddable() {
                Some(embeddable) => mm.embeddable(embeddable).selectables().cloned(),
                None => Ok(SelectableMappings::empty()),
            },
        }
    }

    pub fn disassemble(&self, mm: &Metamodel, value: &Value, out: &mut Vec<Value>) -> Result<()> {
        match self {
            EntityIdentifierMapping::Simple(attr) => attr.disassemble(value, out),
            EntityIdentifierMapping::AggregatedComposite(attr) => {
                mm.embeddable(attr.embeddable).disassemble(mm, value, out)
            }
            EntityIdentifierMapping::NonAggregatedComposite(id) => {
                mm.embeddable(id.embeddable).disassemble(mm, value, out)
            }
        }
    }

    pub fn assemble(&self, mm: &Metamodel, values: &[Value]) -> Result<Value> {
        match self {
            EntityIdentifierMapping::Simple(_) => Ok(values.first().cloned().unwrap_or_default()),
            EntityIdentifierMapping::AggregatedComposite(attr) => {
                mm.embeddable(attr.embeddable).assemble(mm, values)
            }
            EntityIdentifierMapping::NonAggregatedComposite(id) => {
                mm.embeddable(id.embeddable).assemble(mm, values)
            }
        }
    }
}
