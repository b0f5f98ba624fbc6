use super::{
    built, DiscriminatedAttributeMapping, EmbeddableId, EntityId, Metamodel,
    PluralAttributeMapping, SelectableMapping, SelectableMappings, SubtypeSet,
    ToOneAttributeMapping,
};
use crate::{Error, NavigableRole, NotReady, PropertyAccess, Result, Value};

use std::fmt;

/// Entity or composite type that declares attributes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagedTypeId {
    Entity(EntityId),
    Embeddable(EmbeddableId),
}

/// Attribute `index` of a managed type, in state-array order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId {
    pub owner: ManagedTypeId,
    pub index: usize,
}

/// When an association or collection is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTiming {
    Immediate,
    Delayed,
}

/// How an association or collection is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStyle {
    Join,
    Select,
}

#[derive(Debug, Clone)]
pub struct AttributeMetadata {
    pub name: String,
    pub role: NavigableRole,

    /// Position in the declaring type's state array.
    pub position: usize,

    pub declaring: ManagedTypeId,
    pub fetch_timing: FetchTiming,
    pub fetch_style: FetchStyle,
    pub mutable: bool,
    pub nullable: bool,
    pub insertable: bool,
    pub updatable: bool,
    pub optimistic_lock: bool,
    pub natural_id: bool,

    /// Subtypes of a polymorphic composite that declare this attribute.
    pub declared_by: SubtypeSet,

    pub access: PropertyAccess,
}

#[derive(Debug, Clone)]
pub enum AttributeMapping {
    Basic(BasicAttributeMapping),
    Embedded(EmbeddedAttributeMapping),
    ToOne(ToOneAttributeMapping),
    Plural(PluralAttributeMapping),
    Discriminated(DiscriminatedAttributeMapping),
}

#[derive(Debug, Clone)]
pub struct BasicAttributeMapping {
    pub meta: AttributeMetadata,

    /// Always exactly one selectable.
    pub selectable: SelectableMappings,
}

#[derive(Debug, Clone)]
pub struct EmbeddedAttributeMapping {
    pub meta: AttributeMetadata,
    pub embeddable: EmbeddableId,
}

impl ManagedTypeId {
    pub fn attribute(self, index: usize) -> AttributeId {
        AttributeId { owner: self, index }
    }
}

impl AttributeMapping {
    pub fn metadata(&self) -> &AttributeMetadata {
        match self {
            AttributeMapping::Basic(attr) => &attr.meta,
            AttributeMapping::Embedded(attr) => &attr.meta,
            AttributeMapping::ToOne(attr) => &attr.meta,
            AttributeMapping::Plural(attr) => &attr.meta,
            AttributeMapping::Discriminated(attr) => &attr.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    pub fn role(&self) -> &NavigableRole {
        &self.metadata().role
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeMapping::Basic(_) => "basic",
            AttributeMapping::Embedded(_) => "embedded",
            AttributeMapping::ToOne(_) => "to-one",
            AttributeMapping::Plural(_) => "plural",
            AttributeMapping::Discriminated(_) => "discriminated",
        }
    }

    pub fn as_basic(&self) -> Option<&BasicAttributeMapping> {
        match self {
            AttributeMapping::Basic(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_embedded(&self) -> Option<&EmbeddedAttributeMapping> {
        match self {
            AttributeMapping::Embedded(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_to_one(&self) -> Option<&ToOneAttributeMapping> {
        match self {
            AttributeMapping::ToOne(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_plural(&self) -> Option<&PluralAttributeMapping> {
        match self {
            AttributeMapping::Plural(attr) => Some(attr),
            _ => None,
        }
    }

    pub fn as_discriminated(&self) -> Option<&DiscriminatedAttributeMapping> {
        match self {
            AttributeMapping::Discriminated(attr) => Some(attr),
            _ => None,
        }
    }

    pub(crate) fn as_to_one_mut(&mut self) -> Option<&mut ToOneAttributeMapping> {
        match self {
            AttributeMapping::ToOne(attr) => Some(attr),
            _ => None,
        }
    }

    pub(crate) fn as_plural_mut(&mut self) -> Option<&mut PluralAttributeMapping> {
        match self {
            AttributeMapping::Plural(attr) => Some(attr),
            _ => None,
        }
    }

    /// Columns this attribute contributes to its owner's row, in order.
    ///
    /// The inverse side of an association and collections contribute none.
    pub fn selectables(
        &self,
        mm: &Metamodel,
    ) -> core::result::Result<SelectableMappings, NotReady> {
        match self {
            AttributeMapping::Basic(attr) => Ok(attr.selectable.clone()),
            AttributeMapping::Embedded(attr) => {
                mm.embeddable(attr.embeddable).selectables().cloned()
            }
            AttributeMapping::ToOne(attr) if attr.is_owning() => attr.key_selectables().cloned(),
            AttributeMapping::ToOne(_) | AttributeMapping::Plural(_) => {
                Ok(SelectableMappings::empty())
            }
            AttributeMapping::Discriminated(attr) => {
                Ok(SelectableMappings::concat([&attr.discriminator, &attr.key]))
            }
        }
    }

    pub fn jdbc_type_count(&self, mm: &Metamodel) -> core::result::Result<usize, NotReady> {
        Ok(self.selectables(mm)?.len())
    }

    /// Breaks a domain value of this attribute into column values.
    pub fn disassemble(&self, mm: &Metamodel, value: &Value, out: &mut Vec<Value>) -> Result<()> {
        match self {
            AttributeMapping::Basic(attr) => attr.disassemble(value, out),
            AttributeMapping::Embedded(attr) => {
                mm.embeddable(attr.embeddable).disassemble(mm, value, out)
            }
            AttributeMapping::ToOne(attr) => attr.disassemble(mm, value, out),
            AttributeMapping::Plural(_) => Ok(()),
            AttributeMapping::Discriminated(attr) => attr.disassemble(mm, value, out),
        }
    }

    /// Rebuilds a domain value from exactly this attribute's column values.
    pub fn assemble(&self, mm: &Metamodel, values: &[Value]) -> Result<Value> {
        let expected = built(self.jdbc_type_count(mm))?;

        if values.len() != expected {
            return Err(Error::invalid_value(format!(
                "`{}` spans {expected} column(s), got {} value(s)",
                self.role(),
                values.len()
            )));
        }

        match self {
            AttributeMapping::Basic(_) => Ok(values[0].clone()),
            AttributeMapping::Embedded(attr) => mm.embeddable(attr.embeddable).assemble(mm, values),
            AttributeMapping::ToOne(attr) => attr.assemble(mm, values),
            AttributeMapping::Plural(_) => Ok(Value::Null),
            AttributeMapping::Discriminated(attr) => attr.assemble(mm, values),
        }
    }
}

impl BasicAttributeMapping {
    pub fn selectable(&self) -> &SelectableMapping {
        &self.selectable[0]
    }

    pub(crate) fn disassemble(&self, value: &Value, out: &mut Vec<Value>) -> Result<()> {
        let expected = self.selectable().jdbc.value_type;

        if !value.is_a(expected) {
            return Err(Error::invalid_value(format!(
                "`{}` expects a value of type {expected}, found {value:?}",
                self.meta.role
            )));
        }

        out.push(value.clone());
        Ok(())
    }
}

impl fmt::Debug for ManagedTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagedTypeId::Entity(id) => write!(f, "Entity({})", id.0),
            ManagedTypeId::Embeddable(id) => write!(f, "Embeddable({})", id.0),
        }
    }
}

impl fmt::Debug for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeId({:?}/{})", self.owner, self.index)
    }
}
