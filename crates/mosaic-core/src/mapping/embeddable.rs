use super::{
    built, expand_property_order, AttributeMapping, Metamodel, SelectableMappings,
};
use crate::creation::Slot;
use crate::{Error, NavigableRole, NotReady, PropertyAccess, Result, Value};

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmbeddableId(pub usize);

/// Set of concrete subtypes of a polymorphic composite, by subtype index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubtypeSet(u64);

/// A composite value type: an ordered list of attributes flattened into an
/// ordered list of columns.
#[derive(Debug)]
pub struct EmbeddableMappingType {
    pub id: EmbeddableId,
    pub role: NavigableRole,

    /// Type of the assembled value. Virtual composites, such as a
    /// non-aggregated identifier without an id class, assemble to a record.
    pub type_name: Option<String>,

    /// Table expression the composite's columns live in.
    pub table: String,

    pub discriminator: Option<DiscriminatorMapping>,
    pub subtypes: Vec<ConcreteEmbeddableType>,

    /// Set when this composite is the key-side mirror of another one.
    pub inverse_of: Option<EmbeddableId>,

    /// Canonical attribute index of each property, in original declaration
    /// order.
    pub(crate) property_order: Option<Vec<usize>>,

    pub(crate) attributes: Slot<Vec<AttributeMapping>>,
    pub(crate) selectables: Slot<SelectableMappings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorMapping {
    pub role: NavigableRole,
    pub selectable: SelectableMappings,
}

/// One concrete type of a polymorphic composite.
#[derive(Debug, Clone)]
pub struct ConcreteEmbeddableType {
    /// Bit of this subtype in every attribute's `declared_by` set.
    pub index: usize,

    pub type_name: String,
    pub discriminator_value: Value,

    /// Accessor per composite attribute; `None` where the subtype does not
    /// declare the attribute.
    pub(crate) accessors: Vec<Option<PropertyAccess>>,
}

impl SubtypeSet {
    /// Number of subtypes a set can hold.
    pub const CAPACITY: usize = 64;

    pub fn empty() -> SubtypeSet {
        SubtypeSet(0)
    }

    /// The set of a non-polymorphic composite: every attribute is declared.
    pub fn all() -> SubtypeSet {
        SubtypeSet(u64::MAX)
    }

    pub fn insert(&mut self, index: usize) {
        assert!(index < Self::CAPACITY, "subtype index {index} out of range");
        self.0 |= 1 << index;
    }

    pub fn contains(self, index: usize) -> bool {
        index < Self::CAPACITY && self.0 & (1 << index) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl EmbeddableMappingType {
    pub fn attributes(&self) -> core::result::Result<&[AttributeMapping], NotReady> {
        self.attributes
            .get(&self.role, "attributes")
            .map(Vec::as_slice)
    }

    pub fn selectables(&self) -> core::result::Result<&SelectableMappings, NotReady> {
        self.selectables.get(&self.role, "selectables")
    }

    pub fn attribute(
        &self,
        name: &str,
    ) -> core::result::Result<Option<&AttributeMapping>, NotReady> {
        Ok(self.attributes()?.iter().find(|attr| attr.name() == name))
    }

    pub fn jdbc_type_count(&self) -> core::result::Result<usize, NotReady> {
        Ok(self.selectables()?.len())
    }

    pub fn is_polymorphic(&self) -> bool {
        self.discriminator.is_some()
    }

    pub fn subtype_named(&self, type_name: &str) -> Option<&ConcreteEmbeddableType> {
        self.subtypes
            .iter()
            .find(|subtype| subtype.type_name == type_name)
    }

    pub fn subtype_for(&self, discriminator: &Value) -> Option<&ConcreteEmbeddableType> {
        self.subtypes
            .iter()
            .find(|subtype| subtype.discriminator_value == *discriminator)
    }

    /// Canonical column position of every column, in the composite's original
    /// declaration order.
    ///
    /// Identity unless the composite was declared in a different order than
    /// its canonical one. A discriminator column always stays last.
    pub fn column_order(&self, mm: &Metamodel) -> core::result::Result<Vec<usize>, NotReady> {
        let attributes = self.attributes()?;
        let spans = attributes
            .iter()
            .map(|attr| attr.jdbc_type_count(mm))
            .collect::<core::result::Result<Vec<_>, _>>()?;

        let property_order = match &self.property_order {
            Some(order) => order.clone(),
            None => (0..attributes.len()).collect(),
        };

        let mut order = expand_property_order(&property_order, &spans);

        if self.discriminator.is_some() {
            order.push(spans.iter().sum());
        }

        Ok(order)
    }

    /// Reads one attribute of a composite instance.
    ///
    /// On a polymorphic composite an attribute the instance's subtype does not
    /// declare reads as null, and no accessor is invoked.
    pub fn attribute_value(&self, instance: &Value, name: &str) -> Result<Value> {
        let attributes = built(self.attributes())?;
        let Some(index) = attributes.iter().position(|attr| attr.name() == name) else {
            return Err(Error::invalid_value(format!(
                "`{}` has no attribute `{name}`",
                self.role
            )));
        };

        if instance.is_null() {
            return Ok(Value::Null);
        }

        match self.concrete_type_of(instance)? {
            Some(subtype) => match subtype.declared_accessor(&attributes[index], index) {
                Some(access) => access.get(instance),
                None => Ok(Value::Null),
            },
            None => attributes[index].metadata().access.get(instance),
        }
    }

    pub fn disassemble(&self, mm: &Metamodel, value: &Value, out: &mut Vec<Value>) -> Result<()> {
        let attributes = built(self.attributes())?;

        if value.is_null() {
            let count = built(self.jdbc_type_count())?;
            out.extend(std::iter::repeat(Value::Null).take(count));
            return Ok(());
        }

        match self.concrete_type_of(value)? {
            Some(subtype) => {
                for (index, attr) in attributes.iter().enumerate() {
                    match subtype.declared_accessor(attr, index) {
                        Some(access) => attr.disassemble(mm, &access.get(value)?, out)?,
                        None => {
                            let count = built(attr.jdbc_type_count(mm))?;
                            out.extend(std::iter::repeat(Value::Null).take(count));
                        }
                    }
                }

                out.push(subtype.discriminator_value.clone());
            }
            None => {
                for attr in attributes {
                    attr.disassemble(mm, &attr.metadata().access.get(value)?, out)?;
                }
            }
        }

        Ok(())
    }

    pub fn assemble(&self, mm: &Metamodel, values: &[Value]) -> Result<Value> {
        let attributes = built(self.attributes())?;
        let expected = built(self.jdbc_type_count())?;

        if values.len() != expected {
            return Err(Error::invalid_value(format!(
                "`{}` spans {expected} column(s), got {} value(s)",
                self.role,
                values.len()
            )));
        }

        if values.iter().all(Value::is_null) && !mm.settings().create_empty_composites {
            return Ok(Value::Null);
        }

        let (subtype, values) = match values.split_last() {
            Some((discriminator, rest)) if self.is_polymorphic() => {
                if discriminator.is_null() {
                    return Ok(Value::Null);
                }

                let subtype = self.subtype_for(discriminator).ok_or_else(|| {
                    Error::invalid_value(format!(
                        "`{}` has no subtype for discriminator value {discriminator:?}",
                        self.role
                    ))
                })?;

                (Some(subtype), rest)
            }
            _ => (None, values),
        };

        let mut instance = match (subtype, &self.type_name) {
            (Some(subtype), _) => Value::object(subtype.type_name.clone(), vec![]),
            (None, Some(type_name)) => Value::object(type_name.clone(), vec![]),
            (None, None) => Value::Record(vec![]),
        };

        let mut offset = 0;

        for (index, attr) in attributes.iter().enumerate() {
            let count = built(attr.jdbc_type_count(mm))?;
            let columns = &values[offset..offset + count];
            offset += count;

            let access = match subtype {
                Some(subtype) => match subtype.declared_accessor(attr, index) {
                    Some(access) => access,
                    None => continue,
                },
                None => &attr.metadata().access,
            };

            access.set(&mut instance, attr.assemble(mm, columns)?)?;
        }

        Ok(instance)
    }

    fn concrete_type_of(&self, instance: &Value) -> Result<Option<&ConcreteEmbeddableType>> {
        if !self.is_polymorphic() {
            return Ok(None);
        }

        let object = instance.as_object().ok_or_else(|| {
            Error::invalid_value(format!(
                "polymorphic composite `{}` expects an object, found {instance:?}",
                self.role
            ))
        })?;

        self.subtype_named(&object.type_name)
            .map(Some)
            .ok_or_else(|| {
                Error::invalid_value(format!(
                    "`{}` is not a subtype of `{}`",
                    object.type_name, self.role
                ))
            })
    }
}

impl ConcreteEmbeddableType {
    /// Returns the accessor for `attr` if this subtype declares it.
    fn declared_accessor(&self, attr: &AttributeMapping, index: usize) -> Option<&PropertyAccess> {
        if !attr.metadata().declared_by.contains(self.index) {
            return None;
        }

        self.accessors.get(index).and_then(Option::as_ref)
    }

    pub fn declares(&self, attr: &AttributeMapping) -> bool {
        attr.metadata().declared_by.contains(self.index)
    }
}

impl Default for SubtypeSet {
    fn default() -> Self {
        SubtypeSet::all()
    }
}

impl fmt::Debug for SubtypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == u64::MAX {
            return f.write_str("SubtypeSet(*)");
        }

        f.debug_set()
            .entries((0..Self::CAPACITY).filter(|index| self.contains(*index)))
            .finish()
    }
}

impl fmt::Debug for EmbeddableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmbeddableId({})", self.0)
    }
}
