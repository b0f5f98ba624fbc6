use super::{AttributeMetadata, EntityId, Metamodel, SelectableMappings};
use crate::{Error, Result, Value};

/// An "any" association: the discriminator column selects the target entity
/// and the key column holds its identifier.
#[derive(Debug, Clone)]
pub struct DiscriminatedAttributeMapping {
    pub meta: AttributeMetadata,
    pub discriminator: SelectableMappings,
    pub key: SelectableMappings,
    pub meta_values: Vec<(Value, EntityId)>,
}

impl DiscriminatedAttributeMapping {
    pub fn entity_for(&self, discriminator: &Value) -> Option<EntityId> {
        self.meta_values
            .iter()
            .find(|(value, _)| value == discriminator)
            .map(|(_, entity)| *entity)
    }

    pub fn discriminator_for(&self, entity: EntityId) -> Option<&Value> {
        self.meta_values
            .iter()
            .find(|(_, candidate)| *candidate == entity)
            .map(|(value, _)| value)
    }

    pub(super) fn disassemble(
        &self,
        mm: &Metamodel,
        value: &Value,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        let reference = match value {
            Value::Null => {
                out.extend([Value::Null, Value::Null]);
                return Ok(());
            }
            Value::Reference(reference) => reference,
            other => {
                return Err(Error::invalid_value(format!(
                    "`{}` expects a reference, found {other:?}",
                    self.meta.role
                )))
            }
        };

        let discriminator = mm
            .entity_by_name(&reference.entity)
            .and_then(|entity| self.discriminator_for(entity.id))
            .ok_or_else(|| {
                Error::invalid_value(format!(
                    "`{}` has no discriminator value for entity `{}`",
                    self.meta.role, reference.entity
                ))
            })?;

        out.push(discriminator.clone());
        out.push((*reference.key).clone());
        Ok(())
    }

    pub(super) fn assemble(&self, mm: &Metamodel, values: &[Value]) -> Result<Value> {
        let [discriminator, key] = values else {
            return Err(Error::invalid_value(format!(
                "`{}` spans 2 columns, got {} value(s)",
                self.meta.role,
                values.len()
            )));
        };

        if discriminator.is_null() || key.is_null() {
            return Ok(Value::Null);
        }

        let entity = self.entity_for(discriminator).ok_or_else(|| {
            Error::invalid_value(format!(
                "`{}` has no entity for discriminator value {discriminator:?}",
                self.meta.role
            ))
        })?;

        Ok(Value::reference(mm.entity(entity).name.clone(), key.clone()))
    }
}
