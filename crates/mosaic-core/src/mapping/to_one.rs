use super::{
    built, AttributeMetadata, EntityId, ForeignKeyId, Metamodel, SelectableMappings, SideNature,
};
use crate::boot::{NotFoundAction, ToOneKind};
use crate::creation::Slot;
use crate::{Error, NotReady, Result, Value};

/// A many-to-one or one-to-one association.
#[derive(Debug, Clone)]
pub struct ToOneAttributeMapping {
    pub meta: AttributeMetadata,
    pub kind: ToOneKind,

    /// Entity the association points at.
    pub target: EntityId,

    /// Unique attribute of the target the key references, when not the
    /// identifier.
    pub referenced_property: Option<String>,

    /// `Key` when this side holds the join columns, `Target` for the inverse
    /// side of a one-to-one.
    pub side: SideNature,

    pub mapped_by: Option<String>,
    pub not_found: NotFoundAction,
    pub constrained: bool,

    /// Table expression holding the join columns.
    pub key_table: String,

    pub(crate) key_selectables: Slot<SelectableMappings>,
    pub(crate) foreign_key: Slot<ForeignKeyId>,

    /// Path, relative to the target entity, of the attribute pointing back
    /// at this one.
    pub(crate) bidirectional_attribute: Slot<Option<String>>,
}

impl ToOneAttributeMapping {
    pub fn is_owning(&self) -> bool {
        self.side == SideNature::Key
    }

    pub fn key_selectables(&self) -> core::result::Result<&SelectableMappings, NotReady> {
        self.key_selectables.get(&self.meta.role, "key selectables")
    }

    pub fn foreign_key(&self) -> core::result::Result<ForeignKeyId, NotReady> {
        self.foreign_key.get(&self.meta.role, "foreign key").copied()
    }

    pub fn bidirectional_attribute(&self) -> core::result::Result<Option<&str>, NotReady> {
        Ok(self
            .bidirectional_attribute
            .get(&self.meta.role, "bidirectional attribute")?
            .as_deref())
    }

    pub(super) fn disassemble(
        &self,
        mm: &Metamodel,
        value: &Value,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        if !self.is_owning() {
            return Ok(());
        }

        let count = built(self.key_selectables())?.len();
        let fk = mm.foreign_key(built(self.foreign_key())?);

        let key = match value {
            Value::Null => {
                out.extend(std::iter::repeat(Value::Null).take(count));
                return Ok(());
            }
            Value::Reference(reference) => (*reference.key).clone(),
            Value::Object(_) => fk.target_value_of_instance(mm, value)?,
            other => {
                return Err(Error::invalid_value(format!(
                    "`{}` expects a reference to `{}`, found {other:?}",
                    self.meta.role,
                    mm.entity(self.target).name
                )))
            }
        };

        out.extend(fk.key_values_from_target(mm, &key)?);
        Ok(())
    }

    pub(super) fn assemble(&self, mm: &Metamodel, values: &[Value]) -> Result<Value> {
        if !self.is_owning() || values.iter().all(Value::is_null) {
            return Ok(Value::Null);
        }

        let fk = mm.foreign_key(built(self.foreign_key())?);
        let key = fk.target_value_from_key(mm, values)?;

        Ok(Value::reference(mm.entity(self.target).name.clone(), key))
    }
}
