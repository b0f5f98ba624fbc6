use crate::mapping::{AttributeMapping, ForeignKeyDescriptor, Metamodel};
use crate::{bail, Error, NotReady, Result};

use tracing::trace;

struct Verify<'a> {
    metamodel: &'a Metamodel,
}

impl Metamodel {
    /// Checks that creation left a complete, consistent model behind.
    pub(crate) fn verify(&self) -> Result<()> {
        Verify { metamodel: self }.verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        self.verify_every_part_is_ready()
            .map_err(|not_ready| crate::err!("{not_ready} was never built"))?;

        for fk in self.metamodel.foreign_keys() {
            self.verify_foreign_key_sides(fk)?;
        }

        self.verify_shared_key_columns_agree()?;
        trace!("metamodel verified");
        Ok(())
    }

    fn verify_every_part_is_ready(&self) -> core::result::Result<(), NotReady> {
        let mm = self.metamodel;

        for entity in mm.entities() {
            entity.identifier()?;
            entity.discriminator()?;
            entity.natural_id()?;
            entity.selectables()?;

            for attr in entity.attributes()? {
                self.verify_attribute_is_ready(attr)?;
            }
        }

        for embeddable in mm.embeddables() {
            embeddable.selectables()?;

            for attr in embeddable.attributes()? {
                self.verify_attribute_is_ready(attr)?;
            }
        }

        Ok(())
    }

    fn verify_attribute_is_ready(
        &self,
        attr: &AttributeMapping,
    ) -> core::result::Result<(), NotReady> {
        match attr {
            AttributeMapping::ToOne(attr) => {
                attr.key_selectables()?;
                attr.foreign_key()?;
                attr.bidirectional_attribute()?;
            }
            AttributeMapping::Plural(attr) => {
                attr.key_descriptor()?;

                if let Some(foreign_key) = attr.element.foreign_key() {
                    foreign_key?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn verify_foreign_key_sides(&self, fk: &ForeignKeyDescriptor) -> Result<()> {
        let key = &fk.key_side().selectables;
        let target = &fk.target_side().selectables;

        if key.len() != target.len() {
            bail!(
                "foreign key `{}` has {} key column(s) and {} target column(s)",
                fk.role(),
                key.len(),
                target.len()
            );
        }

        for (key, target) in key.iter().zip(target.iter()) {
            if !key.jdbc.is_compatible(&target.jdbc) {
                bail!(
                    "foreign key `{}` joins `{}` ({:?}) to incompatible `{}` ({:?})",
                    fk.role(),
                    key.name,
                    key.jdbc.jdbc_type,
                    target.name,
                    target.jdbc.jdbc_type
                );
            }
        }

        Ok(())
    }

    /// Descriptors sharing one physical key, one per target, must agree on
    /// the JDBC type of every key column.
    fn verify_shared_key_columns_agree(&self) -> Result<()> {
        let mm = self.metamodel;

        for ids in mm.association_keys.values() {
            let Some((first, rest)) = ids.split_first() else {
                continue;
            };
            let first = mm.foreign_key(*first);

            for id in rest {
                let fk = mm.foreign_key(*id);
                let columns = first
                    .key_side()
                    .selectables
                    .iter()
                    .zip(fk.key_side().selectables.iter());

                for (theirs, ours) in columns {
                    if !ours.jdbc.is_compatible(&theirs.jdbc) {
                        return Err(Error::invalid_mapping(
                            fk.role(),
                            format!(
                                "key column `{}` ({:?}) is already mapped as {:?} by `{}`",
                                ours.name,
                                ours.jdbc.jdbc_type,
                                theirs.jdbc.jdbc_type,
                                first.role()
                            ),
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
