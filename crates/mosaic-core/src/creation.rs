//! Creation of the metamodel from the boot model.
//!
//! Construction is split into named steps run by a [`Scheduler`]. A step that
//! reads a node which is not built yet reports [`Progress::Pending`] and is
//! retried on the next pass, which lets associations be declared in any
//! order.

mod scheduler;
pub use scheduler::{Progress, Scheduler, Steps};

mod slot;
pub use slot::{LifecycleState, NotReady, Slot};

mod state;
pub(crate) use state::CreationState;

mod attribute;
mod embeddable;
mod entity;
mod foreign_key;
mod plural;
mod to_one;

pub(crate) use entity::declare_entities;
