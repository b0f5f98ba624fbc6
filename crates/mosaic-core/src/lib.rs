//! Mapping-model resolution: turns a declarative boot model of entities,
//! composites, associations and collections into an immutable runtime
//! [`Metamodel`].

pub mod access;
pub use access::{AccessorTable, PropertyAccess};

pub mod boot;
pub use boot::BootModel;

mod builder;
pub use builder::Builder;

pub mod context;

pub mod creation;
pub use creation::NotReady;

mod error;
pub use error::{Error, IntoError, StuckStep};

pub mod fetch;
pub use fetch::FetchGraph;

pub mod mapping;
pub use mapping::Metamodel;

mod path;
pub use path::{NavigablePath, NavigableRole};

pub mod stmt;

mod value;
pub use value::{Type, Value, ValueObject, ValueReference};

mod verify;

/// A Result type alias that uses Mosaic's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
