//! Renders the relational artifacts of a [`mosaic_core::Metamodel`] (join
//! predicates, selection lists and write column lists) to SQL text.

pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer};

pub mod stmt;
pub use stmt::Statement;
