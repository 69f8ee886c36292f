//! Core data types of the dimensional engine.
//!
//! - [`FieldKind`] / [`FieldValue`] - the closed primitive type system
//! - [`FieldDescriptor`] - ordered, typed record schemas with kind-grouped
//!   storage slots
//! - [`GenericRecord`] - compact, type-partitioned value containers
//! - [`InputEvent`] - one typed event (keys + values + timestamp)

pub mod descriptor;
pub mod record;
pub mod value;

pub use descriptor::FieldDescriptor;
pub use record::{GenericRecord, InputEvent};
pub use value::{FieldKind, FieldValue};
