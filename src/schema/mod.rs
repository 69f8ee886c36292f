//! Declarative schemas and their compiled form.
//!
//! A schema names key fields, value fields, and which aggregations apply to
//! which dimension combinations at which time-bucket granularity.
//! Compilation assigns the stable IDs and precomputed descriptors the engine
//! relies on; it runs once at setup, so per-event processing never touches
//! field names.

pub mod compiled;
pub mod definition;
pub mod dimensions;

pub use compiled::{
    CompiledAggregation, CompiledCombination, DimensionalSchema, DEFAULT_SCHEMA_ID,
};
pub use definition::{
    AggregationDefinition, CombinationDefinition, FieldDefinition, SchemaDefinition,
};
pub use dimensions::{DimensionsDescriptor, TimeBucket, TIME_BUCKET_FIELD, TIME_FIELD};
