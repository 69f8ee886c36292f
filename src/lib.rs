//! # dimstream
//!
//! A windowed, schema-driven dimensional aggregation engine for streaming
//! data: a declarative schema names key fields, time-bucket granularities,
//! and which aggregators apply to which dimension combinations; the engine
//! consumes typed events, incrementally maintains per-combination, per-key
//! running aggregates, drains them at window boundaries, and merges partial
//! aggregates produced by parallel stream partitions into one consistent
//! result.
//!
//! ## Features
//!
//! - **Typed, compact records**: values live in per-primitive-kind arrays
//!   addressed by precomputed slot indices; no boxed values, no unchecked
//!   casts
//! - **Schema-to-index precomputation**: all field-name resolution happens
//!   once at setup, never per event
//! - **Associative/commutative aggregation algebra**: `min`, `max`, `sum`,
//!   `count` out of the box, extensible through an explicit registry
//! - **Tumbling-window contract**: window state is created empty, drained
//!   completely at window end, and never leaks across boundaries
//! - **Partition-safe merging**: a unifier re-merges same-keyed partial
//!   aggregates from any number of upstream partitions in any order
//!
//! ## Quick Start
//!
//! ```rust
//! use dimstream::{AggregatorRegistry, DimensionalSchema, DimensionsComputation, FieldValue};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(AggregatorRegistry::with_defaults());
//!     let schema = Arc::new(DimensionalSchema::from_json(
//!         r#"{
//!             "keys": [{"name": "region", "type": "string"}],
//!             "values": [{"name": "latency", "type": "int32"}],
//!             "combinations": [
//!                 {
//!                     "keys": ["region"],
//!                     "time_bucket": "hour",
//!                     "aggregations": [
//!                         {"aggregator": "min", "fields": ["latency"]},
//!                         {"aggregator": "count"}
//!                     ]
//!                 }
//!             ]
//!         }"#,
//!         &registry,
//!     )?);
//!
//!     let mut engine = DimensionsComputation::new(schema.clone(), registry)?;
//!     engine.begin_window(1);
//!
//!     let mut event = schema.new_event(1_700_000_000_000);
//!     event.keys.set("region", FieldValue::String("emea".to_string()))?;
//!     event.values.set("latency", FieldValue::Int32(42))?;
//!     engine.process(&event)?;
//!
//!     // Window end: drain one aggregate per (combination, aggregator, key).
//!     let aggregates = engine.flush();
//!     assert_eq!(aggregates.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency model
//!
//! Engines are single-threaded and own their window state exclusively;
//! partitions run as isolated instances sharing nothing. The host runtime
//! drives window boundaries (`begin_window` / `flush`) and delivers events
//! one at a time. [`DimensionsUnifier`] is the single point where
//! cross-partition state combines.

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod schema;
pub mod types;

pub use aggregator::{AggregatorRegistry, IncrementalAggregator, COUNT_FIELD};
pub use engine::{Aggregate, AggregateKey, DimensionsComputation, DimensionsUnifier};
pub use error::{DimensionError, DimensionResult};
pub use schema::{
    DimensionalSchema, DimensionsDescriptor, SchemaDefinition, TimeBucket, DEFAULT_SCHEMA_ID,
    TIME_BUCKET_FIELD, TIME_FIELD,
};
pub use types::{FieldDescriptor, FieldKind, FieldValue, GenericRecord, InputEvent};
