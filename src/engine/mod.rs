//! The windowed computation core.
//!
//! - [`ConversionContext`] - precomputed per-(combination, aggregator)
//!   index tables for projecting events without name lookups
//! - [`DimensionsComputation`] - the windowed accumulation engine
//! - [`DimensionsUnifier`] - cross-partition merge of partial aggregates
//!
//! Each engine instance is single-threaded and owns its window state
//! exclusively; partitions share nothing. The unifier is the one place
//! cross-partition state meets, and it tolerates arbitrary arrival order
//! because every aggregator combine is associative and commutative.

pub mod computation;
pub mod conversion;
pub mod unifier;

pub use computation::DimensionsComputation;
pub use conversion::ConversionContext;
pub use unifier::DimensionsUnifier;

use crate::types::GenericRecord;

/// The identity of one aggregate within a window.
///
/// Two partial aggregates merge if and only if their keys are equal. The
/// schema, combination, and aggregator IDs pin the key record's shape, so
/// record equality is value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    /// ID of the schema that produced the aggregate
    pub schema_id: u32,
    /// Dimension combination ID (position in the compiled schema)
    pub dimensions_id: u32,
    /// Registry-assigned aggregator ID
    pub aggregator_id: u32,
    /// Projected key values, including the truncated time and bucket ordinal
    pub keys: GenericRecord,
}

/// One accumulated result: the key it belongs to and its aggregate values.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub key: AggregateKey,
    pub aggregates: GenericRecord,
}
