//! Incremental aggregators and their registry.
//!
//! An [`IncrementalAggregator`] is a pure combine function over two
//! same-shaped aggregate records. Every implementation must be associative
//! and commutative over its supported field types: the engine and the
//! unifier apply `combine` under arbitrary event and partition arrival
//! order, so any order-sensitive implementation silently corrupts results.
//! New implementations must be audited against this property.
//!
//! The [`AggregatorRegistry`] maps aggregator names to stable integer IDs
//! and shared implementations. It is built explicitly at setup and shared
//! read-only; there is no process-wide default.

pub mod incremental;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DimensionError, DimensionResult};
use crate::types::{FieldDescriptor, GenericRecord};

pub use incremental::{CountAggregator, MaxAggregator, MinAggregator, SumAggregator};

/// Name of the single output field of the `count` aggregator.
pub const COUNT_FIELD: &str = "count";

/// A pure, in-place combine function over same-shaped aggregate records.
pub trait IncrementalAggregator: Send + Sync {
    /// The registry name of this aggregator
    fn name(&self) -> &'static str;

    /// Derive the aggregate record shape for a given input field subset.
    ///
    /// Called once at schema compile time. Fails with an unsupported field
    /// type error if the input contains fields this aggregator cannot
    /// combine, and with a schema error if the input arity is wrong.
    fn aggregate_descriptor(
        &self,
        input: &FieldDescriptor,
    ) -> DimensionResult<FieldDescriptor>;

    /// Adjust a freshly projected aggregate so it is valid standing alone.
    ///
    /// The first event for a key becomes the seed value rather than being
    /// combined against an identity. Value-consuming aggregators keep the
    /// projected values as-is; `count` writes 1 here.
    fn seed(&self, _dest: &mut GenericRecord) {}

    /// Combine `src` into `dest` elementwise, in place.
    ///
    /// Fails with a type mismatch if the two records are not the same
    /// shape, and with an unsupported field type error if the shape holds
    /// fields this aggregator cannot combine. Both indicate configuration
    /// defects and are fatal to the processing unit.
    fn combine(&self, dest: &mut GenericRecord, src: &GenericRecord) -> DimensionResult<()>;
}

/// An explicitly constructed mapping from aggregator name to stable ID and
/// implementation.
///
/// IDs are assigned in registration order, stamped into every emitted
/// aggregate key, and must not be renumbered across runs that share state.
/// Engines and unifiers hold the registry behind an `Arc` and never
/// mutate it.
pub struct AggregatorRegistry {
    ids: HashMap<String, u32>,
    aggregators: Vec<Arc<dyn IncrementalAggregator>>,
}

impl AggregatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            aggregators: Vec::new(),
        }
    }

    /// Create a registry with the built-in aggregators: `min`, `max`,
    /// `sum`, `count` (IDs 0..=3).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        // Registration order fixes the IDs.
        for aggregator in [
            Arc::new(MinAggregator) as Arc<dyn IncrementalAggregator>,
            Arc::new(MaxAggregator),
            Arc::new(SumAggregator),
            Arc::new(CountAggregator),
        ] {
            registry
                .register(aggregator)
                .expect("built-in aggregator names are unique");
        }
        registry
    }

    /// Register an aggregator, assigning it the next ID.
    ///
    /// Fails with a schema error if the name is already registered.
    pub fn register(
        &mut self,
        aggregator: Arc<dyn IncrementalAggregator>,
    ) -> DimensionResult<u32> {
        let name = aggregator.name();
        if self.ids.contains_key(name) {
            return Err(DimensionError::schema_error(
                "aggregator name already registered",
                Some(name.to_string()),
            ));
        }
        let id = self.aggregators.len() as u32;
        self.ids.insert(name.to_string(), id);
        self.aggregators.push(aggregator);
        Ok(id)
    }

    /// Look up the ID of a registered aggregator name
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Look up an aggregator by ID
    pub fn get(&self, id: u32) -> Option<&Arc<dyn IncrementalAggregator>> {
        self.aggregators.get(id as usize)
    }

    /// Number of registered aggregators
    pub fn len(&self) -> usize {
        self.aggregators.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.aggregators.is_empty()
    }
}

impl Default for AggregatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
