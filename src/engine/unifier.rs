//! Cross-partition merge of partial aggregates.
//!
//! When several engine instances each process a subset of a window's
//! events, every instance emits partial aggregates for the keys it saw. The
//! unifier absorbs those streams and re-applies the same aggregator algebra
//! per [`AggregateKey`], producing one final aggregate per key per window.
//! Arrival order across partitions is unconstrained; correctness rests on
//! the associativity and commutativity every aggregator guarantees.
//!
//! The unifier must be configured with the same registry (same IDs) as
//! every producer. Its state is window-scoped exactly like the engine's:
//! empty at window start, drained at window end.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::aggregator::AggregatorRegistry;
use crate::engine::{Aggregate, AggregateKey};
use crate::error::{DimensionError, DimensionResult};
use crate::types::GenericRecord;

/// Merges same-keyed partial aggregates from parallel partitions.
pub struct DimensionsUnifier {
    registry: Arc<AggregatorRegistry>,
    window: HashMap<AggregateKey, GenericRecord>,
}

impl DimensionsUnifier {
    /// Create a unifier over the producers' aggregator registry.
    pub fn new(registry: Arc<AggregatorRegistry>) -> Self {
        Self {
            registry,
            window: HashMap::new(),
        }
    }

    /// Merge one partial aggregate into the current window.
    ///
    /// Fails with a schema error if the aggregate names an aggregator ID
    /// the registry does not hold; that means producer and unifier were
    /// configured with different registries.
    pub fn absorb(&mut self, aggregate: Aggregate) -> DimensionResult<()> {
        let aggregator = self
            .registry
            .get(aggregate.key.aggregator_id)
            .ok_or_else(|| {
                DimensionError::schema_error(
                    format!(
                        "aggregator id {} not present in unifier registry",
                        aggregate.key.aggregator_id
                    ),
                    None,
                )
            })?
            .clone();

        let Aggregate { key, aggregates } = aggregate;
        match self.window.entry(key) {
            Entry::Occupied(mut entry) => aggregator.combine(entry.get_mut(), &aggregates),
            Entry::Vacant(entry) => {
                entry.insert(aggregates);
                Ok(())
            }
        }
    }

    /// Drain every unified aggregate for the current window, in
    /// unspecified order.
    pub fn flush(&mut self) -> Vec<Aggregate> {
        debug!("unifier flushing {} aggregates", self.window.len());
        self.window
            .drain()
            .map(|(key, aggregates)| Aggregate { key, aggregates })
            .collect()
    }

    /// Discard all in-memory state without emitting it.
    pub fn teardown(&mut self) {
        self.window.clear();
    }

    /// Number of distinct keys currently held
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Check if the current window holds no aggregates
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
