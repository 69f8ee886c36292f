//! The windowed dimensions computation engine.
//!
//! One engine instance processes one partition's event stream strictly
//! sequentially. For every configured (combination, aggregator) pair it
//! projects each event into a candidate aggregate and merges it into the
//! window map; at window end, [`DimensionsComputation::flush`] drains the
//! map. This is a tumbling-window contract: no aggregate survives a window
//! boundary inside the engine.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::aggregator::AggregatorRegistry;
use crate::engine::conversion::ConversionContext;
use crate::engine::{Aggregate, AggregateKey};
use crate::error::{DimensionError, DimensionResult};
use crate::schema::DimensionalSchema;
use crate::types::{GenericRecord, InputEvent};

/// The windowed accumulation core for one stream partition.
pub struct DimensionsComputation {
    schema: Arc<DimensionalSchema>,
    /// One context per (combination, aggregator) pair, in schema order
    contexts: Vec<ConversionContext>,
    /// Current window's key -> accumulated aggregate values
    window: HashMap<AggregateKey, GenericRecord>,
    window_id: u64,
}

impl DimensionsComputation {
    /// Build an engine for a compiled schema.
    ///
    /// All conversion contexts are precomputed here; per-event processing
    /// performs no name lookups. Fails with a schema error if the registry
    /// does not hold an aggregator ID the schema was compiled against.
    pub fn new(
        schema: Arc<DimensionalSchema>,
        registry: Arc<AggregatorRegistry>,
    ) -> DimensionResult<Self> {
        let mut contexts = Vec::new();
        for (dimensions_id, combination) in schema.combinations().iter().enumerate() {
            for aggregation in &combination.aggregations {
                let aggregator = registry
                    .get(aggregation.aggregator_id)
                    .ok_or_else(|| {
                        DimensionError::schema_error(
                            format!(
                                "aggregator id {} missing from registry",
                                aggregation.aggregator_id
                            ),
                            Some(aggregation.aggregator_name.clone()),
                        )
                    })?
                    .clone();
                contexts.push(ConversionContext::build(
                    &schema,
                    dimensions_id as u32,
                    combination,
                    aggregation,
                    aggregator,
                )?);
            }
        }

        debug!(
            "dimensions computation ready: schema {}, {} conversion contexts",
            schema.schema_id(),
            contexts.len()
        );

        Ok(Self {
            schema,
            contexts,
            window: HashMap::new(),
            window_id: 0,
        })
    }

    /// Mark the start of a window. State is expected to be empty; a
    /// non-empty map here means the host skipped a flush.
    pub fn begin_window(&mut self, window_id: u64) {
        if !self.window.is_empty() {
            warn!(
                "beginning window {} with {} aggregates left from window {}",
                window_id,
                self.window.len(),
                self.window_id
            );
        }
        self.window_id = window_id;
    }

    /// Route one event through every configured (combination, aggregator)
    /// pair, merging it into the current window.
    ///
    /// Aggregator errors indicate schema/configuration defects and
    /// propagate fatally; nothing is skipped or retried.
    pub fn process(&mut self, event: &InputEvent) -> DimensionResult<()> {
        if event.keys.descriptor() != self.schema.master_key() {
            return Err(DimensionError::type_mismatch(
                "event key record does not match the schema's master key descriptor",
                None,
            ));
        }
        if event.values.descriptor() != self.schema.input_values() {
            return Err(DimensionError::type_mismatch(
                "event value record does not match the schema's input values descriptor",
                None,
            ));
        }

        for context in &self.contexts {
            let Aggregate { key, aggregates } = context.project(event);
            match self.window.entry(key) {
                Entry::Occupied(mut entry) => {
                    context.aggregator().combine(entry.get_mut(), &aggregates)?;
                }
                Entry::Vacant(entry) => {
                    entry.insert(aggregates);
                }
            }
        }
        Ok(())
    }

    /// Drain every aggregate accumulated in the current window.
    ///
    /// Emission order is unspecified. This is the only way state leaves
    /// the engine; the map is empty afterward.
    pub fn flush(&mut self) -> Vec<Aggregate> {
        debug!(
            "flushing {} aggregates for window {}",
            self.window.len(),
            self.window_id
        );
        self.window
            .drain()
            .map(|(key, aggregates)| Aggregate { key, aggregates })
            .collect()
    }

    /// Discard all in-memory window state without emitting it.
    pub fn teardown(&mut self) {
        self.window.clear();
    }

    /// The compiled schema this engine runs
    pub fn schema(&self) -> &Arc<DimensionalSchema> {
        &self.schema
    }

    /// Number of distinct aggregate keys in the current window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Check if the current window holds no aggregates
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
