//! Event projection via precomputed index tables.
//!
//! A [`ConversionContext`] is built once per (combination, aggregator) pair
//! at engine setup. It precomputes every slot index the per-event path
//! needs, so projecting an event into a candidate aggregate is a handful of
//! slot copies plus the time-bucket truncation; no field name is looked up
//! per event. Contexts are immutable after construction.

use std::sync::Arc;

use crate::aggregator::IncrementalAggregator;
use crate::engine::{Aggregate, AggregateKey};
use crate::error::{DimensionError, DimensionResult};
use crate::schema::{
    CompiledAggregation, CompiledCombination, DimensionalSchema, TimeBucket,
    TIME_BUCKET_FIELD, TIME_FIELD,
};
use crate::types::{FieldDescriptor, FieldKind, GenericRecord, InputEvent};

/// One precomputed slot copy: which kind group, which source slot, which
/// destination slot.
#[derive(Debug, Clone, Copy)]
struct SlotCopy {
    kind: FieldKind,
    from: usize,
    to: usize,
}

/// Precomputed projection tables for one (combination, aggregator) pair.
pub struct ConversionContext {
    schema_id: u32,
    dimensions_id: u32,
    aggregator_id: u32,
    time_bucket: TimeBucket,
    key_descriptor: Arc<FieldDescriptor>,
    aggregate_descriptor: Arc<FieldDescriptor>,
    aggregator: Arc<dyn IncrementalAggregator>,
    /// master-key slots -> combination-key slots
    key_copies: Vec<SlotCopy>,
    /// input-value slots -> aggregate slots
    value_copies: Vec<SlotCopy>,
    /// INT64 slot of `_time` in the output key
    time_slot: usize,
    /// INT32 slot of `_time_bucket` in the output key
    bucket_slot: usize,
}

impl ConversionContext {
    pub(crate) fn build(
        schema: &DimensionalSchema,
        dimensions_id: u32,
        combination: &CompiledCombination,
        aggregation: &CompiledAggregation,
        aggregator: Arc<dyn IncrementalAggregator>,
    ) -> DimensionResult<Self> {
        let key_descriptor = combination.key_descriptor.clone();
        let aggregate_descriptor = aggregation.aggregate_descriptor.clone();

        let mut key_copies = Vec::new();
        for (name, kind) in key_descriptor.fields() {
            if name == TIME_FIELD || name == TIME_BUCKET_FIELD {
                continue;
            }
            let (_, from) = schema.master_key().slot_of(name).ok_or_else(|| {
                DimensionError::schema_error(
                    "combination key missing from master key descriptor",
                    Some(name.clone()),
                )
            })?;
            let (_, to) = key_descriptor
                .slot_of(name)
                .expect("field taken from this descriptor");
            key_copies.push(SlotCopy {
                kind: *kind,
                from,
                to,
            });
        }

        // Aggregate fields not present in the input values descriptor (the
        // `count` slot) are left to the aggregator's seed.
        let mut value_copies = Vec::new();
        for (name, kind) in aggregate_descriptor.fields() {
            if let Some((input_kind, from)) = schema.input_values().slot_of(name) {
                if input_kind != *kind {
                    return Err(DimensionError::type_mismatch(
                        format!(
                            "aggregate declares {}, input declares {}",
                            kind.type_name(),
                            input_kind.type_name()
                        ),
                        Some(name.clone()),
                    ));
                }
                let (_, to) = aggregate_descriptor
                    .slot_of(name)
                    .expect("field taken from this descriptor");
                value_copies.push(SlotCopy {
                    kind: *kind,
                    from,
                    to,
                });
            }
        }

        let time_slot = key_descriptor
            .slot_of(TIME_FIELD)
            .map(|(_, slot)| slot)
            .ok_or_else(|| {
                DimensionError::schema_error(
                    "reserved time field missing from key descriptor",
                    Some(TIME_FIELD.to_string()),
                )
            })?;
        let bucket_slot = key_descriptor
            .slot_of(TIME_BUCKET_FIELD)
            .map(|(_, slot)| slot)
            .ok_or_else(|| {
                DimensionError::schema_error(
                    "reserved time bucket field missing from key descriptor",
                    Some(TIME_BUCKET_FIELD.to_string()),
                )
            })?;

        Ok(Self {
            schema_id: schema.schema_id(),
            dimensions_id,
            aggregator_id: aggregation.aggregator_id,
            time_bucket: combination.descriptor.time_bucket(),
            key_descriptor,
            aggregate_descriptor,
            aggregator,
            key_copies,
            value_copies,
            time_slot,
            bucket_slot,
        })
    }

    /// Project an event into a candidate aggregate for this pair.
    ///
    /// The candidate is valid standing alone (the aggregator's seed has
    /// been applied), so the first event for a key needs no identity value
    /// to combine against.
    pub fn project(&self, event: &InputEvent) -> Aggregate {
        let mut keys = GenericRecord::new(self.key_descriptor.clone());
        for copy in &self.key_copies {
            keys.copy_slot(copy.kind, copy.to, &event.keys, copy.from);
        }
        keys.int64s[self.time_slot] = self.time_bucket.truncate(event.timestamp);
        keys.int32s[self.bucket_slot] = self.time_bucket.ordinal();

        let mut aggregates = GenericRecord::new(self.aggregate_descriptor.clone());
        for copy in &self.value_copies {
            aggregates.copy_slot(copy.kind, copy.to, &event.values, copy.from);
        }
        self.aggregator.seed(&mut aggregates);

        Aggregate {
            key: AggregateKey {
                schema_id: self.schema_id,
                dimensions_id: self.dimensions_id,
                aggregator_id: self.aggregator_id,
                keys,
            },
            aggregates,
        }
    }

    /// The aggregator this context projects for
    pub(crate) fn aggregator(&self) -> &Arc<dyn IncrementalAggregator> {
        &self.aggregator
    }
}
