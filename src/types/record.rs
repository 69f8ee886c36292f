//! Compact typed records and input events.
//!
//! A [`GenericRecord`] stores its values in one dense array per primitive
//! kind, addressed by the slot indices its [`FieldDescriptor`] assigns. The
//! shape is fixed at construction; values are mutated in place during
//! aggregation. Name-addressed access is type-checked; the per-event hot
//! paths use precomputed slot indices instead.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{DimensionError, DimensionResult};
use crate::types::descriptor::FieldDescriptor;
use crate::types::value::{FieldKind, FieldValue};

/// A type-partitioned value container shaped by a [`FieldDescriptor`].
///
/// Equality and hashing cover all field values in descriptor order (floats
/// by bit pattern), so records serve directly as window-map keys.
#[derive(Debug, Clone)]
pub struct GenericRecord {
    descriptor: Arc<FieldDescriptor>,
    pub(crate) int8s: Vec<i8>,
    pub(crate) int16s: Vec<i16>,
    pub(crate) int32s: Vec<i32>,
    pub(crate) int64s: Vec<i64>,
    pub(crate) float32s: Vec<f32>,
    pub(crate) float64s: Vec<f64>,
    pub(crate) booleans: Vec<bool>,
    pub(crate) strings: Vec<String>,
}

impl GenericRecord {
    /// Create a record with default-initialized slots for every field of
    /// the descriptor. No storage is resized afterward.
    pub fn new(descriptor: Arc<FieldDescriptor>) -> Self {
        Self {
            int8s: vec![0; descriptor.kind_len(FieldKind::Int8)],
            int16s: vec![0; descriptor.kind_len(FieldKind::Int16)],
            int32s: vec![0; descriptor.kind_len(FieldKind::Int32)],
            int64s: vec![0; descriptor.kind_len(FieldKind::Int64)],
            float32s: vec![0.0; descriptor.kind_len(FieldKind::Float32)],
            float64s: vec![0.0; descriptor.kind_len(FieldKind::Float64)],
            booleans: vec![false; descriptor.kind_len(FieldKind::Boolean)],
            strings: vec![String::new(); descriptor.kind_len(FieldKind::String)],
            descriptor,
        }
    }

    /// The descriptor fixing this record's shape
    pub fn descriptor(&self) -> &Arc<FieldDescriptor> {
        &self.descriptor
    }

    /// Read a field by name.
    ///
    /// Fails with a type mismatch if the descriptor does not declare `name`.
    pub fn get(&self, name: &str) -> DimensionResult<FieldValue> {
        let (kind, slot) = self
            .descriptor
            .slot_of(name)
            .ok_or_else(|| Self::undeclared(name))?;

        Ok(match kind {
            FieldKind::Int8 => FieldValue::Int8(self.int8s[slot]),
            FieldKind::Int16 => FieldValue::Int16(self.int16s[slot]),
            FieldKind::Int32 => FieldValue::Int32(self.int32s[slot]),
            FieldKind::Int64 => FieldValue::Int64(self.int64s[slot]),
            FieldKind::Float32 => FieldValue::Float32(self.float32s[slot]),
            FieldKind::Float64 => FieldValue::Float64(self.float64s[slot]),
            FieldKind::Boolean => FieldValue::Boolean(self.booleans[slot]),
            FieldKind::String => FieldValue::String(self.strings[slot].clone()),
        })
    }

    /// Write a field by name, overwriting in place.
    ///
    /// Fails with a type mismatch if the descriptor does not declare `name`
    /// or the value's kind differs from the declared kind.
    pub fn set(&mut self, name: &str, value: FieldValue) -> DimensionResult<()> {
        let (kind, slot) = self
            .descriptor
            .slot_of(name)
            .ok_or_else(|| Self::undeclared(name))?;

        if value.kind() != kind {
            return Err(DimensionError::type_mismatch(
                format!(
                    "expected {}, got {}",
                    kind.type_name(),
                    value.type_name()
                ),
                Some(name.to_string()),
            ));
        }

        match value {
            FieldValue::Int8(v) => self.int8s[slot] = v,
            FieldValue::Int16(v) => self.int16s[slot] = v,
            FieldValue::Int32(v) => self.int32s[slot] = v,
            FieldValue::Int64(v) => self.int64s[slot] = v,
            FieldValue::Float32(v) => self.float32s[slot] = v,
            FieldValue::Float64(v) => self.float64s[slot] = v,
            FieldValue::Boolean(v) => self.booleans[slot] = v,
            FieldValue::String(v) => self.strings[slot] = v,
        }
        Ok(())
    }

    /// Copy one slot from `src` into this record. Slot indices come from
    /// precomputed conversion tables; both records must have the slot for
    /// the given kind.
    pub(crate) fn copy_slot(&mut self, kind: FieldKind, to: usize, src: &GenericRecord, from: usize) {
        match kind {
            FieldKind::Int8 => self.int8s[to] = src.int8s[from],
            FieldKind::Int16 => self.int16s[to] = src.int16s[from],
            FieldKind::Int32 => self.int32s[to] = src.int32s[from],
            FieldKind::Int64 => self.int64s[to] = src.int64s[from],
            FieldKind::Float32 => self.float32s[to] = src.float32s[from],
            FieldKind::Float64 => self.float64s[to] = src.float64s[from],
            FieldKind::Boolean => self.booleans[to] = src.booleans[from],
            FieldKind::String => self.strings[to] = src.strings[from].clone(),
        }
    }

    fn undeclared(name: &str) -> DimensionError {
        DimensionError::type_mismatch(
            "field is not declared by the record's descriptor",
            Some(name.to_string()),
        )
    }
}

impl PartialEq for GenericRecord {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.descriptor, &other.descriptor)
            || self.descriptor == other.descriptor)
            && self.int8s == other.int8s
            && self.int16s == other.int16s
            && self.int32s == other.int32s
            && self.int64s == other.int64s
            && self.booleans == other.booleans
            && self.strings == other.strings
            && float_bits_eq32(&self.float32s, &other.float32s)
            && float_bits_eq64(&self.float64s, &other.float64s)
    }
}

impl Eq for GenericRecord {}

impl Hash for GenericRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.int8s.hash(state);
        self.int16s.hash(state);
        self.int32s.hash(state);
        self.int64s.hash(state);
        self.booleans.hash(state);
        self.strings.hash(state);
        for v in &self.float32s {
            v.to_bits().hash(state);
        }
        for v in &self.float64s {
            v.to_bits().hash(state);
        }
    }
}

fn float_bits_eq32(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.to_bits() == y.to_bits())
}

fn float_bits_eq64(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.to_bits() == y.to_bits())
}

/// One typed event delivered to the engine.
///
/// `keys` is shaped by the schema's master key descriptor, `values` by its
/// input values descriptor. The timestamp is event time in milliseconds
/// since the epoch; the engine derives each combination's time bucket
/// from it.
#[derive(Debug, Clone)]
pub struct InputEvent {
    /// Key field values, shaped by the master key descriptor
    pub keys: GenericRecord,
    /// Aggregation input values, shaped by the input values descriptor
    pub values: GenericRecord,
    /// Event-time milliseconds since the Unix epoch
    pub timestamp: i64,
}
