//! Primitive field kinds and tagged values.
//!
//! The engine supports a closed set of primitive field types. [`FieldKind`]
//! names the type, [`FieldValue`] carries a value of that type. Aggregation
//! dispatch is an exhaustive match over these kinds; there is no runtime
//! type discovery.

use serde::{Deserialize, Serialize};

/// The closed set of primitive field types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point number
    Float32,
    /// 64-bit floating point number
    Float64,
    /// Boolean value (true/false)
    Boolean,
    /// UTF-8 string
    String,
}

impl FieldKind {
    /// Get the type name for error messages and debugging
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Int8 => "INT8",
            FieldKind::Int16 => "INT16",
            FieldKind::Int32 => "INT32",
            FieldKind::Int64 => "INT64",
            FieldKind::Float32 => "FLOAT32",
            FieldKind::Float64 => "FLOAT64",
            FieldKind::Boolean => "BOOLEAN",
            FieldKind::String => "STRING",
        }
    }

    /// Check if this kind can participate in numeric aggregation
    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldKind::Boolean | FieldKind::String)
    }
}

/// A single typed value read from or written into a record field.
///
/// Used at the name-addressed get/set boundary and in error reporting. The
/// per-event hot paths operate on the records' typed slot storage directly
/// and never allocate `FieldValue`s.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    String(String),
}

impl FieldValue {
    /// The kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int8(_) => FieldKind::Int8,
            FieldValue::Int16(_) => FieldKind::Int16,
            FieldValue::Int32(_) => FieldKind::Int32,
            FieldValue::Int64(_) => FieldKind::Int64,
            FieldValue::Float32(_) => FieldKind::Float32,
            FieldValue::Float64(_) => FieldKind::Float64,
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::String(_) => FieldKind::String,
        }
    }

    /// Get the type name for error messages and debugging
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Convert this value to a string representation for display
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Int8(v) => v.to_string(),
            FieldValue::Int16(v) => v.to_string(),
            FieldValue::Int32(v) => v.to_string(),
            FieldValue::Int64(v) => v.to_string(),
            FieldValue::Float32(v) => v.to_string(),
            FieldValue::Float64(v) => v.to_string(),
            FieldValue::Boolean(v) => v.to_string(),
            FieldValue::String(v) => v.clone(),
        }
    }
}
