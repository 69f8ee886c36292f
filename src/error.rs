/*!
# Dimensional Engine Error Handling

This module provides error handling for the dimensional aggregation engine.
All schema compilation and processing operations return well-structured errors
with enough context to point at the offending field or aggregator.

## Error Categories

- **Schema Errors**: invalid declarative schemas detected at compile time
- **Type Mismatches**: record accessors or aggregation operands whose
  declared types disagree
- **Unsupported Field Types**: an aggregator applied to a field type it
  cannot combine (e.g. a numeric aggregator over a string field)

## Propagation

None of these errors are transient: every one of them indicates a schema or
configuration defect, so the policy is fail-fast. Callers are expected to
halt the affected processing unit rather than skip and continue.
*/

use std::fmt;

/// Errors produced by schema compilation and dimensional aggregation.
///
/// Each variant carries the context needed to locate the defect. All
/// variants are fatal to the operation that raised them; none indicate a
/// recoverable data-quality issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    /// Invalid declarative schema, detected once at compile time.
    ///
    /// Raised for undeclared field references, unknown aggregator names,
    /// and ambiguous (duplicate) dimension combinations. The engine must
    /// never start processing against a schema that failed to compile.
    SchemaError {
        /// Description of the schema defect
        message: String,
        /// Name of the field or aggregator that caused it, if applicable
        field: Option<String>,
    },

    /// Declared types disagree during record access or aggregation.
    ///
    /// Raised when a record accessor is used with the wrong declared type,
    /// or when two aggregation operands do not share the same shape. This
    /// always indicates a configuration defect, never bad data, so it is
    /// propagated rather than coerced.
    TypeMismatch {
        /// Description of the disagreement
        message: String,
        /// Name of the field involved, if known
        field: Option<String>,
    },

    /// An aggregator was applied to a field type it does not support.
    UnsupportedFieldType {
        /// Name of the aggregator
        aggregator: String,
        /// Name of the offending field
        field: String,
        /// Declared type of the offending field
        kind: &'static str,
    },
}

impl fmt::Display for DimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionError::SchemaError { message, field } => {
                if let Some(name) = field {
                    write!(f, "Schema error for '{}': {}", name, message)
                } else {
                    write!(f, "Schema error: {}", message)
                }
            }
            DimensionError::TypeMismatch { message, field } => {
                if let Some(name) = field {
                    write!(f, "Type mismatch for field '{}': {}", name, message)
                } else {
                    write!(f, "Type mismatch: {}", message)
                }
            }
            DimensionError::UnsupportedFieldType {
                aggregator,
                field,
                kind,
            } => {
                write!(
                    f,
                    "Aggregator '{}' does not support field '{}' of type {}",
                    aggregator, field, kind
                )
            }
        }
    }
}

impl std::error::Error for DimensionError {}

impl DimensionError {
    /// Create a schema error
    pub fn schema_error(message: impl Into<String>, field: Option<String>) -> Self {
        DimensionError::SchemaError {
            message: message.into(),
            field,
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(message: impl Into<String>, field: Option<String>) -> Self {
        DimensionError::TypeMismatch {
            message: message.into(),
            field,
        }
    }

    /// Create an unsupported field type error
    pub fn unsupported_field_type(
        aggregator: impl Into<String>,
        field: impl Into<String>,
        kind: &'static str,
    ) -> Self {
        DimensionError::UnsupportedFieldType {
            aggregator: aggregator.into(),
            field: field.into(),
            kind,
        }
    }
}

/// Result type for dimensional engine operations
pub type DimensionResult<T> = Result<T, DimensionError>;
