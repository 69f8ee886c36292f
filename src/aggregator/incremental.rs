//! Built-in incremental aggregators.
//!
//! Each combine rule is applied elementwise per numeric kind over the
//! records' typed slot groups. Boolean and string fields are never valid
//! aggregation input; the checks here keep that fail-fast even if a
//! hand-built record bypasses schema compilation.

use crate::aggregator::{IncrementalAggregator, COUNT_FIELD};
use crate::error::{DimensionError, DimensionResult};
use crate::types::{FieldDescriptor, FieldKind, GenericRecord};

/// Elementwise minimum.
pub struct MinAggregator;

/// Elementwise maximum.
pub struct MaxAggregator;

/// Elementwise addition (wrapping for integer kinds).
pub struct SumAggregator;

/// Event counting; consumes no input fields and maintains a single
/// `count` INT64.
pub struct CountAggregator;

/// Both operands must declare the identical shape; anything else is a
/// schema/configuration defect surfaced as a type mismatch.
fn check_same_shape(
    aggregator: &str,
    dest: &GenericRecord,
    src: &GenericRecord,
) -> DimensionResult<()> {
    if dest.descriptor() == src.descriptor() {
        return Ok(());
    }
    // Name the first disagreeing field when there is one.
    for (name, kind) in dest.descriptor().fields() {
        match src.descriptor().kind_of(name) {
            Some(other) if other == *kind => continue,
            Some(other) => {
                return Err(DimensionError::type_mismatch(
                    format!(
                        "'{}' operands declare {} and {}",
                        aggregator,
                        kind.type_name(),
                        other.type_name()
                    ),
                    Some(name.clone()),
                ));
            }
            None => {
                return Err(DimensionError::type_mismatch(
                    format!("field missing from '{}' operand", aggregator),
                    Some(name.clone()),
                ));
            }
        }
    }
    Err(DimensionError::type_mismatch(
        format!("'{}' operands have different shapes", aggregator),
        None,
    ))
}

/// Reject shapes holding boolean or string fields.
fn check_numeric(aggregator: &str, descriptor: &FieldDescriptor) -> DimensionResult<()> {
    for (name, kind) in descriptor.fields() {
        if !kind.is_numeric() {
            return Err(DimensionError::unsupported_field_type(
                aggregator,
                name.clone(),
                kind.type_name(),
            ));
        }
    }
    Ok(())
}

/// Shared shape derivation for the value-consuming aggregators: the
/// aggregate record mirrors the input subset, which must be non-empty and
/// all-numeric.
fn numeric_identity_descriptor(
    aggregator: &str,
    input: &FieldDescriptor,
) -> DimensionResult<FieldDescriptor> {
    if input.is_empty() {
        return Err(DimensionError::schema_error(
            format!("'{}' requires at least one input field", aggregator),
            None,
        ));
    }
    check_numeric(aggregator, input)?;
    Ok(input.clone())
}

impl IncrementalAggregator for MinAggregator {
    fn name(&self) -> &'static str {
        "min"
    }

    fn aggregate_descriptor(
        &self,
        input: &FieldDescriptor,
    ) -> DimensionResult<FieldDescriptor> {
        numeric_identity_descriptor(self.name(), input)
    }

    fn combine(&self, dest: &mut GenericRecord, src: &GenericRecord) -> DimensionResult<()> {
        check_same_shape(self.name(), dest, src)?;
        check_numeric(self.name(), dest.descriptor())?;
        for (d, s) in dest.int8s.iter_mut().zip(&src.int8s) {
            *d = (*d).min(*s);
        }
        for (d, s) in dest.int16s.iter_mut().zip(&src.int16s) {
            *d = (*d).min(*s);
        }
        for (d, s) in dest.int32s.iter_mut().zip(&src.int32s) {
            *d = (*d).min(*s);
        }
        for (d, s) in dest.int64s.iter_mut().zip(&src.int64s) {
            *d = (*d).min(*s);
        }
        for (d, s) in dest.float32s.iter_mut().zip(&src.float32s) {
            *d = d.min(*s);
        }
        for (d, s) in dest.float64s.iter_mut().zip(&src.float64s) {
            *d = d.min(*s);
        }
        Ok(())
    }
}

impl IncrementalAggregator for MaxAggregator {
    fn name(&self) -> &'static str {
        "max"
    }

    fn aggregate_descriptor(
        &self,
        input: &FieldDescriptor,
    ) -> DimensionResult<FieldDescriptor> {
        numeric_identity_descriptor(self.name(), input)
    }

    fn combine(&self, dest: &mut GenericRecord, src: &GenericRecord) -> DimensionResult<()> {
        check_same_shape(self.name(), dest, src)?;
        check_numeric(self.name(), dest.descriptor())?;
        for (d, s) in dest.int8s.iter_mut().zip(&src.int8s) {
            *d = (*d).max(*s);
        }
        for (d, s) in dest.int16s.iter_mut().zip(&src.int16s) {
            *d = (*d).max(*s);
        }
        for (d, s) in dest.int32s.iter_mut().zip(&src.int32s) {
            *d = (*d).max(*s);
        }
        for (d, s) in dest.int64s.iter_mut().zip(&src.int64s) {
            *d = (*d).max(*s);
        }
        for (d, s) in dest.float32s.iter_mut().zip(&src.float32s) {
            *d = d.max(*s);
        }
        for (d, s) in dest.float64s.iter_mut().zip(&src.float64s) {
            *d = d.max(*s);
        }
        Ok(())
    }
}

impl IncrementalAggregator for SumAggregator {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn aggregate_descriptor(
        &self,
        input: &FieldDescriptor,
    ) -> DimensionResult<FieldDescriptor> {
        numeric_identity_descriptor(self.name(), input)
    }

    fn combine(&self, dest: &mut GenericRecord, src: &GenericRecord) -> DimensionResult<()> {
        check_same_shape(self.name(), dest, src)?;
        check_numeric(self.name(), dest.descriptor())?;
        // Integer sums wrap rather than panic, matching rolling-counter
        // semantics.
        for (d, s) in dest.int8s.iter_mut().zip(&src.int8s) {
            *d = d.wrapping_add(*s);
        }
        for (d, s) in dest.int16s.iter_mut().zip(&src.int16s) {
            *d = d.wrapping_add(*s);
        }
        for (d, s) in dest.int32s.iter_mut().zip(&src.int32s) {
            *d = d.wrapping_add(*s);
        }
        for (d, s) in dest.int64s.iter_mut().zip(&src.int64s) {
            *d = d.wrapping_add(*s);
        }
        for (d, s) in dest.float32s.iter_mut().zip(&src.float32s) {
            *d += *s;
        }
        for (d, s) in dest.float64s.iter_mut().zip(&src.float64s) {
            *d += *s;
        }
        Ok(())
    }
}

impl IncrementalAggregator for CountAggregator {
    fn name(&self) -> &'static str {
        "count"
    }

    fn aggregate_descriptor(
        &self,
        input: &FieldDescriptor,
    ) -> DimensionResult<FieldDescriptor> {
        if !input.is_empty() {
            return Err(DimensionError::schema_error(
                "'count' takes no input fields",
                None,
            ));
        }
        FieldDescriptor::new(vec![(COUNT_FIELD.to_string(), FieldKind::Int64)])
    }

    fn seed(&self, dest: &mut GenericRecord) {
        // A freshly projected aggregate represents exactly one event.
        if let Some(slot) = dest.int64s.first_mut() {
            *slot = 1;
        }
    }

    fn combine(&self, dest: &mut GenericRecord, src: &GenericRecord) -> DimensionResult<()> {
        check_same_shape(self.name(), dest, src)?;
        for (d, s) in dest.int64s.iter_mut().zip(&src.int64s) {
            *d = d.wrapping_add(*s);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use std::sync::Arc;

    fn numeric_descriptor() -> Arc<FieldDescriptor> {
        Arc::new(
            FieldDescriptor::new(vec![
                ("a".to_string(), FieldKind::Int32),
                ("b".to_string(), FieldKind::Float64),
                ("c".to_string(), FieldKind::Int64),
            ])
            .unwrap(),
        )
    }

    fn record(desc: &Arc<FieldDescriptor>, a: i32, b: f64, c: i64) -> GenericRecord {
        let mut r = GenericRecord::new(desc.clone());
        r.set("a", FieldValue::Int32(a)).unwrap();
        r.set("b", FieldValue::Float64(b)).unwrap();
        r.set("c", FieldValue::Int64(c)).unwrap();
        r
    }

    fn combine(
        aggregator: &dyn IncrementalAggregator,
        dest: &GenericRecord,
        src: &GenericRecord,
    ) -> GenericRecord {
        let mut out = dest.clone();
        aggregator.combine(&mut out, src).unwrap();
        out
    }

    #[test]
    fn test_min_combine_rule() {
        let desc = numeric_descriptor();
        let out = combine(
            &MinAggregator,
            &record(&desc, 5, 2.5, -1),
            &record(&desc, 3, 7.0, 4),
        );
        assert_eq!(out.get("a").unwrap(), FieldValue::Int32(3));
        assert_eq!(out.get("b").unwrap(), FieldValue::Float64(2.5));
        assert_eq!(out.get("c").unwrap(), FieldValue::Int64(-1));
    }

    #[test]
    fn test_max_combine_rule() {
        let desc = numeric_descriptor();
        let out = combine(
            &MaxAggregator,
            &record(&desc, 5, 2.5, -1),
            &record(&desc, 3, 7.0, 4),
        );
        assert_eq!(out.get("a").unwrap(), FieldValue::Int32(5));
        assert_eq!(out.get("b").unwrap(), FieldValue::Float64(7.0));
        assert_eq!(out.get("c").unwrap(), FieldValue::Int64(4));
    }

    #[test]
    fn test_sum_combine_rule_and_wrapping() {
        let desc = numeric_descriptor();
        let out = combine(
            &SumAggregator,
            &record(&desc, 5, 2.5, i64::MAX),
            &record(&desc, 3, 7.0, 1),
        );
        assert_eq!(out.get("a").unwrap(), FieldValue::Int32(8));
        assert_eq!(out.get("b").unwrap(), FieldValue::Float64(9.5));
        assert_eq!(out.get("c").unwrap(), FieldValue::Int64(i64::MIN));
    }

    #[test]
    fn test_commutativity() {
        let desc = numeric_descriptor();
        let x = record(&desc, 5, 2.5, -1);
        let y = record(&desc, 3, 7.0, 4);
        for aggregator in [
            &MinAggregator as &dyn IncrementalAggregator,
            &MaxAggregator,
            &SumAggregator,
        ] {
            assert_eq!(
                combine(aggregator, &x, &y),
                combine(aggregator, &y, &x),
                "{} must be commutative",
                aggregator.name()
            );
        }
    }

    #[test]
    fn test_associativity() {
        let desc = numeric_descriptor();
        let x = record(&desc, 5, 2.5, -1);
        let y = record(&desc, 3, 7.0, 4);
        let z = record(&desc, -2, 4.25, 9);
        for aggregator in [
            &MinAggregator as &dyn IncrementalAggregator,
            &MaxAggregator,
            &SumAggregator,
        ] {
            let left = combine(aggregator, &combine(aggregator, &x, &y), &z);
            let right = combine(aggregator, &x, &combine(aggregator, &y, &z));
            assert_eq!(left, right, "{} must be associative", aggregator.name());
        }
    }

    #[test]
    fn test_shape_disagreement_is_type_mismatch() {
        let desc = numeric_descriptor();
        let other = Arc::new(
            FieldDescriptor::new(vec![
                ("a".to_string(), FieldKind::Int64),
                ("b".to_string(), FieldKind::Float64),
                ("c".to_string(), FieldKind::Int64),
            ])
            .unwrap(),
        );
        let mut dest = record(&desc, 1, 1.0, 1);
        let src = GenericRecord::new(other);
        let err = MinAggregator.combine(&mut dest, &src).unwrap_err();
        assert!(matches!(
            err,
            DimensionError::TypeMismatch { field: Some(ref f), .. } if f == "a"
        ));
    }

    #[test]
    fn test_string_field_is_unsupported() {
        let desc = Arc::new(
            FieldDescriptor::new(vec![
                ("a".to_string(), FieldKind::Int32),
                ("label".to_string(), FieldKind::String),
            ])
            .unwrap(),
        );
        let mut dest = GenericRecord::new(desc.clone());
        let src = GenericRecord::new(desc.clone());
        let err = SumAggregator.combine(&mut dest, &src).unwrap_err();
        assert!(matches!(
            err,
            DimensionError::UnsupportedFieldType { ref field, .. } if field == "label"
        ));
        // Also rejected at shape-derivation time.
        assert!(SumAggregator.aggregate_descriptor(&desc).is_err());
    }

    #[test]
    fn test_count_descriptor_seed_and_combine() {
        let empty = FieldDescriptor::new(vec![]).unwrap();
        let desc = Arc::new(CountAggregator.aggregate_descriptor(&empty).unwrap());
        assert_eq!(desc.kind_of(COUNT_FIELD), Some(FieldKind::Int64));

        let mut first = GenericRecord::new(desc.clone());
        CountAggregator.seed(&mut first);
        assert_eq!(first.get(COUNT_FIELD).unwrap(), FieldValue::Int64(1));

        let mut second = GenericRecord::new(desc);
        CountAggregator.seed(&mut second);
        CountAggregator.combine(&mut first, &second).unwrap();
        assert_eq!(first.get(COUNT_FIELD).unwrap(), FieldValue::Int64(2));
    }

    #[test]
    fn test_count_rejects_input_fields() {
        let desc = numeric_descriptor();
        let err = CountAggregator.aggregate_descriptor(&desc).unwrap_err();
        assert!(matches!(err, DimensionError::SchemaError { .. }));
    }

    #[test]
    fn test_value_aggregators_reject_empty_input() {
        let empty = FieldDescriptor::new(vec![]).unwrap();
        for aggregator in [
            &MinAggregator as &dyn IncrementalAggregator,
            &MaxAggregator,
            &SumAggregator,
        ] {
            assert!(aggregator.aggregate_descriptor(&empty).is_err());
        }
    }
}
