//! Declarative schema structures.
//!
//! These structs are the post-parse form of a dimensional schema, typically
//! deserialized from JSON by an external loader and handed to
//! [`DimensionalSchema::compile`]. The engine owns no file or wire handling
//! beyond the [`DimensionalSchema::from_json`] convenience.
//!
//! [`DimensionalSchema::compile`]: super::compiled::DimensionalSchema::compile
//! [`DimensionalSchema::from_json`]: super::compiled::DimensionalSchema::from_json

use serde::{Deserialize, Serialize};

use crate::schema::dimensions::TimeBucket;
use crate::types::FieldKind;

/// One declared field: a name and its primitive type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

/// One aggregation applied within a combination: an aggregator name from the
/// registry and the value fields it consumes.
///
/// `fields` must be empty for aggregators that take no input (`count`) and
/// non-empty for value-consuming aggregators (`min`, `max`, `sum`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationDefinition {
    pub aggregator: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// One dimension combination: the key fields to group by, the time bucket
/// granularity, and the aggregations to maintain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationDefinition {
    #[serde(default)]
    pub keys: Vec<String>,
    pub time_bucket: TimeBucket,
    pub aggregations: Vec<AggregationDefinition>,
}

/// A complete declarative dimensional schema.
///
/// `keys` declares every field usable as a dimension key; `values` declares
/// every field usable as aggregation input. The two sets must not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub keys: Vec<FieldDefinition>,
    #[serde(default)]
    pub values: Vec<FieldDefinition>,
    pub combinations: Vec<CombinationDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_json() {
        let json = r#"{
            "keys": [{"name": "region", "type": "string"}],
            "values": [{"name": "latency", "type": "int32"}],
            "combinations": [
                {
                    "keys": ["region"],
                    "time_bucket": "hour",
                    "aggregations": [
                        {"aggregator": "min", "fields": ["latency"]},
                        {"aggregator": "count"}
                    ]
                }
            ]
        }"#;

        let def: SchemaDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.keys[0].kind, FieldKind::String);
        assert_eq!(def.values[0].name, "latency");
        let combination = &def.combinations[0];
        assert_eq!(combination.time_bucket, TimeBucket::Hour);
        assert_eq!(combination.aggregations[1].aggregator, "count");
        // omitted "fields" defaults to empty
        assert!(combination.aggregations[1].fields.is_empty());
    }
}
