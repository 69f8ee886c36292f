//! Schema compilation.
//!
//! [`DimensionalSchema::compile`] turns a declarative [`SchemaDefinition`]
//! into the index spaces the engine works with: the input values descriptor,
//! the master key descriptor, one key descriptor per dimension combination,
//! and per (combination, aggregator) input and aggregate descriptors.
//! Combination IDs (list position) and aggregator IDs (registry-assigned)
//! are stable integers fixed at compile time; renumbering them would
//! invalidate previously emitted state.
//!
//! Compilation runs once at setup. All per-event work uses the precomputed
//! descriptors and IDs produced here.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::aggregator::AggregatorRegistry;
use crate::error::{DimensionError, DimensionResult};
use crate::schema::definition::SchemaDefinition;
use crate::schema::dimensions::{DimensionsDescriptor, TIME_BUCKET_FIELD, TIME_FIELD};
use crate::types::{FieldDescriptor, FieldKind, GenericRecord, InputEvent};

/// The schema ID stamped on aggregates when none is configured.
pub const DEFAULT_SCHEMA_ID: u32 = 1;

/// One compiled (combination, aggregator) pairing.
#[derive(Debug, Clone)]
pub struct CompiledAggregation {
    /// Registry-assigned stable aggregator ID
    pub aggregator_id: u32,
    /// Aggregator name, kept for logging and error messages
    pub aggregator_name: String,
    /// The value fields this aggregator consumes from each event
    pub input_descriptor: Arc<FieldDescriptor>,
    /// The shape of the accumulated aggregate record
    pub aggregate_descriptor: Arc<FieldDescriptor>,
}

/// One compiled dimension combination.
#[derive(Debug, Clone)]
pub struct CompiledCombination {
    /// The key field set and time bucket this combination groups by
    pub descriptor: DimensionsDescriptor,
    /// This combination's key fields plus the reserved time fields; a
    /// projection of the master key descriptor
    pub key_descriptor: Arc<FieldDescriptor>,
    /// The aggregations maintained for this combination, in declared order
    pub aggregations: Vec<CompiledAggregation>,
}

/// A compiled dimensional schema: the fixed index space for one engine.
#[derive(Debug, Clone)]
pub struct DimensionalSchema {
    schema_id: u32,
    input_values: Arc<FieldDescriptor>,
    master_key: Arc<FieldDescriptor>,
    combinations: Vec<CompiledCombination>,
}

impl DimensionalSchema {
    /// Compile a declarative schema against an aggregator registry, with
    /// the default schema ID.
    pub fn compile(
        definition: &SchemaDefinition,
        registry: &AggregatorRegistry,
    ) -> DimensionResult<Self> {
        Self::compile_with_id(definition, registry, DEFAULT_SCHEMA_ID)
    }

    /// Compile a declarative schema, stamping `schema_id` on every
    /// aggregate the engine emits.
    pub fn compile_with_id(
        definition: &SchemaDefinition,
        registry: &AggregatorRegistry,
        schema_id: u32,
    ) -> DimensionResult<Self> {
        for field in definition.keys.iter().chain(&definition.values) {
            if field.name == TIME_FIELD || field.name == TIME_BUCKET_FIELD {
                return Err(DimensionError::schema_error(
                    "field name is reserved for the engine",
                    Some(field.name.clone()),
                ));
            }
        }

        let key_names: HashSet<&str> =
            definition.keys.iter().map(|f| f.name.as_str()).collect();
        for value in &definition.values {
            if key_names.contains(value.name.as_str()) {
                return Err(DimensionError::schema_error(
                    "field declared as both key and value",
                    Some(value.name.clone()),
                ));
            }
        }

        let input_values = Arc::new(FieldDescriptor::new(
            definition
                .values
                .iter()
                .map(|f| (f.name.clone(), f.kind))
                .collect(),
        )?);

        let mut master_fields: Vec<(String, FieldKind)> = definition
            .keys
            .iter()
            .map(|f| (f.name.clone(), f.kind))
            .collect();
        master_fields.push((TIME_FIELD.to_string(), FieldKind::Int64));
        master_fields.push((TIME_BUCKET_FIELD.to_string(), FieldKind::Int32));
        let master_key = Arc::new(FieldDescriptor::new(master_fields)?);

        if definition.combinations.is_empty() {
            return Err(DimensionError::schema_error(
                "no combinations declared",
                None,
            ));
        }

        let mut combinations = Vec::with_capacity(definition.combinations.len());
        let mut seen: Vec<DimensionsDescriptor> = Vec::new();

        for combination in &definition.combinations {
            for key in &combination.keys {
                if !key_names.contains(key.as_str()) {
                    return Err(DimensionError::schema_error(
                        "combination references an undeclared key field",
                        Some(key.clone()),
                    ));
                }
            }

            let descriptor =
                DimensionsDescriptor::new(&combination.keys, combination.time_bucket);
            if seen.contains(&descriptor) {
                return Err(DimensionError::schema_error(
                    format!(
                        "duplicate combination [{}] at bucket '{}'",
                        descriptor.key_fields().join(", "),
                        descriptor.time_bucket().name()
                    ),
                    None,
                ));
            }
            seen.push(descriptor.clone());

            // Combination keys in master declaration order, then the
            // reserved time fields.
            let mut key_fields: Vec<(String, FieldKind)> = definition
                .keys
                .iter()
                .filter(|f| descriptor.key_fields().contains(&f.name))
                .map(|f| (f.name.clone(), f.kind))
                .collect();
            key_fields.push((TIME_FIELD.to_string(), FieldKind::Int64));
            key_fields.push((TIME_BUCKET_FIELD.to_string(), FieldKind::Int32));
            let key_descriptor = Arc::new(FieldDescriptor::new(key_fields)?);

            let mut aggregations = Vec::with_capacity(combination.aggregations.len());
            let mut seen_aggregators: HashSet<u32> = HashSet::new();

            for aggregation in &combination.aggregations {
                let aggregator_id =
                    registry.id_of(&aggregation.aggregator).ok_or_else(|| {
                        DimensionError::schema_error(
                            "unknown aggregator",
                            Some(aggregation.aggregator.clone()),
                        )
                    })?;
                if !seen_aggregators.insert(aggregator_id) {
                    return Err(DimensionError::schema_error(
                        "aggregator listed twice for one combination",
                        Some(aggregation.aggregator.clone()),
                    ));
                }
                let aggregator = registry
                    .get(aggregator_id)
                    .expect("id_of and get are consistent");

                let mut input_fields = Vec::with_capacity(aggregation.fields.len());
                for name in &aggregation.fields {
                    let kind = input_values.kind_of(name).ok_or_else(|| {
                        DimensionError::schema_error(
                            "aggregation references an undeclared value field",
                            Some(name.clone()),
                        )
                    })?;
                    input_fields.push((name.clone(), kind));
                }
                let input_descriptor = Arc::new(FieldDescriptor::new(input_fields)?);
                let aggregate_descriptor =
                    Arc::new(aggregator.aggregate_descriptor(&input_descriptor)?);

                aggregations.push(CompiledAggregation {
                    aggregator_id,
                    aggregator_name: aggregation.aggregator.clone(),
                    input_descriptor,
                    aggregate_descriptor,
                });
            }

            combinations.push(CompiledCombination {
                descriptor,
                key_descriptor,
                aggregations,
            });
        }

        let aggregation_count: usize =
            combinations.iter().map(|c| c.aggregations.len()).sum();
        debug!(
            "compiled dimensional schema {}: {} combinations, {} aggregations",
            schema_id,
            combinations.len(),
            aggregation_count
        );

        Ok(Self {
            schema_id,
            input_values,
            master_key,
            combinations,
        })
    }

    /// Parse a JSON schema definition and compile it.
    pub fn from_json(json: &str, registry: &AggregatorRegistry) -> DimensionResult<Self> {
        let definition: SchemaDefinition = serde_json::from_str(json).map_err(|e| {
            DimensionError::schema_error(format!("invalid schema JSON: {}", e), None)
        })?;
        Self::compile(&definition, registry)
    }

    /// The schema ID stamped on emitted aggregates
    pub fn schema_id(&self) -> u32 {
        self.schema_id
    }

    /// All value fields available as aggregation input
    pub fn input_values(&self) -> &Arc<FieldDescriptor> {
        &self.input_values
    }

    /// All key fields plus the reserved time fields; the index space every
    /// combination key descriptor is projected from
    pub fn master_key(&self) -> &Arc<FieldDescriptor> {
        &self.master_key
    }

    /// Compiled combinations; a combination's ID is its position here
    pub fn combinations(&self) -> &[CompiledCombination] {
        &self.combinations
    }

    /// Create a default-initialized event shaped by this schema.
    pub fn new_event(&self, timestamp: i64) -> InputEvent {
        InputEvent {
            keys: GenericRecord::new(self.master_key.clone()),
            values: GenericRecord::new(self.input_values.clone()),
            timestamp,
        }
    }
}
