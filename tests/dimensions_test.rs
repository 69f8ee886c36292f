//! End-to-end tests for the dimensional aggregation engine.
//!
//! These tests drive the full path: JSON schema -> compiled schema ->
//! windowed engine -> flush -> unifier, the way a host streaming runtime
//! would.

use std::sync::Arc;

use dimstream::{
    Aggregate, AggregatorRegistry, DimensionalSchema, DimensionsComputation, DimensionsUnifier,
    FieldValue, InputEvent, TimeBucket, COUNT_FIELD, TIME_BUCKET_FIELD, TIME_FIELD,
};

const HOUR_MS: i64 = 3_600_000;

const SCHEMA_JSON: &str = r#"{
    "keys": [
        {"name": "region", "type": "string"},
        {"name": "host", "type": "string"}
    ],
    "values": [
        {"name": "latency", "type": "int32"},
        {"name": "bytes", "type": "int64"},
        {"name": "load", "type": "float64"}
    ],
    "combinations": [
        {
            "keys": ["region"],
            "time_bucket": "hour",
            "aggregations": [
                {"aggregator": "min", "fields": ["latency"]},
                {"aggregator": "max", "fields": ["latency", "load"]},
                {"aggregator": "count"}
            ]
        },
        {
            "keys": ["region", "host"],
            "time_bucket": "minute",
            "aggregations": [
                {"aggregator": "sum", "fields": ["bytes"]}
            ]
        },
        {
            "keys": [],
            "time_bucket": "all",
            "aggregations": [
                {"aggregator": "count"}
            ]
        }
    ]
}"#;

fn setup() -> (Arc<DimensionalSchema>, Arc<AggregatorRegistry>) {
    let registry = Arc::new(AggregatorRegistry::with_defaults());
    let schema = Arc::new(DimensionalSchema::from_json(SCHEMA_JSON, &registry).unwrap());
    (schema, registry)
}

fn event(
    schema: &DimensionalSchema,
    region: &str,
    host: &str,
    latency: i32,
    bytes: i64,
    load: f64,
    timestamp: i64,
) -> InputEvent {
    let mut event = schema.new_event(timestamp);
    event
        .keys
        .set("region", FieldValue::String(region.to_string()))
        .unwrap();
    event
        .keys
        .set("host", FieldValue::String(host.to_string()))
        .unwrap();
    event
        .values
        .set("latency", FieldValue::Int32(latency))
        .unwrap();
    event.values.set("bytes", FieldValue::Int64(bytes)).unwrap();
    event.values.set("load", FieldValue::Float64(load)).unwrap();
    event
}

fn sample_events(schema: &DimensionalSchema) -> Vec<InputEvent> {
    let ten_am = 10 * HOUR_MS;
    vec![
        event(schema, "emea", "web-1", 50, 1_000, 0.25, ten_am + 5_000),
        event(schema, "emea", "web-2", 30, 2_000, 0.75, ten_am + 65_000),
        event(schema, "emea", "web-1", 80, 500, 0.50, ten_am + 66_000),
        event(schema, "apac", "web-3", 90, 4_000, 0.10, ten_am + 70_000),
        event(schema, "apac", "web-3", 20, 1_500, 0.90, ten_am + 71_000),
    ]
}

fn find<'a>(
    aggregates: &'a [Aggregate],
    dimensions_id: u32,
    aggregator_name_id: u32,
    key_checks: &[(&str, FieldValue)],
) -> Option<&'a Aggregate> {
    aggregates.iter().find(|a| {
        a.key.dimensions_id == dimensions_id
            && a.key.aggregator_id == aggregator_name_id
            && key_checks
                .iter()
                .all(|(name, value)| a.key.keys.get(name).as_ref() == Ok(value))
    })
}

fn sort(aggregates: &mut [Aggregate]) {
    aggregates.sort_by(|a, b| {
        (a.key.dimensions_id, a.key.aggregator_id)
            .cmp(&(b.key.dimensions_id, b.key.aggregator_id))
            .then_with(|| format!("{:?}", a.key.keys).cmp(&format!("{:?}", b.key.keys)))
    });
}

#[test]
fn test_full_window_flush() {
    let (schema, registry) = setup();
    let min_id = registry.id_of("min").unwrap();
    let max_id = registry.id_of("max").unwrap();
    let sum_id = registry.id_of("sum").unwrap();
    let count_id = registry.id_of("count").unwrap();

    let mut engine = DimensionsComputation::new(schema.clone(), registry).unwrap();
    engine.begin_window(1);
    for e in sample_events(&schema) {
        engine.process(&e).unwrap();
    }
    let flushed = engine.flush();

    // Combination 0: per-region, hour bucket. All five events share hour 10.
    let emea_key = [("region", FieldValue::String("emea".to_string()))];
    let min = find(&flushed, 0, min_id, &emea_key).unwrap();
    assert_eq!(min.aggregates.get("latency").unwrap(), FieldValue::Int32(30));

    let max = find(&flushed, 0, max_id, &emea_key).unwrap();
    assert_eq!(max.aggregates.get("latency").unwrap(), FieldValue::Int32(80));
    assert_eq!(max.aggregates.get("load").unwrap(), FieldValue::Float64(0.75));

    let count = find(&flushed, 0, count_id, &emea_key).unwrap();
    assert_eq!(count.aggregates.get(COUNT_FIELD).unwrap(), FieldValue::Int64(3));

    let apac_key = [("region", FieldValue::String("apac".to_string()))];
    let apac_min = find(&flushed, 0, min_id, &apac_key).unwrap();
    assert_eq!(
        apac_min.aggregates.get("latency").unwrap(),
        FieldValue::Int32(20)
    );

    // Combination 1: per (region, host), minute bucket. web-2 and web-1
    // fall into the same minute; web-1's first event is a minute earlier.
    let web1_first = find(
        &flushed,
        1,
        sum_id,
        &[
            ("region", FieldValue::String("emea".to_string())),
            ("host", FieldValue::String("web-1".to_string())),
            ("_time", FieldValue::Int64(10 * HOUR_MS)),
        ],
    )
    .unwrap();
    assert_eq!(
        web1_first.aggregates.get("bytes").unwrap(),
        FieldValue::Int64(1_000)
    );

    let apac_sum = find(
        &flushed,
        1,
        sum_id,
        &[("host", FieldValue::String("web-3".to_string()))],
    )
    .unwrap();
    assert_eq!(
        apac_sum.aggregates.get("bytes").unwrap(),
        FieldValue::Int64(5_500)
    );

    // Combination 2: global rollup, single bucket.
    let global = find(&flushed, 2, count_id, &[]).unwrap();
    assert_eq!(
        global.aggregates.get(COUNT_FIELD).unwrap(),
        FieldValue::Int64(5)
    );
    assert_eq!(
        global.key.keys.get(TIME_FIELD).unwrap(),
        FieldValue::Int64(0)
    );
    assert_eq!(
        global.key.keys.get(TIME_BUCKET_FIELD).unwrap(),
        FieldValue::Int32(TimeBucket::All.ordinal())
    );
}

#[test]
fn test_windows_are_isolated() {
    let (schema, registry) = setup();
    let mut engine = DimensionsComputation::new(schema.clone(), registry).unwrap();

    engine.begin_window(1);
    for e in sample_events(&schema) {
        engine.process(&e).unwrap();
    }
    assert!(!engine.flush().is_empty());

    // A fresh window with no events must flush empty.
    engine.begin_window(2);
    assert!(engine.flush().is_empty());

    // And a window with one event only reflects that event.
    engine.begin_window(3);
    engine
        .process(&event(&schema, "emea", "web-1", 10, 100, 0.1, 0))
        .unwrap();
    let count_id = AggregatorRegistry::with_defaults().id_of("count").unwrap();
    let flushed = engine.flush();
    let global = find(&flushed, 2, count_id, &[]).unwrap();
    assert_eq!(
        global.aggregates.get(COUNT_FIELD).unwrap(),
        FieldValue::Int64(1)
    );
}

#[test]
fn test_unifier_matches_single_engine_for_any_partitioning() {
    let (schema, registry) = setup();
    let events = sample_events(&schema);

    let mut single = DimensionsComputation::new(schema.clone(), registry.clone()).unwrap();
    for e in &events {
        single.process(e).unwrap();
    }
    let mut expected = single.flush();
    sort(&mut expected);

    // Try several partitionings, including a degenerate single-partition
    // split and one partition per event.
    for partition_count in [1, 2, 5] {
        let mut partitions: Vec<DimensionsComputation> = (0..partition_count)
            .map(|_| DimensionsComputation::new(schema.clone(), registry.clone()).unwrap())
            .collect();
        for (i, e) in events.iter().enumerate() {
            partitions[i % partition_count].process(e).unwrap();
        }

        let mut unifier = DimensionsUnifier::new(registry.clone());
        let mut partials: Vec<Aggregate> =
            partitions.iter_mut().flat_map(|p| p.flush()).collect();
        partials.reverse();
        for partial in partials {
            unifier.absorb(partial).unwrap();
        }

        let mut unified = unifier.flush();
        sort(&mut unified);
        assert_eq!(
            unified, expected,
            "unifier output must match a single engine across {} partitions",
            partition_count
        );
    }
}

