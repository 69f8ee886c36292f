//! Dimension combinations and time buckets.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Reserved key field holding the bucket-truncated event timestamp (INT64).
pub const TIME_FIELD: &str = "_time";

/// Reserved key field holding the time bucket ordinal (INT32).
pub const TIME_BUCKET_FIELD: &str = "_time_bucket";

/// A truncation granularity for event timestamps.
///
/// Every dimension combination carries one bucket; the engine truncates each
/// event's timestamp to the bucket boundary and keys aggregates by the
/// truncated value. Ordinals are stable codes stamped into emitted keys and
/// must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    /// No time partitioning; all events fall into one bucket
    All,
    /// Truncate to the minute
    Minute,
    /// Truncate to the hour
    Hour,
    /// Truncate to the day (UTC)
    Day,
}

impl TimeBucket {
    /// Truncate an event-time millisecond timestamp to this bucket's
    /// boundary. `All` maps every timestamp to 0.
    pub fn truncate(&self, timestamp_ms: i64) -> i64 {
        let step = match self {
            TimeBucket::All => return 0,
            TimeBucket::Minute => Duration::minutes(1),
            TimeBucket::Hour => Duration::hours(1),
            TimeBucket::Day => Duration::days(1),
        }
        .num_milliseconds();

        // rem_euclid keeps pre-epoch timestamps on the correct boundary
        timestamp_ms - timestamp_ms.rem_euclid(step)
    }

    /// Stable ordinal written into the `_time_bucket` key slot
    pub fn ordinal(&self) -> i32 {
        match self {
            TimeBucket::All => 0,
            TimeBucket::Minute => 1,
            TimeBucket::Hour => 2,
            TimeBucket::Day => 3,
        }
    }

    /// Bucket name for logging and error messages
    pub fn name(&self) -> &'static str {
        match self {
            TimeBucket::All => "all",
            TimeBucket::Minute => "minute",
            TimeBucket::Hour => "hour",
            TimeBucket::Day => "day",
        }
    }
}

/// One dimension combination: a set of key fields plus a time bucket.
///
/// Key fields are kept sorted and deduplicated so that equality is set
/// equality; two combinations with the same key set and bucket are
/// ambiguous and rejected at schema compile time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimensionsDescriptor {
    key_fields: Vec<String>,
    time_bucket: TimeBucket,
}

impl DimensionsDescriptor {
    /// Create a combination from key field names and a bucket. Names are
    /// sorted and deduplicated.
    pub fn new(key_fields: &[String], time_bucket: TimeBucket) -> Self {
        let mut key_fields = key_fields.to_vec();
        key_fields.sort();
        key_fields.dedup();
        Self {
            key_fields,
            time_bucket,
        }
    }

    /// The sorted key field names
    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    /// The time bucket granularity
    pub fn time_bucket(&self) -> TimeBucket {
        self.time_bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    #[test]
    fn test_truncate_minute_and_hour() {
        // 2026-01-01T10:17:42.500Z
        let ts = 1_767_262_662_500;
        assert_eq!(TimeBucket::Minute.truncate(ts), ts - 42_500);
        assert_eq!(TimeBucket::Hour.truncate(ts) % HOUR_MS, 0);
        assert!(TimeBucket::Hour.truncate(ts) <= ts);
        assert!(ts - TimeBucket::Hour.truncate(ts) < HOUR_MS);
    }

    #[test]
    fn test_truncate_day_and_all() {
        let ts = 1_767_262_662_500;
        assert_eq!(TimeBucket::Day.truncate(ts) % (24 * HOUR_MS), 0);
        assert_eq!(TimeBucket::All.truncate(ts), 0);
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let ts = 1_767_262_662_500;
        for bucket in [TimeBucket::Minute, TimeBucket::Hour, TimeBucket::Day] {
            let truncated = bucket.truncate(ts);
            assert_eq!(bucket.truncate(truncated), truncated);
        }
    }

    #[test]
    fn test_truncate_pre_epoch() {
        let ts = -90_000; // 1969-12-31T23:58:30Z
        let truncated = TimeBucket::Minute.truncate(ts);
        assert_eq!(truncated, -120_000);
        assert!(truncated <= ts);
    }

    #[test]
    fn test_descriptor_equality_is_set_equality() {
        let a = DimensionsDescriptor::new(
            &["region".to_string(), "host".to_string()],
            TimeBucket::Hour,
        );
        let b = DimensionsDescriptor::new(
            &["host".to_string(), "region".to_string()],
            TimeBucket::Hour,
        );
        let c = DimensionsDescriptor::new(
            &["region".to_string(), "host".to_string()],
            TimeBucket::Day,
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_bucket_serde_names() {
        let bucket: TimeBucket = serde_json::from_str("\"hour\"").unwrap();
        assert_eq!(bucket, TimeBucket::Hour);
        assert_eq!(serde_json::to_string(&TimeBucket::All).unwrap(), "\"all\"");
    }
}
