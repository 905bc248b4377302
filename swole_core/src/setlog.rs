//! Per-exercise set logs: key layout and tolerant decoding.
//!
//! Logs live under `exercise_{workoutId}_{exerciseIndex}` as a JSON array of
//! `{set, weight, reps, rpe, timestamp}` objects. Numeric fields may have
//! been written as strings by older front-ends, so decoding accepts numbers,
//! numeric strings and nulls, and treats anything else as 0.

use crate::store::{Store, EXERCISE_LOG_PREFIX};
use crate::types::LoggedSet;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Store key for one exercise of one workout
pub fn log_key(workout_id: &str, exercise_index: usize) -> String {
    format!("{}{}_{}", EXERCISE_LOG_PREFIX, workout_id, exercise_index)
}

/// Exercise label embedded in a log key: the third `_`-separated component
pub fn exercise_label(key: &str) -> Option<&str> {
    if !key.starts_with(EXERCISE_LOG_PREFIX) {
        return None;
    }
    key.split('_').nth(2).filter(|s| !s.is_empty())
}

/// Workout id embedded in a log key
pub fn workout_id(key: &str) -> Option<&str> {
    key.strip_prefix(EXERCISE_LOG_PREFIX)?
        .split('_')
        .next()
        .filter(|s| !s.is_empty())
}

/// Decode a stored log value
///
/// Fails with `CorruptedLogEntry` only when the value is not a JSON array;
/// individual malformed fields fall back to zero.
pub fn decode_sets(key: &str, raw: &str) -> Result<Vec<LoggedSet>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| Error::CorruptedLogEntry {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    let items = value.as_array().ok_or_else(|| Error::CorruptedLogEntry {
        key: key.to_string(),
        reason: "expected a JSON array".into(),
    })?;

    Ok(items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_set(item, i as u32 + 1))
        .collect())
}

fn decode_set(item: &Value, position: u32) -> LoggedSet {
    let set_number = match number(item.get("set")) {
        n if n >= 1.0 => n as u32,
        _ => position,
    };

    LoggedSet {
        set_number,
        weight: number(item.get("weight")),
        reps: number(item.get("reps")) as u32,
        rpe: number(item.get("rpe")).min(10.0) as u8,
        timestamp: item
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Lenient numeric read: numbers and numeric strings, otherwise 0.
/// Negative and non-finite values also read as 0.
fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

/// Read the sets stored for one exercise, treating a corrupt value as empty
pub fn read_sets<S: Store + ?Sized>(store: &S, key: &str) -> Result<Vec<LoggedSet>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };

    match decode_sets(key, &raw) {
        Ok(sets) => Ok(sets),
        Err(e) => {
            tracing::warn!("{}. Treating as empty.", e);
            Ok(Vec::new())
        }
    }
}

/// Persist the full set sequence for one exercise
pub fn write_sets<S: Store + ?Sized>(store: &mut S, key: &str, sets: &[LoggedSet]) -> Result<()> {
    let raw = serde_json::to_string(sets)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_key_layout() {
        let key = log_key("3f2a9c", 4);
        assert_eq!(key, "exercise_3f2a9c_4");
        assert_eq!(exercise_label(&key), Some("4"));
        assert_eq!(workout_id(&key), Some("3f2a9c"));
        assert_eq!(exercise_label("workoutHistory"), None);
        assert_eq!(exercise_label("exercise_only"), None);
    }

    #[test]
    fn test_decode_accepts_string_numbers() {
        let raw = r#"[{"set":1,"weight":"135","reps":"10","rpe":"","timestamp":"2026-03-01T10:00:00.000Z"}]"#;
        let sets = decode_sets("exercise_a_0", raw).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].weight, 135.0);
        assert_eq!(sets[0].reps, 10);
        assert_eq!(sets[0].rpe(), None);
        assert!(sets[0].timestamp.is_some());
    }

    #[test]
    fn test_decode_defaults_garbage_fields() {
        let raw = r#"[{"weight":"heavy","reps":null,"timestamp":"yesterday"},{"set":2,"weight":-5}]"#;
        let sets = decode_sets("exercise_a_0", raw).unwrap();
        assert_eq!(sets[0].set_number, 1);
        assert_eq!(sets[0].weight, 0.0);
        assert_eq!(sets[0].reps, 0);
        assert!(sets[0].timestamp.is_none());
        assert_eq!(sets[1].weight, 0.0);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        assert!(matches!(
            decode_sets("exercise_a_0", "{ not json"),
            Err(Error::CorruptedLogEntry { .. })
        ));
        assert!(matches!(
            decode_sets("exercise_a_0", r#"{"set":1}"#),
            Err(Error::CorruptedLogEntry { .. })
        ));
    }

    #[test]
    fn test_read_corrupt_value_is_empty() {
        let mut store = MemoryStore::new();
        store.set("exercise_a_0", "not json at all").unwrap();
        assert!(read_sets(&store, "exercise_a_0").unwrap().is_empty());
        assert!(read_sets(&store, "exercise_a_1").unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let mut store = MemoryStore::new();
        let sets = vec![LoggedSet {
            set_number: 1,
            weight: 100.0,
            reps: 10,
            rpe: 8,
            timestamp: Some(Utc::now()),
        }];
        write_sets(&mut store, "exercise_a_0", &sets).unwrap();

        let raw = store.get("exercise_a_0").unwrap().unwrap();
        assert!(raw.contains(r#""set":1"#));
        assert_eq!(read_sets(&store, "exercise_a_0").unwrap(), sets);
    }
}
