//! Workout history list.
//!
//! One entry is recorded per generated workout, newest first, capped at
//! [`HISTORY_LIMIT`] entries.

use crate::store::{decode_records, load_records, store_records, Store, HISTORY_KEY};
use crate::types::{GeneratedExercise, WorkoutHistoryEntry, WorkoutRequest};
use crate::Result;
use chrono::{DateTime, Utc};

/// Number of history entries retained
pub const HISTORY_LIMIT: usize = 20;

/// Build the history entry for a freshly generated workout
pub fn entry_for(
    request: &WorkoutRequest,
    exercises: &[GeneratedExercise],
    at: DateTime<Utc>,
) -> WorkoutHistoryEntry {
    WorkoutHistoryEntry {
        workout_type: request.workout_type.clone(),
        muscle_group: request.muscles.join(", "),
        objective: request.goal.clone(),
        exercises: exercises.iter().map(|e| e.name.clone()).collect(),
        date: at,
    }
}

/// Load the history list, newest first
///
/// A missing key is an empty history. A value that is not a list is logged
/// and treated as empty; entries that fail to decode are skipped.
pub fn load_history<S: Store + ?Sized>(store: &S) -> Result<Vec<WorkoutHistoryEntry>> {
    let records = load_records(store, HISTORY_KEY)?;
    Ok(decode_records(HISTORY_KEY, &records))
}

/// Number of stored history entries, including ones that fail to decode
pub fn history_len<S: Store + ?Sized>(store: &S) -> Result<usize> {
    Ok(load_records(store, HISTORY_KEY)?.len())
}

/// Prepend an entry and truncate to the retention limit
///
/// Entries that fail to decode keep their place in the stored list.
/// Returns the decodable entries as stored.
pub fn record_workout<S: Store + ?Sized>(
    store: &mut S,
    entry: WorkoutHistoryEntry,
) -> Result<Vec<WorkoutHistoryEntry>> {
    let mut records = load_records(&*store, HISTORY_KEY)?;
    records.insert(0, serde_json::to_value(&entry)?);
    records.truncate(HISTORY_LIMIT);

    store_records(store, HISTORY_KEY, &records)?;
    tracing::debug!("Workout history now holds {} entries", records.len());
    Ok(decode_records(HISTORY_KEY, &records))
}

/// Remove the whole history list
pub fn clear_history<S: Store + ?Sized>(store: &mut S) -> Result<()> {
    store.remove(HISTORY_KEY)?;
    tracing::info!("Cleared workout history");
    Ok(())
}
