//! Analytics over everything stored so far.
//!
//! [`compute_snapshot`] is read-only: it scans every set log and the history
//! list and derives totals, per-exercise progress and daily volume. A log
//! key whose value cannot be decoded is skipped on its own.

use crate::setlog::{decode_sets, exercise_label};
use crate::store::{decode_records, load_records, Store, EXERCISE_LOG_PREFIX, HISTORY_KEY};
use crate::types::{LoggedSet, WorkoutHistoryEntry};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Label used when a log key carries no exercise component
pub const UNKNOWN_EXERCISE: &str = "Unknown Exercise";

/// One set on an exercise's progress line
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub weight: f64,
    pub volume: f64,
}

/// Volume summed over one calendar day (UTC)
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub total_volume: f64,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_workouts: usize,
    pub total_volume: f64,
    pub exercise_progress: BTreeMap<String, Vec<ProgressPoint>>,
    pub volume_by_date: Vec<DailyVolume>,
    pub exercise_frequency: BTreeMap<String, u32>,
    pub recent_workouts: Vec<WorkoutHistoryEntry>,
}

/// Aggregate the store into a snapshot
///
/// Sets without a timestamp count towards totals and frequency but cannot
/// be placed on a date axis. Every stored history entry counts as a
/// workout, even one that no longer decodes.
pub fn compute_snapshot<S: Store + ?Sized>(store: &S) -> Result<AnalyticsSnapshot> {
    let history_records = load_records(store, HISTORY_KEY)?;
    let history: Vec<WorkoutHistoryEntry> = decode_records(HISTORY_KEY, &history_records);

    let mut by_exercise: BTreeMap<String, Vec<LoggedSet>> = BTreeMap::new();
    for (key, raw) in store.scan(EXERCISE_LOG_PREFIX)? {
        let sets = match decode_sets(&key, &raw) {
            Ok(sets) => sets,
            Err(e) => {
                tracing::warn!("Skipping {} in analytics: {}", key, e);
                continue;
            }
        };
        let label = exercise_label(&key).unwrap_or(UNKNOWN_EXERCISE).to_string();
        by_exercise.entry(label).or_default().extend(sets);
    }

    let mut snapshot = AnalyticsSnapshot {
        total_workouts: history_records.len(),
        recent_workouts: history,
        ..Default::default()
    };
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for (label, sets) in by_exercise {
        snapshot.total_volume += sets.iter().map(LoggedSet::volume).sum::<f64>();
        *snapshot.exercise_frequency.entry(label.clone()).or_insert(0) += sets.len() as u32;

        // Only dated sets go on the progress line and the daily totals
        let mut dated: Vec<(DateTime<Utc>, &LoggedSet)> = sets
            .iter()
            .filter_map(|s| s.timestamp.map(|at| (at, s)))
            .collect();
        dated.sort_by_key(|(at, _)| *at);

        let points: Vec<ProgressPoint> = dated
            .into_iter()
            .map(|(at, s)| {
                let date = at.date_naive();
                *daily.entry(date).or_insert(0.0) += s.volume();
                ProgressPoint {
                    date,
                    weight: s.weight,
                    volume: s.volume(),
                }
            })
            .collect();
        snapshot.exercise_progress.insert(label, points);
    }

    snapshot.volume_by_date = daily
        .into_iter()
        .map(|(date, total_volume)| DailyVolume { date, total_volume })
        .collect();

    tracing::debug!(
        "Analytics: {} workouts, {} exercises, volume {}",
        snapshot.total_workouts,
        snapshot.exercise_frequency.len(),
        snapshot.total_volume
    );
    Ok(snapshot)
}
