//! CSV export of every logged set.

use crate::setlog::{decode_sets, exercise_label, workout_id};
use crate::store::{Store, EXERCISE_LOG_PREFIX};
use crate::types::LoggedSet;
use crate::Result;
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    key: &'a str,
    workout_id: &'a str,
    exercise: &'a str,
    set: u32,
    weight: f64,
    reps: u32,
    rpe: Option<u8>,
    timestamp: Option<String>,
}

impl<'a> CsvRow<'a> {
    fn new(key: &'a str, set: &LoggedSet) -> Self {
        CsvRow {
            key,
            workout_id: workout_id(key).unwrap_or_default(),
            exercise: exercise_label(key).unwrap_or_default(),
            set: set.set_number,
            weight: set.weight,
            reps: set.reps,
            rpe: set.rpe(),
            timestamp: set.timestamp.map(|t| t.to_rfc3339()),
        }
    }
}

/// Write all set logs in the store to `csv_path`, replacing the file
///
/// Keys that cannot be decoded are skipped. The file is synced to disk
/// before returning. Returns the number of rows written.
pub fn export_sets_csv<S: Store + ?Sized>(store: &S, csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut rows = 0;
    for (key, raw) in store.scan(EXERCISE_LOG_PREFIX)? {
        let sets = match decode_sets(&key, &raw) {
            Ok(sets) => sets,
            Err(e) => {
                tracing::warn!("Skipping {} in export: {}", key, e);
                continue;
            }
        };
        for set in &sets {
            writer.serialize(CsvRow::new(&key, set))?;
            rows += 1;
        }
    }

    // Headers are only emitted with the first record
    if rows == 0 {
        writer.write_record([
            "key",
            "workout_id",
            "exercise",
            "set",
            "weight",
            "reps",
            "rpe",
            "timestamp",
        ])?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} sets to {:?}", rows, csv_path);
    Ok(rows)
}
