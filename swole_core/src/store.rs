//! Key/value persistence store.
//!
//! The core only decides key and value shapes; the medium is behind the
//! [`Store`] trait. Two implementations are provided:
//! - [`MemoryStore`] for tests and dry runs
//! - [`FileStore`], a single JSON object file with file locking

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key holding the workout history list
pub const HISTORY_KEY: &str = "workoutHistory";
/// Key holding saved custom workouts
pub const CUSTOM_WORKOUTS_KEY: &str = "customWorkouts";
/// Key holding the workout currently being performed
pub const ACTIVE_WORKOUT_KEY: &str = "activeWorkout";
/// Prefix shared by every per-exercise set log
pub const EXERCISE_LOG_PREFIX: &str = "exercise_";

/// Durable string → string mapping
///
/// Writes are atomic per key; there are no cross-key transactions.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// All entries whose key starts with `prefix`, ordered by key
    fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        Ok(scan_map(&self.entries, prefix))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

fn scan_map(entries: &BTreeMap<String, String>, prefix: &str) -> Vec<(String, String)> {
    entries
        .range(prefix.to_string()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Raw elements of a JSON list stored under `key`
///
/// A missing key is an empty list. A value that is not a JSON array is
/// logged and treated as empty.
pub fn load_records<S: Store + ?Sized>(store: &S, key: &str) -> Result<Vec<Value>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<Value>>(&raw) {
        Ok(records) => Ok(records),
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}. Treating as empty.", key, e);
            Ok(Vec::new())
        }
    }
}

/// Decode each record on its own, skipping the ones that don't fit `T`
pub fn decode_records<T: DeserializeOwned>(key: &str, records: &[Value]) -> Vec<T> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| match T::deserialize(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Skipping record {} in {}: {}", i, key, e);
                None
            }
        })
        .collect()
}

/// Write a list of raw records back under `key`
pub fn store_records<S: Store + ?Sized>(store: &mut S, key: &str, records: &[Value]) -> Result<()> {
    store.set(key, &serde_json::to_string(records)?)
}

/// Store backed by one JSON object file
///
/// Every write reloads the file under lock, applies the change and
/// atomically replaces the file, so separate processes sharing the data
/// directory see each other's keys.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the given path; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all entries with a shared lock
    ///
    /// Returns an empty map if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns an empty map.
    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse store file {:?}: {}. Starting empty.",
                    self.path,
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Atomically write all entries by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Store(format!("store path {:?} has no parent", self.path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(entries)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Load, modify and save back
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })?;
        tracing::debug!("Stored {} in {:?}", key, self.path);
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        Ok(scan_map(&self.load()?, prefix))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })?;
        tracing::debug!("Removed {} from {:?}", key, self.path);
        Ok(())
    }
}
