#![forbid(unsafe_code)]

//! Core domain model and business logic for the Swole workout system.
//!
//! This crate provides:
//! - Domain types (exercise templates, generated exercises, logged sets)
//! - The template catalog and workout generation
//! - Per-exercise session tracking with rest timers
//! - Workout orchestration, history and custom workouts
//! - Persistence behind a key-value `Store`, analytics and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod selection;
pub mod generator;
pub mod store;
pub mod setlog;
pub mod clock;
pub mod timer;
pub mod session;
pub mod orchestrator;
pub mod history;
pub mod custom;
pub mod analytics;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, explanation, get_default_catalog};
pub use config::Config;
pub use selection::{MuscleSelection, ToggleOutcome};
pub use generator::generate;
pub use store::{FileStore, MemoryStore, Store};
pub use clock::{Clock, ManualClock, SystemClock};
pub use timer::{LogNotifier, ManualScheduler, Notifier, RestTimer, Scheduler, TaskHandle};
pub use session::{SessionPhase, SessionTracker};
pub use orchestrator::{WorkoutEvent, WorkoutOrchestrator};
pub use history::{clear_history, history_len, load_history};
pub use analytics::{compute_snapshot, AnalyticsSnapshot};
pub use export::export_sets_csv;
