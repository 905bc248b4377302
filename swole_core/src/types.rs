//! Core domain types for the Swole workout system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise templates and the catalog that holds them
//! - Goal schemes and generated (parameterized) exercises
//! - Logged sets and workout history entries
//! - Custom and active workouts as persisted in the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Exercise Templates
// ============================================================================

/// Movement classification of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Compound,
    Isolation,
    Bodyweight,
    Isometric,
}

impl ExerciseKind {
    /// Label shown next to the rep prescription
    pub fn unit(&self) -> &'static str {
        match self {
            ExerciseKind::Isometric => "seconds",
            _ => "reps",
        }
    }
}

/// An exercise definition from the catalog (e.g., "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTemplate {
    pub name: String,
    pub muscles: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
}

// ============================================================================
// Goal Schemes and Workout Types
// ============================================================================

/// Parameter bundle applied uniformly to every exercise of a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Scheme {
    pub sets: u32,
    /// Rep range for counted movements, e.g. "3-5"
    pub reps: String,
    /// Hold range in seconds for isometric movements, e.g. "20-30"
    pub hold: String,
    pub rest: String,
    pub tempo: String,
}

/// A named goal and its scheme
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub scheme: Scheme,
}

/// A named group of muscle groups (e.g. "push" → chest, shoulders, triceps)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MuscleCategory {
    pub name: String,
    pub muscles: Vec<String>,
}

/// How a workout type offers its muscle choices
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WorkoutLayout {
    /// Flat list of muscle groups; up to three may be selected
    Individual { muscles: Vec<String> },
    /// Nested categories; exactly one category is selected
    Grouped { categories: Vec<MuscleCategory> },
}

/// A workout type definition (e.g., "bro_split")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutType {
    pub id: String,
    pub layout: WorkoutLayout,
}

impl WorkoutType {
    pub fn is_individual(&self) -> bool {
        matches!(self.layout, WorkoutLayout::Individual { .. })
    }

    /// Selectable options in definition order: muscle groups for the
    /// individual layout, category names for grouped layouts
    pub fn options(&self) -> Vec<&str> {
        match &self.layout {
            WorkoutLayout::Individual { muscles } => muscles.iter().map(String::as_str).collect(),
            WorkoutLayout::Grouped { categories } => {
                categories.iter().map(|c| c.name.as_str()).collect()
            }
        }
    }

    pub fn offers(&self, option: &str) -> bool {
        self.options().contains(&option)
    }
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete template catalog: workout types, goals and exercise library
#[derive(Clone, Debug)]
pub struct Catalog {
    pub workout_types: Vec<WorkoutType>,
    pub goals: Vec<Goal>,
    /// Exercise templates keyed by muscle group, in definition order
    pub library: HashMap<String, Vec<ExerciseTemplate>>,
}

// ============================================================================
// Generated Workouts
// ============================================================================

/// An exercise template enriched with goal parameters and its position
/// in the generated workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedExercise {
    #[serde(default)]
    pub index: usize,
    pub name: String,
    pub muscles: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    pub sets: u32,
    pub reps: String,
    /// Empty when the stored record had none; see [`GeneratedExercise::unit`]
    #[serde(default)]
    pub unit: String,
    pub rest: String,
    pub tempo: String,
    #[serde(default)]
    pub description: String,
}

impl GeneratedExercise {
    /// The prescription unit, falling back to the one implied by the kind
    pub fn unit(&self) -> &str {
        if self.unit.is_empty() {
            self.kind.unit()
        } else {
            &self.unit
        }
    }
}

/// Selection handed to the generator
#[derive(Clone, Debug)]
pub struct WorkoutRequest {
    pub workout_type: String,
    pub muscles: Vec<String>,
    pub goal: String,
}

// ============================================================================
// Session Records
// ============================================================================

/// One logged set of one exercise
///
/// `rpe` of 0 means the set was logged without a perceived exertion score.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedSet {
    #[serde(rename = "set")]
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub rpe: u8,
    pub timestamp: Option<DateTime<Utc>>,
}

impl LoggedSet {
    pub fn volume(&self) -> f64 {
        self.weight * self.reps as f64
    }

    pub fn rpe(&self) -> Option<u8> {
        (self.rpe > 0).then_some(self.rpe)
    }
}

/// Values entered for a set; absent fields are recorded as 0
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SetEntry {
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub rpe: Option<u8>,
}

impl SetEntry {
    pub fn new(weight: f64, reps: u32, rpe: u8) -> Self {
        Self {
            weight: Some(weight),
            reps: Some(reps),
            rpe: Some(rpe),
        }
    }
}

/// Summary written to the history list when a workout is generated
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutHistoryEntry {
    pub workout_type: String,
    pub muscle_group: String,
    pub objective: String,
    pub exercises: Vec<String>,
    pub date: DateTime<Utc>,
}

/// A user-defined workout saved for reuse
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomWorkout {
    pub id: i64,
    pub name: String,
    pub exercises: Vec<GeneratedExercise>,
    pub created_at: DateTime<Utc>,
}

/// The workout currently being performed, persisted so that sessions can
/// be resumed across process invocations
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkout {
    pub workout_id: String,
    pub exercises: Vec<GeneratedExercise>,
}
