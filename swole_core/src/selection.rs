//! Muscle selection rules applied before a workout is generated.
//!
//! Individual workouts accumulate up to three muscle groups by toggling;
//! grouped workouts hold exactly one category and every pick replaces it.

use crate::types::{Catalog, WorkoutRequest};
use crate::{Error, Result};

/// Maximum number of muscle groups in an individual workout
pub const MAX_INDIVIDUAL_MUSCLES: usize = 3;

/// Result of a toggle request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Grouped mode: the previous pick was swapped for the new one
    Replaced,
    /// The selection is full and was left unchanged
    Rejected,
}

/// Mutable selection state for one (workout type, goal) choice
#[derive(Clone, Debug)]
pub struct MuscleSelection {
    workout_type: String,
    individual: bool,
    muscles: Vec<String>,
}

impl MuscleSelection {
    /// Start an empty selection for a workout type
    pub fn new(catalog: &Catalog, workout_type: &str) -> Result<Self> {
        let def = catalog.workout_type(workout_type)?;
        Ok(Self {
            workout_type: def.id.clone(),
            individual: def.is_individual(),
            muscles: Vec::new(),
        })
    }

    pub fn workout_type(&self) -> &str {
        &self.workout_type
    }

    pub fn muscles(&self) -> &[String] {
        &self.muscles
    }

    pub fn is_empty(&self) -> bool {
        self.muscles.is_empty()
    }

    /// Switch workout type; any previous picks are cleared
    pub fn set_workout_type(&mut self, catalog: &Catalog, workout_type: &str) -> Result<()> {
        *self = Self::new(catalog, workout_type)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.muscles.clear();
    }

    /// Toggle a muscle group (individual) or pick a category (grouped)
    ///
    /// In individual mode a full selection rejects every toggle, including
    /// removal of an already-selected muscle; `clear` or a type change is
    /// the way out.
    pub fn toggle(&mut self, catalog: &Catalog, muscle: &str) -> Result<ToggleOutcome> {
        let def = catalog.workout_type(&self.workout_type)?;
        if !def.offers(muscle) {
            return Err(Error::InvalidSelection(format!(
                "'{}' is not offered by workout type '{}'",
                muscle, self.workout_type
            )));
        }

        if !self.individual {
            self.muscles = vec![muscle.to_string()];
            tracing::debug!("Selected category {} for {}", muscle, self.workout_type);
            return Ok(ToggleOutcome::Replaced);
        }

        if self.muscles.len() > MAX_INDIVIDUAL_MUSCLES - 1 {
            tracing::debug!("Selection full, ignoring toggle of {}", muscle);
            return Ok(ToggleOutcome::Rejected);
        }

        if let Some(pos) = self.muscles.iter().position(|m| m == muscle) {
            self.muscles.remove(pos);
            return Ok(ToggleOutcome::Removed);
        }

        // Never reached while the check above holds; kept as the second cap
        if self.muscles.len() >= MAX_INDIVIDUAL_MUSCLES + 1 {
            return Ok(ToggleOutcome::Rejected);
        }

        self.muscles.push(muscle.to_string());
        Ok(ToggleOutcome::Added)
    }

    /// Freeze the selection into a generator request
    pub fn into_request(self, goal: &str) -> Result<WorkoutRequest> {
        if self.muscles.is_empty() {
            return Err(Error::InvalidSelection("no muscle groups selected".into()));
        }
        Ok(WorkoutRequest {
            workout_type: self.workout_type,
            muscles: self.muscles,
            goal: goal.to_string(),
        })
    }
}
