//! Default template catalog: workout types, goal schemes and the exercise
//! library.
//!
//! The catalog is read-only input data for the generator.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: prefer `get_default_catalog()` which returns a cached reference.
/// This function is retained for tests and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn exercise(name: &str, muscles: &[&str], kind: ExerciseKind) -> ExerciseTemplate {
    ExerciseTemplate {
        name: name.into(),
        muscles: strings(muscles),
        kind,
    }
}

fn category(name: &str, muscles: &[&str]) -> MuscleCategory {
    MuscleCategory {
        name: name.into(),
        muscles: strings(muscles),
    }
}

fn goal(id: &str, sets: u32, reps: &str, hold: &str, rest: &str, tempo: &str) -> Goal {
    Goal {
        id: id.into(),
        scheme: Scheme {
            sets,
            reps: reps.into(),
            hold: hold.into(),
            rest: rest.into(),
            tempo: tempo.into(),
        },
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    use ExerciseKind::*;

    // ========================================================================
    // Workout Types
    // ========================================================================

    let workout_types = vec![
        WorkoutType {
            id: "individual".into(),
            layout: WorkoutLayout::Individual {
                muscles: strings(&[
                    "biceps",
                    "triceps",
                    "chest",
                    "back",
                    "shoulders",
                    "quads",
                    "hamstrings",
                    "glutes",
                    "calves",
                    "abs",
                ]),
            },
        },
        WorkoutType {
            id: "bro_split".into(),
            layout: WorkoutLayout::Grouped {
                categories: vec![
                    category("push", &["chest", "shoulders", "triceps"]),
                    category("pull", &["back", "biceps"]),
                    category("legs", &["quads", "hamstrings", "glutes", "calves"]),
                ],
            },
        },
        WorkoutType {
            id: "bodybuilder_split".into(),
            layout: WorkoutLayout::Grouped {
                categories: vec![
                    category("chest", &["chest"]),
                    category("back", &["back"]),
                    category("shoulders", &["shoulders"]),
                    category("arms", &["biceps", "triceps"]),
                    category("legs", &["quads", "hamstrings", "glutes", "calves"]),
                ],
            },
        },
        WorkoutType {
            id: "upper_lower".into(),
            layout: WorkoutLayout::Grouped {
                categories: vec![
                    category("upper", &["chest", "back", "shoulders", "biceps", "triceps"]),
                    category("lower", &["quads", "hamstrings", "glutes", "calves", "abs"]),
                ],
            },
        },
    ];

    // ========================================================================
    // Goal Schemes
    // ========================================================================

    let goals = vec![
        goal("strength_power", 5, "3-5", "20-30", "2-3 min", "2-0-1"),
        goal("growth_hypertrophy", 4, "8-12", "30-45", "60-90s", "3-1-2"),
        goal("cardiovascular_endurance", 3, "15-20", "45-60", "30-45s", "1-0-1"),
    ];

    // ========================================================================
    // Exercise Library
    // ========================================================================

    let mut library = HashMap::new();

    library.insert(
        "biceps".to_string(),
        vec![
            exercise("Barbell Curl", &["biceps", "forearms"], Isolation),
            exercise("Hammer Curl", &["biceps", "forearms"], Isolation),
            exercise("Chin Up", &["biceps", "back"], Compound),
        ],
    );
    library.insert(
        "triceps".to_string(),
        vec![
            exercise("Close Grip Bench Press", &["triceps", "chest"], Compound),
            exercise("Tricep Extensions", &["triceps"], Isolation),
            exercise("Dips", &["triceps", "chest", "shoulders"], Bodyweight),
        ],
    );
    library.insert(
        "chest".to_string(),
        vec![
            exercise("Bench Press", &["chest", "triceps", "shoulders"], Compound),
            exercise("Incline Dumbbell Press", &["chest", "shoulders"], Compound),
            exercise("Push Ups", &["chest", "triceps", "shoulders"], Bodyweight),
            exercise("Cable Fly", &["chest"], Isolation),
        ],
    );
    library.insert(
        "back".to_string(),
        vec![
            exercise("Deadlift", &["back", "hamstrings", "glutes"], Compound),
            exercise("Pull Up", &["back", "biceps"], Compound),
            exercise("Barbell Row", &["back", "biceps"], Compound),
        ],
    );
    library.insert(
        "shoulders".to_string(),
        vec![
            exercise("Overhead Press", &["shoulders", "triceps"], Compound),
            exercise("Lateral Raises", &["shoulders"], Isolation),
            exercise("Face Pull", &["shoulders", "back"], Isolation),
        ],
    );
    library.insert(
        "quads".to_string(),
        vec![
            exercise("Squat", &["quads", "glutes", "hamstrings"], Compound),
            exercise("Lunges", &["quads", "glutes"], Compound),
            exercise("Leg Extension", &["quads"], Isolation),
        ],
    );
    library.insert(
        "hamstrings".to_string(),
        vec![
            exercise("Romanian Deadlift", &["hamstrings", "glutes", "back"], Compound),
            exercise("Leg Curls", &["hamstrings"], Isolation),
        ],
    );
    library.insert(
        "glutes".to_string(),
        vec![
            exercise("Hip Thrust", &["glutes", "hamstrings"], Compound),
            exercise("Glute Bridge", &["glutes"], Bodyweight),
        ],
    );
    library.insert(
        "calves".to_string(),
        vec![
            exercise("Calf Raises", &["calves"], Isolation),
            exercise("Seated Calf Raise", &["calves"], Isolation),
        ],
    );
    library.insert(
        "abs".to_string(),
        vec![
            exercise("Plank", &["abs", "shoulders"], Isometric),
            exercise("Hanging Leg Raise", &["abs"], Bodyweight),
            exercise("Cable Crunch", &["abs"], Isolation),
        ],
    );

    Catalog {
        workout_types,
        goals,
        library,
    }
}

impl Catalog {
    /// Look up a workout type by id
    pub fn workout_type(&self, id: &str) -> Result<&WorkoutType> {
        self.workout_types
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::UnknownTemplateKey(format!("workout type '{}'", id)))
    }

    /// Look up a goal scheme by id
    pub fn scheme(&self, goal: &str) -> Result<&Scheme> {
        self.goals
            .iter()
            .find(|g| g.id == goal)
            .map(|g| &g.scheme)
            .ok_or_else(|| Error::UnknownTemplateKey(format!("goal '{}'", goal)))
    }

    /// Exercise templates listed under a muscle group (empty if none)
    pub fn exercises_for(&self, muscle: &str) -> &[ExerciseTemplate] {
        self.library.get(muscle).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every template in the library, ordered by the individual muscle list
    /// and then by any remaining library keys in sorted order
    pub fn all_exercises(&self) -> Vec<&ExerciseTemplate> {
        let mut order: Vec<&str> = self
            .workout_types
            .iter()
            .find_map(|t| match &t.layout {
                WorkoutLayout::Individual { muscles } => {
                    Some(muscles.iter().map(String::as_str).collect())
                }
                WorkoutLayout::Grouped { .. } => None,
            })
            .unwrap_or_default();

        let mut extra: Vec<&str> = self
            .library
            .keys()
            .map(String::as_str)
            .filter(|k| !order.contains(k))
            .collect();
        extra.sort_unstable();
        order.extend(extra);

        order
            .into_iter()
            .flat_map(|m| self.exercises_for(m))
            .collect()
    }

    /// Find a template by case-insensitive name
    pub fn find_exercise(&self, name: &str) -> Option<&ExerciseTemplate> {
        self.all_exercises()
            .into_iter()
            .find(|e| e.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen_types = HashSet::new();
        for workout_type in &self.workout_types {
            if workout_type.id.is_empty() {
                errors.push("Workout type has empty ID".to_string());
            }
            if !seen_types.insert(workout_type.id.as_str()) {
                errors.push(format!("Duplicate workout type '{}'", workout_type.id));
            }

            let muscles: Vec<&String> = match &workout_type.layout {
                WorkoutLayout::Individual { muscles } => muscles.iter().collect(),
                WorkoutLayout::Grouped { categories } => {
                    if categories.is_empty() {
                        errors.push(format!("Workout type '{}' has no categories", workout_type.id));
                    }
                    for c in categories {
                        if c.muscles.is_empty() {
                            errors.push(format!(
                                "Category '{}' of '{}' has no muscle groups",
                                c.name, workout_type.id
                            ));
                        }
                    }
                    categories.iter().flat_map(|c| c.muscles.iter()).collect()
                }
            };

            // Every offered muscle must resolve to at least one exercise
            for muscle in muscles {
                if self.exercises_for(muscle).is_empty() {
                    errors.push(format!(
                        "Workout type '{}' offers '{}' which has no exercises",
                        workout_type.id, muscle
                    ));
                }
            }
        }

        if !self.workout_types.iter().any(WorkoutType::is_individual) {
            errors.push("Catalog has no individual workout type".to_string());
        }

        let mut seen_goals = HashSet::new();
        for g in &self.goals {
            if !seen_goals.insert(g.id.as_str()) {
                errors.push(format!("Duplicate goal '{}'", g.id));
            }
            if g.scheme.sets == 0 {
                errors.push(format!("Goal '{}' prescribes zero sets", g.id));
            }
            if g.scheme.reps.is_empty() || g.scheme.rest.is_empty() || g.scheme.tempo.is_empty() {
                errors.push(format!("Goal '{}' has an empty parameter", g.id));
            }
        }

        let mut seen_names = HashSet::new();
        for (muscle, templates) in &self.library {
            for t in templates {
                if t.name.is_empty() {
                    errors.push(format!("Exercise under '{}' has empty name", muscle));
                }
                if t.muscles.is_empty() {
                    errors.push(format!("Exercise '{}' lists no muscles", t.name));
                }
                if !seen_names.insert(t.name.as_str()) {
                    errors.push(format!("Exercise '{}' is listed more than once", t.name));
                }
            }
        }

        errors
    }
}

// ============================================================================
// Exercise Explanations
// ============================================================================

const FALLBACK_EXPLANATION: &str = "Builds general strength and fitness. Move with control \
     through the full range and stop the set when form breaks down.";

static EXPLANATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "deadlift",
            "Trains the whole posterior chain: glutes, hamstrings and spinal erectors. \
             A staple for raw pulling strength.",
        ),
        (
            "squat",
            "Loads the quads, glutes and trunk through a deep knee and hip bend. \
             Carries over to almost every lower-body movement.",
        ),
        (
            "bench_press",
            "The main horizontal press for chest, front delts and triceps.",
        ),
        (
            "pull_up",
            "Vertical pull for the lats and biceps that also demands a braced core.",
        ),
        (
            "overhead_press",
            "Standing press that builds the shoulders and triceps and tests \
             trunk stability.",
        ),
        (
            "barbell_row",
            "Horizontal pull for the mid back, rear delts and biceps. \
             Balances heavy pressing.",
        ),
        (
            "dips",
            "Bodyweight press emphasising the triceps and lower chest.",
        ),
        (
            "lunges",
            "Single-leg work for quads and glutes that exposes left/right imbalances.",
        ),
        (
            "plank",
            "Isometric hold for the abdominals and shoulders. Keep hips level and \
             breathe steadily.",
        ),
        (
            "burpee",
            "Full-body conditioning drill mixing a squat thrust with a jump.",
        ),
    ])
});

/// Explanation paragraph for an exercise, matched on the lower-cased name
/// with spaces replaced by underscores
pub fn explanation(exercise_name: &str) -> &'static str {
    let key = exercise_name.trim().to_lowercase().replace(' ', "_");
    EXPLANATIONS
        .get(key.as_str())
        .copied()
        .unwrap_or(FALLBACK_EXPLANATION)
}
