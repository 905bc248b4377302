//! User-defined workouts.
//!
//! Custom workouts are assembled from catalog exercises with a fixed default
//! prescription and saved under the `customWorkouts` key.

use crate::clock::Clock;
use crate::generator::describe;
use crate::orchestrator::WorkoutOrchestrator;
use crate::store::{decode_records, load_records, store_records, Store, CUSTOM_WORKOUTS_KEY};
use crate::types::{Catalog, CustomWorkout, ExerciseTemplate, GeneratedExercise};
use crate::{Error, Result};
use serde_json::Value;

pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REPS: &str = "8-12";
pub const DEFAULT_REST: &str = "60-90s";
pub const DEFAULT_TEMPO: &str = "2-1-2";

/// Exercises whose name or any muscle contains `term`, case-insensitively
///
/// A blank term matches everything.
pub fn search_exercises<'a>(catalog: &'a Catalog, term: &str) -> Vec<&'a ExerciseTemplate> {
    let needle = term.trim().to_lowercase();
    catalog
        .all_exercises()
        .into_iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&needle)
                || e.muscles.iter().any(|m| m.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Parameterize a template with the custom-workout defaults
pub fn with_defaults(template: &ExerciseTemplate, index: usize) -> GeneratedExercise {
    GeneratedExercise {
        index,
        name: template.name.clone(),
        muscles: template.muscles.clone(),
        kind: template.kind,
        sets: DEFAULT_SETS,
        reps: DEFAULT_REPS.to_string(),
        unit: template.kind.unit().to_string(),
        rest: DEFAULT_REST.to_string(),
        tempo: DEFAULT_TEMPO.to_string(),
        description: describe(template),
    }
}

/// Resolve exercise names against the catalog and apply the defaults
pub fn build_exercises(catalog: &Catalog, names: &[String]) -> Result<Vec<GeneratedExercise>> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            catalog
                .find_exercise(name)
                .map(|t| with_defaults(t, i))
                .ok_or_else(|| Error::UnknownTemplateKey(name.clone()))
        })
        .collect()
}

/// All saved custom workouts in save order
///
/// Records that fail to decode are skipped here but stay in the store.
/// A missing unit is filled in from the exercise kind.
pub fn list_custom_workouts<S: Store + ?Sized>(store: &S) -> Result<Vec<CustomWorkout>> {
    let records = load_records(store, CUSTOM_WORKOUTS_KEY)?;
    let mut workouts: Vec<CustomWorkout> = decode_records(CUSTOM_WORKOUTS_KEY, &records);
    for exercise in workouts.iter_mut().flat_map(|w| w.exercises.iter_mut()) {
        if exercise.unit.is_empty() {
            exercise.unit = exercise.kind.unit().to_string();
        }
    }
    Ok(workouts)
}

pub fn find_custom_workout<S: Store + ?Sized>(store: &S, id: i64) -> Result<Option<CustomWorkout>> {
    Ok(list_custom_workouts(store)?.into_iter().find(|w| w.id == id))
}

fn record_id(record: &Value) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

/// Save a new custom workout; its id is the creation time in milliseconds
pub fn save_custom_workout<S, C>(
    store: &mut S,
    clock: &C,
    name: &str,
    exercises: Vec<GeneratedExercise>,
) -> Result<CustomWorkout>
where
    S: Store + ?Sized,
    C: Clock + ?Sized,
{
    if name.trim().is_empty() {
        return Err(Error::InvalidSelection("workout name must not be blank".into()));
    }
    if exercises.is_empty() {
        return Err(Error::InvalidSelection("add at least one exercise".into()));
    }

    let mut records = load_records(&*store, CUSTOM_WORKOUTS_KEY)?;
    let now = clock.now();
    let mut id = now.timestamp_millis();
    // Ids stay unique within the list
    while records.iter().any(|r| record_id(r) == Some(id)) {
        id += 1;
    }

    let workout = CustomWorkout {
        id,
        name: name.to_string(),
        exercises,
        created_at: now,
    };
    records.push(serde_json::to_value(&workout)?);
    store_records(store, CUSTOM_WORKOUTS_KEY, &records)?;

    tracing::info!("Saved custom workout '{}' ({})", workout.name, workout.id);
    Ok(workout)
}

/// Delete by id. Returns false when no workout had that id.
pub fn delete_custom_workout<S: Store + ?Sized>(store: &mut S, id: i64) -> Result<bool> {
    let mut records = load_records(&*store, CUSTOM_WORKOUTS_KEY)?;
    let before = records.len();
    records.retain(|r| record_id(r) != Some(id));
    if records.len() == before {
        return Ok(false);
    }

    store_records(store, CUSTOM_WORKOUTS_KEY, &records)?;
    tracing::info!("Deleted custom workout {}", id);
    Ok(true)
}

/// Start a saved custom workout under a fresh workout id
pub fn start_custom_workout<S: Store + ?Sized>(
    store: &mut S,
    id: i64,
    rest_seconds: u32,
) -> Result<WorkoutOrchestrator> {
    let workout = find_custom_workout(&*store, id)?
        .ok_or_else(|| Error::InvalidSelection(format!("no custom workout with id {}", id)))?;
    WorkoutOrchestrator::begin(store, workout.exercises, rest_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::clock::ManualClock;
    use crate::history::load_history;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
    }

    fn names(found: &[&ExerciseTemplate]) -> Vec<String> {
        found.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_search_by_name_and_muscle() {
        let catalog = get_default_catalog();

        let curls = names(&search_exercises(catalog, "CURL"));
        assert!(curls.contains(&"Barbell Curl".to_string()));
        assert!(curls.contains(&"Leg Curls".to_string()));

        let calves = names(&search_exercises(catalog, "calv"));
        assert_eq!(calves, vec!["Calf Raises", "Seated Calf Raise"]);

        assert!(search_exercises(catalog, "zzz").is_empty());
        assert_eq!(
            search_exercises(catalog, "  ").len(),
            catalog.all_exercises().len()
        );
    }

    #[test]
    fn test_defaults_applied() {
        let catalog = get_default_catalog();
        let plank = catalog.find_exercise("plank").unwrap();
        let e = with_defaults(plank, 4);

        assert_eq!(e.index, 4);
        assert_eq!(e.sets, 3);
        assert_eq!(e.reps, "8-12");
        assert_eq!(e.rest, "60-90s");
        assert_eq!(e.tempo, "2-1-2");
        assert_eq!(e.unit, "seconds");
        assert!(e.description.starts_with("Perform Plank"));
    }

    #[test]
    fn test_build_rejects_unknown_names() {
        let catalog = get_default_catalog();
        let err = build_exercises(catalog, &["Squat".into(), "Moon Walk".into()]).unwrap_err();
        assert!(matches!(err, Error::UnknownTemplateKey(name) if name == "Moon Walk"));
    }

    #[test]
    fn test_save_list_delete() {
        let catalog = get_default_catalog();
        let mut store = MemoryStore::new();
        let clock = clock();

        let exercises = build_exercises(catalog, &["Squat".into(), "Bench Press".into()]).unwrap();
        let first = save_custom_workout(&mut store, &clock, "Full Body", exercises.clone()).unwrap();
        let second = save_custom_workout(&mut store, &clock, "Again", exercises).unwrap();

        assert_eq!(first.id, clock.now().timestamp_millis());
        assert_ne!(first.id, second.id);

        let listed = list_custom_workouts(&store).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Full Body");

        assert!(delete_custom_workout(&mut store, first.id).unwrap());
        assert!(!delete_custom_workout(&mut store, first.id).unwrap());
        assert_eq!(list_custom_workouts(&store).unwrap(), vec![second]);
    }

    #[test]
    fn test_save_validation() {
        let catalog = get_default_catalog();
        let mut store = MemoryStore::new();
        let clock = clock();
        let exercises = build_exercises(catalog, &["Squat".into()]).unwrap();

        assert!(matches!(
            save_custom_workout(&mut store, &clock, "   ", exercises),
            Err(Error::InvalidSelection(_))
        ));
        assert!(matches!(
            save_custom_workout(&mut store, &clock, "Empty", Vec::new()),
            Err(Error::InvalidSelection(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_wire_format_field_names() {
        let catalog = get_default_catalog();
        let mut store = MemoryStore::new();
        let exercises = build_exercises(catalog, &["Squat".into()]).unwrap();
        save_custom_workout(&mut store, &clock(), "Legs", exercises).unwrap();

        let raw = store.get(CUSTOM_WORKOUTS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"type\":\"compound\""));
    }

    #[test]
    fn test_start_custom_workout_skips_history() {
        let catalog = get_default_catalog();
        let mut store = MemoryStore::new();
        let exercises = build_exercises(catalog, &["Squat".into(), "Plank".into()]).unwrap();
        let saved = save_custom_workout(&mut store, &clock(), "Legs", exercises).unwrap();

        let o = start_custom_workout(&mut store, saved.id, 90).unwrap();
        assert_eq!(o.exercises().len(), 2);
        assert!(load_history(&store).unwrap().is_empty());

        let again = start_custom_workout(&mut store, saved.id, 90).unwrap();
        assert_ne!(o.workout_id(), again.workout_id());

        assert!(start_custom_workout(&mut store, 1, 90).is_err());
    }

    #[test]
    fn test_record_without_unit_or_description_loads() {
        let catalog = get_default_catalog();
        let mut store = MemoryStore::new();
        let older = r#"[{"id":1,"name":"Old Core","createdAt":"2026-01-01T00:00:00Z",
            "exercises":[{"name":"Plank","muscles":["core"],"type":"isometric",
                "sets":3,"reps":"8-12","rest":"60-90s","tempo":"2-1-2"}]}]"#;
        store.set(CUSTOM_WORKOUTS_KEY, older).unwrap();

        let listed = list_custom_workouts(&store).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].exercises[0].unit, "seconds");
        assert_eq!(listed[0].exercises[0].description, "");

        let exercises = build_exercises(catalog, &["Squat".into()]).unwrap();
        save_custom_workout(&mut store, &clock(), "Legs", exercises).unwrap();
        let listed = list_custom_workouts(&store).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Old Core");

        let o = start_custom_workout(&mut store, 1, 90).unwrap();
        assert_eq!(o.exercises()[0].unit, "seconds");
    }

    #[test]
    fn test_undecodable_record_survives_save_and_delete() {
        let catalog = get_default_catalog();
        let mut store = MemoryStore::new();
        store
            .set(CUSTOM_WORKOUTS_KEY, r#"[{"id":7,"name":"Broken","exercises":"none"}]"#)
            .unwrap();
        assert!(list_custom_workouts(&store).unwrap().is_empty());

        let exercises = build_exercises(catalog, &["Squat".into()]).unwrap();
        let saved = save_custom_workout(&mut store, &clock(), "Legs", exercises).unwrap();
        assert!(delete_custom_workout(&mut store, saved.id).unwrap());

        let raw: Vec<Value> =
            serde_json::from_str(&store.get(CUSTOM_WORKOUTS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0]["name"], "Broken");

        // It can still be deleted by id
        assert!(delete_custom_workout(&mut store, 7).unwrap());
        assert!(list_custom_workouts(&store).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_custom_workouts_is_empty() {
        let mut store = MemoryStore::new();
        store.set(CUSTOM_WORKOUTS_KEY, "not json").unwrap();
        assert!(list_custom_workouts(&store).unwrap().is_empty());
    }
}
