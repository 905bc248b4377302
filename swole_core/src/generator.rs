//! Workout generator.
//!
//! Maps a (workout type, muscle selection, goal) triple onto an ordered
//! list of parameterized exercises. Pure: the same request against the same
//! catalog always yields the same list.

use crate::types::*;
use crate::{Error, Result};

/// Generate the exercise list for a request
///
/// Exercises are emitted in selection order, and within each muscle group
/// in catalog-definition order. An exercise reachable through two selected
/// groups appears twice.
pub fn generate(catalog: &Catalog, request: &WorkoutRequest) -> Result<Vec<GeneratedExercise>> {
    let workout_type = catalog.workout_type(&request.workout_type)?;
    let scheme = catalog.scheme(&request.goal)?;

    if request.muscles.is_empty() {
        return Err(Error::InvalidSelection("no muscle groups selected".into()));
    }

    let mut templates: Vec<&ExerciseTemplate> = Vec::new();
    for selected in &request.muscles {
        match &workout_type.layout {
            WorkoutLayout::Individual { muscles } => {
                if !muscles.contains(selected) {
                    return Err(Error::InvalidSelection(format!(
                        "'{}' is not offered by workout type '{}'",
                        selected, workout_type.id
                    )));
                }
                templates.extend(catalog.exercises_for(selected));
            }
            WorkoutLayout::Grouped { categories } => {
                let category = categories
                    .iter()
                    .find(|c| &c.name == selected)
                    .ok_or_else(|| {
                        Error::InvalidSelection(format!(
                            "'{}' is not a category of workout type '{}'",
                            selected, workout_type.id
                        ))
                    })?;
                for muscle in &category.muscles {
                    templates.extend(catalog.exercises_for(muscle));
                }
            }
        }
    }

    let exercises: Vec<GeneratedExercise> = templates
        .into_iter()
        .enumerate()
        .map(|(index, template)| parameterize(template, scheme, index))
        .collect();

    tracing::info!(
        "Generated {} exercises for {} [{}] / {}",
        exercises.len(),
        workout_type.id,
        request.muscles.join(", "),
        request.goal
    );

    Ok(exercises)
}

/// Apply a goal scheme to a template at a given workout position
pub fn parameterize(template: &ExerciseTemplate, scheme: &Scheme, index: usize) -> GeneratedExercise {
    let reps = match template.kind {
        ExerciseKind::Isometric => scheme.hold.clone(),
        _ => scheme.reps.clone(),
    };

    GeneratedExercise {
        index,
        name: template.name.clone(),
        muscles: template.muscles.clone(),
        kind: template.kind,
        sets: scheme.sets,
        reps,
        unit: template.kind.unit().to_string(),
        rest: scheme.rest.clone(),
        tempo: scheme.tempo.clone(),
        description: describe(template),
    }
}

/// Instruction sentence naming the worked muscles
pub fn describe(template: &ExerciseTemplate) -> String {
    let muscles = template
        .muscles
        .iter()
        .map(|m| m.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Perform {} with proper form focusing on the {}.",
        template.name, muscles
    )
}
