use std::collections::HashMap;

use crate::models::exercise::ExerciseRecord;
use crate::models::output::ExerciseOutput;
use crate::services::allocator::SlotFill;

pub fn format_workout(
    fills: &[SlotFill<'_>],
    rest_seconds: u32,
    suggestions: &HashMap<String, String>,
) -> Vec<ExerciseOutput> {
    fills
        .iter()
        .map(|fill| {
            format_exercise(
                fill.exercise,
                fill.sets,
                &fill.reps,
                rest_seconds,
                fill.alternatives.clone(),
                suggestions,
            )
        })
        .collect()
}

pub fn format_exercise(
    exercise: &ExerciseRecord,
    sets: u32,
    reps: &str,
    rest_seconds: u32,
    alternatives: Vec<String>,
    suggestions: &HashMap<String, String>,
) -> ExerciseOutput {
    ExerciseOutput {
        name: exercise.name.clone(),
        muscle_group: exercise.muscle_group.clone(),
        movement_type: exercise.movement_type.clone(),
        sets,
        reps: reps.to_string(),
        rest_seconds,
        alternatives,
        suggestion: suggestions.get(&exercise.id()).cloned(),
    }
}
