use std::collections::HashMap;

use crate::history::HistorySnapshot;

/// Consecutive identical sessions that count as a plateau.
pub const PLATEAU_STREAK: usize = 3;

pub const PLATEAU_SUGGESTION: &str = "You've used the same weight 3 sessions in a row. Try increasing slightly if it feels too easy.";

/// Exercise id -> suggestion, for every exercise whose last `PLATEAU_STREAK`
/// sessions recorded exactly the same weights.
pub fn compute_suggestions(history: &HistorySnapshot) -> HashMap<String, String> {
    history
        .iter()
        .filter(|(_, sessions)| sessions.len() >= PLATEAU_STREAK)
        .filter(|(_, sessions)| {
            let recent = &sessions[sessions.len() - PLATEAU_STREAK..];
            recent
                .iter()
                .all(|session| session.weights == recent[0].weights)
        })
        .map(|(exercise_id, _)| (exercise_id.clone(), PLATEAU_SUGGESTION.to_string()))
        .collect()
}
