use crate::services::constraint_filter::normalize_tag;

const GOAL_REST_SECONDS: &[(&str, u32)] = &[
    ("strength", 120),
    ("hypertrophy", 90),
    ("endurance", 45),
    ("fatloss", 45),
];

/// Goal table first, then the archetype's own rest, then the configured default.
pub fn rest_seconds(goal: Option<&str>, archetype_rest: Option<u32>, default: u32) -> u32 {
    goal.map(normalize_tag)
        .and_then(|goal| {
            GOAL_REST_SECONDS
                .iter()
                .find(|(name, _)| *name == goal)
                .map(|(_, seconds)| *seconds)
        })
        .or(archetype_rest)
        .unwrap_or(default)
}
