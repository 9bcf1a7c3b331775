use std::collections::BTreeSet;

const GYM: &[&str] = &[
    "Barbell",
    "Dumbbell",
    "Cable",
    "Machine",
    "Kettlebell",
    "Bench",
    "Pull-Up Bar",
    "Bodyweight",
];
const HOME: &[&str] = &["Dumbbell", "Kettlebell", "Resistance Band", "Bodyweight"];
const OUTDOOR: &[&str] = &["Bodyweight", "Pull-Up Bar"];

pub fn default_equipment_for(location: &str) -> BTreeSet<String> {
    let tokens: &[&str] = match location.trim().to_lowercase().as_str() {
        "gym" => GYM,
        "home" => HOME,
        "outdoor" | "outdoors" | "park" => OUTDOOR,
        _ => &[],
    };

    tokens.iter().map(|token| token.to_string()).collect()
}

/// Explicit equipment wins; the location default only applies when none was given.
pub fn resolve_equipment(explicit: Vec<String>, location: Option<&str>) -> BTreeSet<String> {
    let explicit: BTreeSet<String> = explicit
        .into_iter()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect();

    if !explicit.is_empty() {
        return explicit;
    }

    location.map(default_equipment_for).unwrap_or_default()
}
