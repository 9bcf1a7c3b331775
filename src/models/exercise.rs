use std::collections::BTreeSet;

/// One catalog entry. Records are built once at catalog load and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseRecord {
    pub name: String,
    pub muscle_group: String,
    pub movement_type: String,
    /// Lowercase: "upper", "lower", "full body" or "core".
    pub body_region: String,
    pub equipment: BTreeSet<String>,
    pub archetypes: BTreeSet<String>,
    /// Lowercase template role, e.g. "powercompound".
    pub role: String,
    pub secondary_role: String,
    pub other_tags: BTreeSet<String>,
}

impl ExerciseRecord {
    pub fn id(&self) -> String {
        exercise_id(&self.name)
    }

    pub fn requires_any(&self, available: &BTreeSet<String>) -> bool {
        self.equipment.iter().any(|needed| {
            available
                .iter()
                .any(|have| have.trim().eq_ignore_ascii_case(needed.trim()))
        })
    }
}

/// Log key for an exercise. Writers and readers of the weight history must both go through this.
pub fn exercise_id(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}
