use std::collections::BTreeSet;

use crate::models::exercise::ExerciseRecord;
use crate::models::request::BodyFocus;

/// Archetype tag on a record that makes it valid for every archetype.
pub const WILDCARD_ARCHETYPE: &str = "*";

const CORE_ROLES: &[&str] = &["core"];

/// How a slot's role tag is matched against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleMatcher {
    /// Primary role, secondary role, or any auxiliary tag.
    #[default]
    Tolerant,
    PrimaryOnly,
}

impl RoleMatcher {
    pub fn matches(self, exercise: &ExerciseRecord, role_tag: &str) -> bool {
        let wanted = normalize_tag(role_tag);
        if wanted.is_empty() {
            return false;
        }

        let primary = normalize_tag(&exercise.role) == wanted;
        match self {
            RoleMatcher::PrimaryOnly => primary,
            RoleMatcher::Tolerant => {
                primary
                    || normalize_tag(&exercise.secondary_role) == wanted
                    || exercise
                        .other_tags
                        .iter()
                        .any(|tag| normalize_tag(tag) == wanted)
            }
        }
    }
}

/// Lowercases and drops whitespace, hyphens and underscores: "Warm-Up" == "warm up" == "warmup".
pub fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn is_core_role(tag: &str) -> bool {
    let tag = normalize_tag(tag);
    CORE_ROLES.contains(&tag.as_str())
}

/// A single query against the catalog. `None` fields are not filtered on.
#[derive(Debug, Clone)]
pub struct Constraints<'a> {
    pub archetype: Option<&'a str>,
    pub equipment: &'a BTreeSet<String>,
    pub focus: Option<BodyFocus>,
    pub exclusions: &'a [String],
    pub role: Option<&'a str>,
    pub role_matcher: RoleMatcher,
}

impl<'a> Constraints<'a> {
    pub fn new(equipment: &'a BTreeSet<String>, exclusions: &'a [String]) -> Self {
        Self {
            archetype: None,
            equipment,
            focus: None,
            exclusions,
            role: None,
            role_matcher: RoleMatcher::default(),
        }
    }

    pub fn archetype(mut self, archetype: &'a str) -> Self {
        self.archetype = Some(archetype);
        self
    }

    pub fn focus(mut self, focus: BodyFocus) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn role(mut self, role: &'a str, matcher: RoleMatcher) -> Self {
        self.role = Some(role);
        self.role_matcher = matcher;
        self
    }

    pub fn without_focus(&self) -> Self {
        Self {
            focus: None,
            ..self.clone()
        }
    }

    pub fn without_role(&self) -> Self {
        Self {
            role: None,
            ..self.clone()
        }
    }

    pub fn matches(&self, exercise: &ExerciseRecord) -> bool {
        self.archetype_matches(exercise)
            && exercise.requires_any(self.equipment)
            && self.focus_matches(exercise)
            && !self.is_excluded(exercise)
            && self.role_matches(exercise)
    }

    fn archetype_matches(&self, exercise: &ExerciseRecord) -> bool {
        match self.archetype {
            None => true,
            Some(archetype) => {
                exercise.archetypes.contains(archetype)
                    || exercise.archetypes.contains(WILDCARD_ARCHETYPE)
            }
        }
    }

    /// Core slots ignore the requested focus and want a core-region exercise instead.
    fn focus_matches(&self, exercise: &ExerciseRecord) -> bool {
        let Some(focus) = self.focus else {
            return true;
        };
        if focus == BodyFocus::FullBody {
            return true;
        }

        let region = exercise.body_region.as_str();
        if self.role.is_some_and(is_core_role) {
            return region == "core";
        }
        region == focus.region()
    }

    fn is_excluded(&self, exercise: &ExerciseRecord) -> bool {
        let name = exercise.name.to_lowercase();
        self.exclusions
            .iter()
            .map(|term| term.trim().to_lowercase())
            .any(|term| !term.is_empty() && name.contains(&term))
    }

    fn role_matches(&self, exercise: &ExerciseRecord) -> bool {
        match self.role {
            None => true,
            Some(role) => self.role_matcher.matches(exercise, role),
        }
    }
}

pub fn filter<'c>(pool: &'c [ExerciseRecord], constraints: &Constraints<'_>) -> Vec<&'c ExerciseRecord> {
    pool.iter()
        .filter(|exercise| constraints.matches(exercise))
        .collect()
}
