use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::history::HistorySnapshot;
use crate::services::equipment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum BodyFocus {
    Upper,
    Lower,
    #[default]
    FullBody,
}

impl BodyFocus {
    pub fn region(self) -> &'static str {
        match self {
            BodyFocus::Upper => "upper",
            BodyFocus::Lower => "lower",
            BodyFocus::FullBody => "full body",
        }
    }
}

impl fmt::Display for BodyFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.region())
    }
}

impl FromStr for BodyFocus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let squashed: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match squashed.as_str() {
            "upper" => Ok(BodyFocus::Upper),
            "lower" => Ok(BodyFocus::Lower),
            "fullbody" | "full" => Ok(BodyFocus::FullBody),
            _ => Err(format!("unknown body focus: {value}")),
        }
    }
}

impl TryFrom<String> for BodyFocus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validated, per-call input to workout generation.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub available_time: u32,
    pub archetype: Option<String>,
    pub equipment: BTreeSet<String>,
    pub focus: BodyFocus,
    pub exclusions: Vec<String>,
    pub goal: Option<String>,
    pub last_worked: HashMap<String, u32>,
    pub weekly_volume: HashMap<String, u32>,
    /// When absent the engine reads its own history store.
    pub history: Option<HistorySnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRequest {
    pub available_time: u32,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub equipment_access: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub body_focus: Option<BodyFocus>,
    #[serde(default)]
    pub user_prefs: Vec<String>,
    #[serde(default)]
    pub injuries: Vec<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub last_worked: HashMap<String, u32>,
    #[serde(default)]
    pub weekly_volume: HashMap<String, u32>,
}

impl WorkoutRequest {
    pub fn into_context(self) -> RequestContext {
        let equipment =
            equipment::resolve_equipment(self.equipment_access, self.location.as_deref());

        RequestContext {
            available_time: self.available_time,
            archetype: self.archetype,
            equipment,
            focus: self.body_focus.unwrap_or_default(),
            exclusions: merge_exclusions(self.user_prefs, self.injuries),
            goal: self.goal,
            last_worked: self.last_worked,
            weekly_volume: self.weekly_volume,
            history: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReshuffleRequest {
    pub current_name: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub equipment_access: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_prefs: Vec<String>,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default = "default_same_muscle")]
    pub same_muscle: bool,
}

fn default_same_muscle() -> bool {
    true
}

impl ReshuffleRequest {
    pub fn into_constraints(self) -> ReshuffleConstraints {
        ReshuffleConstraints {
            equipment: equipment::resolve_equipment(
                self.equipment_access,
                self.location.as_deref(),
            ),
            current_name: self.current_name,
            muscle_group: self.muscle_group,
            exclusions: merge_exclusions(self.user_prefs, Vec::new()),
            archetype: self.archetype.filter(|a| !a.trim().is_empty()),
            same_muscle: self.same_muscle,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReshuffleConstraints {
    pub current_name: String,
    pub muscle_group: Option<String>,
    pub equipment: BTreeSet<String>,
    pub exclusions: Vec<String>,
    pub archetype: Option<String>,
    pub same_muscle: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub exercises: Vec<LoggedExercise>,
    #[serde(default)]
    pub duration: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggedExercise {
    pub name: String,
    #[serde(default)]
    pub weights: Vec<f64>,
}

fn merge_exclusions(prefs: Vec<String>, injuries: Vec<String>) -> Vec<String> {
    prefs
        .into_iter()
        .chain(injuries)
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .collect()
}
