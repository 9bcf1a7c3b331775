use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CatalogError;
use crate::models::exercise::ExerciseRecord;

/// Read-only access to the exercise catalog shared by every request.
pub trait CatalogProvider: Send + Sync {
    fn exercises(&self) -> &[ExerciseRecord];
}

#[derive(Debug, Clone)]
pub struct Catalog {
    records: Arc<[ExerciseRecord]>,
}

impl Catalog {
    /// Drops unnamed records and keeps the first of any duplicate name.
    pub fn new(records: Vec<ExerciseRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            if record.name.is_empty() {
                tracing::warn!("catalog.unnamed_record_dropped");
                continue;
            }
            if !seen.insert(record.name.clone()) {
                tracing::warn!(name = %record.name, "catalog.duplicate_record_dropped");
                continue;
            }
            kept.push(record);
        }

        Self {
            records: kept.into(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawExerciseRecord> = serde_json::from_str(json)?;
        Ok(Self::new(raw.into_iter().map(RawExerciseRecord::normalize).collect()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            exercise_count = catalog.len(),
            "catalog.loaded"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CatalogProvider for Catalog {
    fn exercises(&self) -> &[ExerciseRecord] {
        &self.records
    }
}

/// Upstream shape. Every field tolerates absence, null, or the wrong type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExerciseRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    muscle_group: String,
    #[serde(default, deserialize_with = "lenient_text")]
    movement_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    body_region: String,
    #[serde(default, deserialize_with = "lenient_list")]
    equipment: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    archetypes: Vec<String>,
    #[serde(default, alias = "subtype", deserialize_with = "lenient_text")]
    role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    secondary_role: String,
    #[serde(default, deserialize_with = "lenient_list")]
    other_tags: Vec<String>,
}

impl RawExerciseRecord {
    fn normalize(self) -> ExerciseRecord {
        ExerciseRecord {
            name: self.name,
            muscle_group: self.muscle_group,
            movement_type: self.movement_type,
            body_region: self.body_region.to_lowercase(),
            equipment: into_set(self.equipment),
            archetypes: into_set(self.archetypes),
            role: self.role.to_lowercase(),
            secondary_role: self.secondary_role.to_lowercase(),
            other_tags: into_set(self.other_tags),
        }
    }
}

fn into_set(values: Vec<String>) -> BTreeSet<String> {
    values.into_iter().collect()
}

fn clean_token(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || token.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(token.to_string())
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => clean_token(&text).unwrap_or_default(),
        _ => String::new(),
    })
}

/// Accepts an array of strings or a comma-separated string.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text.split(',').filter_map(clean_token).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(clean_token)
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) struct RecordBuilder(ExerciseRecord);

    pub(crate) fn record(name: &str) -> RecordBuilder {
        RecordBuilder(ExerciseRecord {
            name: name.to_string(),
            muscle_group: "Chest".into(),
            movement_type: "Compound".into(),
            body_region: "upper".into(),
            equipment: BTreeSet::from(["Barbell".to_string()]),
            archetypes: BTreeSet::from(["Titan".to_string()]),
            role: "compound".into(),
            secondary_role: String::new(),
            other_tags: BTreeSet::new(),
        })
    }

    impl RecordBuilder {
        pub(crate) fn muscle(mut self, muscle: &str) -> Self {
            self.0.muscle_group = muscle.into();
            self
        }

        pub(crate) fn movement(mut self, movement: &str) -> Self {
            self.0.movement_type = movement.into();
            self
        }

        pub(crate) fn region(mut self, region: &str) -> Self {
            self.0.body_region = region.into();
            self
        }

        pub(crate) fn equipment(mut self, equipment: &[&str]) -> Self {
            self.0.equipment = equipment.iter().map(|e| e.to_string()).collect();
            self
        }

        pub(crate) fn archetypes(mut self, archetypes: &[&str]) -> Self {
            self.0.archetypes = archetypes.iter().map(|a| a.to_string()).collect();
            self
        }

        pub(crate) fn role(mut self, role: &str) -> Self {
            self.0.role = role.into();
            self
        }

        pub(crate) fn secondary_role(mut self, role: &str) -> Self {
            self.0.secondary_role = role.into();
            self
        }

        pub(crate) fn tags(mut self, tags: &[&str]) -> Self {
            self.0.other_tags = tags.iter().map(|t| t.to_string()).collect();
            self
        }

        pub(crate) fn build(self) -> ExerciseRecord {
            self.0
        }
    }
}
