use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOutput {
    pub name: String,
    pub muscle_group: String,
    pub movement_type: String,
    pub sets: u32,
    pub reps: String,
    #[serde(rename = "rest")]
    pub rest_seconds: u32,
    pub alternatives: Vec<String>,
    pub suggestion: Option<String>,
}
