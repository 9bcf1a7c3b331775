use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::error::{EngineError, ErrorKind};
use crate::models::exercise::exercise_id;
use crate::models::output::ExerciseOutput;
use crate::models::request::{ReshuffleRequest, WorkoutLog, WorkoutRequest};
use crate::services::workout_engine::WorkoutEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: WorkoutEngine,
}

pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Validation | ErrorKind::Configuration => StatusCode::BAD_REQUEST,
            ErrorKind::EmptyResult => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Workout generator is running" }))
        .route("/generate-workout", post(generate_workout))
        .route("/reshuffle-exercise", post(reshuffle_exercise))
        .route("/log-workout", post(log_workout))
        .route("/suggestions", get(suggestions))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn generate_workout(
    State(state): State<AppState>,
    Json(request): Json<WorkoutRequest>,
) -> Result<Json<Vec<ExerciseOutput>>, ApiError> {
    let context = request.into_context();

    match state.engine.generate_workout(&context) {
        Ok(workout) => Ok(Json(workout)),
        Err(e) => {
            tracing::info!(error = %e, "workout.rejected");
            Err(e.into())
        }
    }
}

pub async fn reshuffle_exercise(
    State(state): State<AppState>,
    Json(request): Json<ReshuffleRequest>,
) -> Result<Json<ExerciseOutput>, ApiError> {
    let constraints = request.into_constraints();
    let replacement = state.engine.reshuffle_exercise(&constraints)?;
    Ok(Json(replacement))
}

pub async fn log_workout(
    State(state): State<AppState>,
    Json(log): Json<WorkoutLog>,
) -> Json<Value> {
    tracing::info!(
        user_id = %log.user_id,
        date = %log.date,
        exercise_count = log.exercises.len(),
        duration = log.duration,
        "workout.logged"
    );

    for exercise in log.exercises {
        state
            .engine
            .record_session(&exercise_id(&exercise.name), log.date, exercise.weights);
    }

    Json(json!({ "message": "Workout logged successfully." }))
}

pub async fn suggestions(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    Json(state.engine.compute_suggestions())
}
