use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::api::workouts::{AppState, router};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::history::InMemoryHistoryStore;
use crate::services::templates::TemplateRegistry;
use crate::services::workout_engine::WorkoutEngine;

mod api;
mod catalog;
mod config;
mod error;
mod history;
mod models;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let catalog = Catalog::load(&config.catalog_path)?;
    if catalog.is_empty() {
        tracing::warn!(path = %config.catalog_path, "catalog.empty");
    }

    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let templates = TemplateRegistry::builtin()?;
    let mut archetypes: Vec<&str> = templates.archetypes().collect();
    archetypes.sort_unstable();
    tracing::info!(?archetypes, "templates.registered");

    let engine = WorkoutEngine::new(
        Arc::new(catalog),
        templates,
        Arc::new(InMemoryHistoryStore::new()),
        rng,
        config.default_rest_seconds,
    );

    let app = router(AppState { engine });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = %config.port, "server.listening");
    axum::serve(listener, app).await?;
    Ok(())
}
