use std::env;

use anyhow::Context;

const DEFAULT_PORT: &str = "8000";
const DEFAULT_CATALOG_PATH: &str = "data/exercises.json";
const DEFAULT_REST_SECONDS: u32 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: String,
    pub catalog_path: String,
    pub default_rest_seconds: u32,
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let catalog_path =
            env::var("CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());

        let default_rest_seconds = match env::var("DEFAULT_REST_SECONDS") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("DEFAULT_REST_SECONDS is not a number: {value}"))?,
            Err(_) => DEFAULT_REST_SECONDS,
        };

        let rng_seed = match env::var("RNG_SEED") {
            Ok(value) => Some(
                value
                    .parse()
                    .with_context(|| format!("RNG_SEED is not a u64: {value}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            port,
            catalog_path,
            default_rest_seconds,
            rng_seed,
        })
    }
}
