//! config.rs — the environment surface, read once at startup.
//!
//! No ambient globals: `main` builds one `Config` and hands pieces of it down.
//! `.env` is loaded by the binary (dotenvy) before this runs, so local dev and
//! deployed environments read the same names.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Grid/cycle knobs. Fixed defaults in production, constructible in tests.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub step_size: f64,
    pub step_limit: usize,
    pub cycle_secs: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            step_size: 0.0025,
            step_limit: 5,
            cycle_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth_service: String,
    pub username: String,
    pub password: String,
    pub location_name: String,
    pub rarity_limit: i32,
    pub distance_limit: f64,
    pub slack_webhook_url: Option<String>,
    pub map_api_url: String,
    pub snapshot_path: String,
    pub search: SearchParams,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let value = required(name)?;
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value,
        reason: e.to_string(),
    })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            auth_service: required("AUTH_SERVICE")?,
            username: required("USERNAME")?,
            password: required("PASSWORD")?,
            location_name: required("LOCATION_NAME")?,
            rarity_limit: parsed("RARITY_LIMIT")?,
            distance_limit: parsed("DISTANCE_LIMIT")?,
            slack_webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
            map_api_url: std::env::var("MAP_API_URL")
                .unwrap_or_else(|_| "https://pgoapi.example.com".into()),
            snapshot_path: std::env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "spawn_snapshot.json".into()),
            search: SearchParams::default(),
        })
    }
}
