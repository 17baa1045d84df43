//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use podcast_muse_core::pipeline::StageTimings;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: Level,
    pub storage_path: PathBuf,
    pub request_timeout: Duration,
    pub stage_timings: StageTimings,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Backend ---
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let api_base_url = normalize_base_url(&api_base_url)
            .ok_or_else(|| ConfigError::InvalidValue("API_BASE_URL".to_string(), "empty URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let storage_path = match std::env::var("PODCAST_MUSE_STORAGE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_storage_path()
                .ok_or_else(|| ConfigError::MissingVar("PODCAST_MUSE_STORAGE".to_string()))?,
        };

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?);

        // --- Simulated generation delays ---
        let defaults = StageTimings::default();
        let stage_timings = StageTimings {
            script: stage_delay("STAGE_DELAY_MS_SCRIPT", defaults.script)?,
            audio: stage_delay("STAGE_DELAY_MS_AUDIO", defaults.audio)?,
            image: stage_delay("STAGE_DELAY_MS_IMAGE", defaults.image)?,
            video: stage_delay("STAGE_DELAY_MS_VIDEO", defaults.video)?,
            compose: stage_delay("STAGE_DELAY_MS_COMPOSE", defaults.compose)?,
        };

        Ok(Self {
            api_base_url,
            log_level,
            storage_path,
            request_timeout,
            stage_timings,
        })
    }

    /// A configuration pointing at `api_base_url` with no generation delays.
    /// Meant for tests and scripted runs.
    pub fn for_backend(api_base_url: &str, storage_path: PathBuf) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url).unwrap_or_default(),
            log_level: Level::INFO,
            storage_path,
            request_timeout: Duration::from_secs(30),
            stage_timings: StageTimings::instant(),
        }
    }
}

/// `<config_dir>/podcast-muse/storage.json`
pub fn default_storage_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("podcast-muse");
    path.push("storage.json");
    Some(path)
}

fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn stage_delay(var: &str, default: Duration) -> Result<Duration, ConfigError> {
    let millis = parse_var(var, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}

fn parse_var<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slashes() {
        assert_eq!(
            normalize_base_url(" http://localhost:8000/ ").as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(normalize_base_url("  "), None);
    }

    #[test]
    fn unparsable_numbers_name_the_variable() {
        let err = parse_value::<u64>("REQUEST_TIMEOUT_SECS", "soon").unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));
        assert_eq!(parse_value::<u64>("STAGE_DELAY_MS_AUDIO", " 250 ").unwrap(), 250);
    }

    #[test]
    fn backend_config_runs_generation_without_delays() {
        let config = Config::for_backend("http://127.0.0.1:9/", PathBuf::from("/tmp/s.json"));
        assert_eq!(config.api_base_url, "http://127.0.0.1:9");
        assert_eq!(config.stage_timings, StageTimings::instant());
    }
}
