// Service configuration, sourced from the environment (with .env support in
// the binary). Every knob has a default except the Gemini API key.

use std::path::PathBuf;
use thiserror::Error;

const API_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is required. Set it in the environment or .env")]
    MissingApiKey,

    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory the test file store owns, sibling to the service root.
    pub tests_dir: PathBuf,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Files older than this are swept by the periodic cleanup task.
    /// Zero disables the sweeper.
    pub cleanup_max_age_hours: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if gemini_api_key.trim().is_empty() || gemini_api_key == API_KEY_PLACEHOLDER {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000)?,
            tests_dir: std::env::var("TESTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("tests")),
            gemini_api_key,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            cleanup_max_age_hours: parse_var("CLEANUP_MAX_AGE_HOURS", 24)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cleanup_max_age_ms(&self) -> u64 {
        self.cleanup_max_age_hours.saturating_mul(60 * 60 * 1000)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(default),
    }
}
