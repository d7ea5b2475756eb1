//! Environment-driven configuration.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Application configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the generation service.
    pub api_key: SecretString,
    /// Model identifier sent on every completion request.
    pub model: String,
    /// Path to the local database file.
    pub db_path: String,
    /// HTTP listen port.
    pub port: u16,
    /// Timeout applied to every generation-service request. Expiry is
    /// reported as a service error, not retried.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let model =
            std::env::var("PROJECT_ASSIST_MODEL").unwrap_or_else(|_| "gpt-4".to_string());

        let db_path = std::env::var("PROJECT_ASSIST_DB_PATH")
            .unwrap_or_else(|_| "./data/project-assist.db".to_string());

        let port = match std::env::var("PROJECT_ASSIST_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PROJECT_ASSIST_PORT".to_string(),
                message: format!("not a valid port: {raw}"),
            })?,
            Err(_) => 8080,
        };

        let timeout_secs = match std::env::var("PROJECT_ASSIST_LLM_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PROJECT_ASSIST_LLM_TIMEOUT_SECS".to_string(),
                message: format!("not a valid number of seconds: {raw}"),
            })?,
            Err(_) => 60,
        };

        Ok(Self {
            api_key: SecretString::from(api_key),
            model,
            db_path,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
