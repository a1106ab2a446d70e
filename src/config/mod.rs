use garde::Validate;
use serde::Deserialize;
use std::time::Duration;

use crate::services::generator::DEFAULT_PROVIDER_URL;
use crate::services::reference::DEFAULT_CATALOG;

#[derive(Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8080")
    #[serde(default = "default_bind_addr")]
    #[garde(length(min = 1))]
    pub bind_addr: String,

    /// PostgreSQL connection string
    #[garde(length(min = 1))]
    pub database_url: String,

    /// Image editor endpoint of the generation provider
    #[serde(default = "default_a2e_api_url")]
    #[garde(length(min = 1))]
    pub a2e_api_url: String,

    /// Bearer token for the provider. Requests go unauthenticated when unset.
    #[serde(default)]
    #[garde(skip)]
    pub a2e_api_key: Option<String>,

    /// Upper bound on one provider call, in seconds
    #[serde(default = "default_generation_timeout_secs")]
    #[garde(range(min = 1, max = 600))]
    pub generation_timeout_secs: u64,

    /// Origins allowed by CORS (comma-separated in the environment)
    #[serde(default = "default_cors_allowed_origins")]
    #[garde(length(min = 1))]
    pub cors_allowed_origins: Vec<String>,

    /// Reference portraits to swap onto (comma-separated in the environment)
    #[serde(default = "default_reference_catalog")]
    #[garde(length(min = 1))]
    pub reference_catalog: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_a2e_api_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_reference_catalog() -> Vec<String> {
    DEFAULT_CATALOG.iter().map(|url| url.to_string()).collect()
}

impl AppConfig {
    /// Load `.env` (if present) and read the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: AppConfig = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}
