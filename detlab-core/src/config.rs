use std::env;

use crate::errors::ConfigError;

/// Management API port exposed by the platform.
pub const MANAGEMENT_PORT: u16 = 8089;
/// HTTP Event Collector port used for ingestion.
pub const HEC_PORT: u16 = 8088;

/// Connection settings for the target Splunk instance.
///
/// Every field comes from the process environment; the four credentials
/// are required and their absence is a startup failure naming the
/// missing variable.
#[derive(Debug, Clone)]
pub struct SplunkConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub hec_token: String,
    /// Index sample data is ingested into and cleaned up from.
    pub index: String,
    /// Whether to verify the platform's TLS certificate.
    pub verify_tls: bool,
}

impl SplunkConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = require("SPLUNK_HOST")?;
        let username = require("SPLUNK_USERNAME")?;
        let password = require("SPLUNK_PASSWORD")?;
        let hec_token = require("SPLUNK_HEC_TOKEN")?;

        let index = env::var("DETLAB_INDEX").unwrap_or_else(|_| "test".to_string());
        let verify_tls = env::var("DETLAB_VERIFY_TLS")
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            host,
            username,
            password,
            hec_token,
            index,
            verify_tls,
        })
    }

    /// Base URL of the management API (session auth, search jobs, saved searches).
    pub fn management_url(&self) -> String {
        format!("https://{}:{}", self.host, MANAGEMENT_PORT)
    }

    /// Base URL of the HTTP Event Collector.
    pub fn hec_url(&self) -> String {
        format!("https://{}:{}", self.host, HEC_PORT)
    }
}

fn require(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}
