use thiserror::Error;

/// Configuration errors raised while reading the process environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable is not set: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {key}: {message}")]
    InvalidEnvVar { key: &'static str, message: String },
}
