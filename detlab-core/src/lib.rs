//! Shared foundations for the detlab workspace.
//!
//! Holds the environment-sourced configuration used to reach the Splunk
//! instance, the configuration error type, and the tracing subscriber
//! setup shared by the CLI and the test harness.

pub mod config;
pub mod errors;
pub mod logging;

pub use config::SplunkConfig;
pub use errors::ConfigError;
pub use logging::init_tracing;
