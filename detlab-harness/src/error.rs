use detlab_rules::{ConversionError, RuleError};
use detlab_splunk::SplunkError;
use thiserror::Error;

/// Per-rule failures surfaced by the harness.
///
/// All of these are terminal for the rule they occur in and are caught
/// at the rule boundary; none aborts the surrounding batch.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("sample data file not found: {path}")]
    DataFileMissing { path: String },

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Platform(#[from] SplunkError),
}
