//! Detection-rule handling for the detlab workspace.
//!
//! Rules are YAML documents whose matching logic is opaque to this
//! system: it is handed verbatim to an external converter that produces
//! a platform-native search string. This crate owns the document model,
//! on-disk discovery, the conversion seam and the index-filter splice
//! applied to converted queries.

mod convert;
mod error;
mod loader;
mod rule;

pub use convert::{inject_index_filter, RuleConverter, SigmaCliConverter};
pub use error::{ConversionError, RuleError};
pub use loader::{load_detection, load_directory};
pub use rule::{DetectionRule, LoadedDetection};
