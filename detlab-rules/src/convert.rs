use std::io::Write;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ConversionError;
use crate::rule::DetectionRule;

/// The external rule-translation capability.
///
/// Implementations turn a rule document into a platform-native search
/// string. A converted query is a pure function of the document; no
/// implementation may cache or inject hidden state.
#[async_trait]
pub trait RuleConverter: Send + Sync {
    async fn convert(&self, rule: &DetectionRule) -> Result<String, ConversionError>;
}

/// Production converter backed by the external `sigma` CLI.
///
/// The rule document is written to a scratch file and handed to
/// `sigma convert --target <target> --without-pipeline`; the command's
/// stdout is the converted query.
#[derive(Debug, Clone)]
pub struct SigmaCliConverter {
    command: String,
    target: String,
}

impl Default for SigmaCliConverter {
    fn default() -> Self {
        Self {
            command: "sigma".to_string(),
            target: "splunk".to_string(),
        }
    }
}

impl SigmaCliConverter {
    pub fn new(command: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target: target.into(),
        }
    }
}

#[async_trait]
impl RuleConverter for SigmaCliConverter {
    async fn convert(&self, rule: &DetectionRule) -> Result<String, ConversionError> {
        let document = rule
            .to_yaml()
            .map_err(|err| ConversionError::Document(err.to_string()))?;

        let mut scratch = tempfile::NamedTempFile::new()
            .map_err(|err| ConversionError::Document(err.to_string()))?;
        scratch
            .write_all(document.as_bytes())
            .map_err(|err| ConversionError::Document(err.to_string()))?;

        let output = Command::new(&self.command)
            .arg("convert")
            .arg("--target")
            .arg(&self.target)
            .arg("--without-pipeline")
            .arg(scratch.path())
            .output()
            .await
            .map_err(|err| ConversionError::Launch {
                command: self.command.clone(),
                source: err,
            })?;

        if !output.status.success() {
            return Err(ConversionError::Backend {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let query = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if query.is_empty() {
            return Err(ConversionError::Backend {
                message: "converter produced no query".to_string(),
            });
        }

        debug!(target = %self.target, %query, "rule converted");
        Ok(query)
    }
}

/// Splices an index/host filter into a converted query.
///
/// Three cases, decided on the (trimmed) query shape:
/// 1. a pipe-generator query gets the filter as its leading generating
///    search: `"<filter> | <rest-after-pipe>"`;
/// 2. a query already carrying the `search ` directive gets the filter
///    inserted right after the directive;
/// 3. anything else gets both the directive and the filter prepended.
pub fn inject_index_filter(query: &str, filter: &str) -> String {
    let query = query.trim();
    if let Some(rest) = query.strip_prefix('|') {
        format!("{} | {}", filter, rest.trim_start())
    } else if let Some(rest) = query.strip_prefix("search ") {
        format!("search {} {}", filter, rest)
    } else {
        format!("search {} {}", filter, query)
    }
}
