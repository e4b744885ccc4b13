use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::RuleError;

/// A detection rule as authored on disk.
///
/// The matching logic inside the document is opaque to detlab; only the
/// harness-facing keys (`data`, `source`, `sourcetype`) are lifted out.
/// The full original document is preserved for the converter.
#[derive(Debug, Clone)]
pub struct DetectionRule {
    /// Human readable rule title, if the document carries one.
    pub title: Option<String>,
    /// Relative path to a sample-event file replayed before testing.
    pub data: Option<String>,
    /// Source tag applied to ingested sample events.
    pub source: String,
    /// Sourcetype tag applied to ingested sample events.
    pub sourcetype: String,
    document: serde_yaml::Value,
}

#[derive(Debug, Deserialize)]
struct HarnessFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default = "default_tag")]
    source: String,
    #[serde(default = "default_tag")]
    sourcetype: String,
}

fn default_tag() -> String {
    "test".to_string()
}

impl DetectionRule {
    /// Parses a rule from raw YAML. Parse success is the only validation
    /// performed here; the converter judges the matching logic.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        let document: serde_yaml::Value = serde_yaml::from_str(raw)?;
        let fields: HarnessFields = serde_yaml::from_value(document.clone())?;

        Ok(Self {
            title: fields.title,
            data: fields.data,
            source: fields.source,
            sourcetype: fields.sourcetype,
            document,
        })
    }

    /// The full rule document, matching logic included.
    pub fn document(&self) -> &serde_yaml::Value {
        &self.document
    }

    /// Re-serializes the document for hand-off to the converter.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.document)
    }
}

/// A rule bound to its on-disk identity.
#[derive(Debug, Clone)]
pub struct LoadedDetection {
    /// Rule identity: the file name without extension. Doubles as the
    /// deployed saved-search name.
    pub name: String,
    /// Path the rule was loaded from.
    pub path: PathBuf,
    pub rule: DetectionRule,
}

impl LoadedDetection {
    pub fn new(path: impl Into<PathBuf>, rule: DetectionRule) -> Result<Self, RuleError> {
        let path = path.into();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.to_string())
            .ok_or_else(|| RuleError::MissingPath(path.display().to_string()))?;

        Ok(Self { name, path, rule })
    }

    /// Resolves the rule's sample-data file against the rule's own directory.
    pub fn data_path(&self) -> Option<PathBuf> {
        let data = self.rule.data.as_ref()?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        Some(dir.join(data))
    }
}
