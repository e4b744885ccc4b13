use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::RuleError;
use crate::rule::{DetectionRule, LoadedDetection};

/// Loads a single rule file.
pub fn load_detection(path: impl AsRef<Path>) -> Result<LoadedDetection, RuleError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| RuleError::from_io(path, err))?;
    let rule =
        DetectionRule::from_yaml(&raw).map_err(|err| RuleError::parse_error(path, err.to_string()))?;
    LoadedDetection::new(path, rule)
}

/// Discovers and loads every `*.yml` / `*.yaml` rule in a folder.
///
/// Discovery is non-recursive; subdirectories are skipped. An empty
/// folder is not an error, only a warning.
pub fn load_directory(path: impl AsRef<Path>) -> Result<Vec<LoadedDetection>, RuleError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RuleError::MissingPath(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(RuleError::NotADirectory(path.display().to_string()));
    }

    let mut detections = Vec::new();
    let mut entries: Vec<_> = fs::read_dir(path)
        .map_err(|err| RuleError::from_io(path, err))?
        .collect::<Result<_, _>>()
        .map_err(|err| RuleError::from_io(path, err))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let entry_path = entry.path();
        if entry_path.is_dir() {
            continue;
        }
        match entry_path.extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => detections.push(load_detection(&entry_path)?),
            _ => {}
        }
    }

    if detections.is_empty() {
        warn!(folder = %path.display(), "no rule files found");
    }

    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_rules_from_directory_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b_rule.yaml"), "title: B\n").expect("write");
        fs::write(dir.path().join("a_rule.yml"), "title: A\n").expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");

        let detections = load_directory(dir.path()).expect("loads");
        let names: Vec<_> = detections.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a_rule", "b_rule"]);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let err = load_directory("/does/not/exist").expect_err("must fail");
        assert!(matches!(err, RuleError::MissingPath(_)));
    }

    #[test]
    fn unparseable_rule_names_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "title: [unclosed\n").expect("write");

        let err = load_directory(dir.path()).expect_err("must fail");
        assert!(err.to_string().contains("broken.yaml"));
    }
}
