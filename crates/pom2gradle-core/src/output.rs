//! In-memory description of generated Gradle files.
//!
//! Generation produces bytes only; committing them to disk (or printing a
//! preview) is the job of an output sink outside the core.

use serde::Serialize;
use std::path::PathBuf;

pub const BUILD_FILE: &str = "build.gradle.kts";
pub const SETTINGS_FILE: &str = "settings.gradle.kts";
pub const CATALOG_FILE: &str = "gradle/libs.versions.toml";
pub const PROPERTIES_FILE: &str = "gradle.properties";
pub const IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileKind {
    /// Build script of the module with the given Gradle path.
    BuildScript { module: String },
    Settings,
    VersionCatalog,
    Properties,
    /// Lines to append to the ignore file (overlay mode only).
    IgnoreRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Path relative to the output root.
    pub path: PathBuf,
    pub kind: FileKind,
    #[serde(skip_serializing)]
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, kind: FileKind, contents: String) -> Self {
        Self {
            path: path.into(),
            kind,
            contents,
        }
    }

    /// Whether the sink must append to an existing file instead of replacing it.
    pub const fn is_append(&self) -> bool {
        matches!(self.kind, FileKind::IgnoreRules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ignore_rules_append() {
        let rules = GeneratedFile::new(IGNORE_FILE, FileKind::IgnoreRules, String::new());
        assert!(rules.is_append());

        let settings = GeneratedFile::new(SETTINGS_FILE, FileKind::Settings, String::new());
        assert!(!settings.is_append());
    }

    #[test]
    fn test_contents_not_serialized() {
        let file = GeneratedFile::new(
            BUILD_FILE,
            FileKind::BuildScript {
                module: ":".into(),
            },
            "plugins {}".into(),
        );
        let json = serde_json::to_value(&file).unwrap();
        assert!(json.get("contents").is_none());
        assert_eq!(json["kind"]["type"], "build_script");
    }
}
