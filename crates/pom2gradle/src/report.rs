//! Outcome of one migration run.

use pom2gradle_core::{Advisory, GeneratedFile, MigrationMode};
use pom2gradle_gradle::CatalogSummary;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Converted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOutcome {
    /// POM path relative to the project root.
    pub pom: PathBuf,
    pub gradle_path: String,
    pub status: ModuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub mode: MigrationMode,
    pub files: Vec<GeneratedFile>,
    pub advisories: Vec<Advisory>,
    pub modules: Vec<ModuleOutcome>,
    pub catalog: CatalogSummary,
    /// POMs that can be deleted once the Gradle build is verified.
    /// Always empty in overlay mode.
    pub retirable_poms: Vec<PathBuf>,
}

impl MigrationReport {
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path.as_ref())
    }

    pub fn cycles(&self) -> impl Iterator<Item = &Advisory> {
        self.advisories
            .iter()
            .filter(|a| matches!(a, Advisory::ModuleCycle { .. }))
    }

    pub fn unmapped_plugins(&self) -> impl Iterator<Item = &Advisory> {
        self.advisories
            .iter()
            .filter(|a| matches!(a, Advisory::UnmappedPlugin { .. }))
    }

    pub fn version_overrides(&self) -> impl Iterator<Item = &Advisory> {
        self.advisories
            .iter()
            .filter(|a| matches!(a, Advisory::VersionOverride { .. }))
    }

    pub fn failed_modules(&self) -> impl Iterator<Item = &ModuleOutcome> {
        self.modules
            .iter()
            .filter(|m| m.status == ModuleStatus::Failed)
    }

    /// Some module could not be converted.
    pub fn is_partial(&self) -> bool {
        self.failed_modules().next().is_some()
    }

    /// Human-readable summary for the terminal.
    pub fn render_text(&self) -> String {
        let converted = self
            .modules
            .iter()
            .filter(|m| m.status == ModuleStatus::Converted)
            .count();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} migration: {converted} of {} modules converted, {} files generated",
            self.mode,
            self.modules.len(),
            self.files.len()
        );
        let _ = writeln!(
            out,
            "catalog: {} versions, {} libraries, {} plugins",
            self.catalog.versions, self.catalog.libraries, self.catalog.plugins
        );

        for module in self.failed_modules() {
            let _ = writeln!(
                out,
                "failed: {} ({})",
                module.pom.display(),
                module.error.as_deref().unwrap_or("unknown error")
            );
        }
        if !self.advisories.is_empty() {
            let _ = writeln!(out, "\nadvisories:");
            for advisory in &self.advisories {
                let _ = writeln!(out, "  - {advisory}");
            }
        }
        if !self.retirable_poms.is_empty() {
            let _ = writeln!(out, "\nonce the Gradle build is verified, these POMs can be removed:");
            for pom in &self.retirable_poms {
                let _ = writeln!(out, "  {}", pom.display());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(modules: Vec<ModuleOutcome>) -> MigrationReport {
        MigrationReport {
            mode: MigrationMode::Full,
            files: Vec::new(),
            advisories: vec![Advisory::UnmappedPlugin {
                module: "app".into(),
                coordinate: "com.example:custom-maven-plugin".into(),
            }],
            modules,
            catalog: CatalogSummary::default(),
            retirable_poms: vec![PathBuf::from("pom.xml")],
        }
    }

    fn outcome(status: ModuleStatus) -> ModuleOutcome {
        ModuleOutcome {
            pom: PathBuf::from("pom.xml"),
            gradle_path: ":".into(),
            status,
            error: (status == ModuleStatus::Failed).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_partial_detection() {
        assert!(!report(vec![outcome(ModuleStatus::Converted)]).is_partial());
        assert!(report(vec![outcome(ModuleStatus::Converted), outcome(ModuleStatus::Failed)]).is_partial());
    }

    #[test]
    fn test_render_text() {
        let text = report(vec![outcome(ModuleStatus::Failed)]).render_text();
        assert!(text.starts_with("full migration: 0 of 1 modules converted, 0 files generated\n"));
        assert!(text.contains("failed: pom.xml (boom)\n"));
        assert!(text.contains("  - app: Maven plugin com.example:custom-maven-plugin has no known Gradle equivalent\n"));
        assert!(text.contains("these POMs can be removed:\n  pom.xml\n"));
    }

    #[test]
    fn test_report_json() {
        let json = serde_json::to_value(report(vec![outcome(ModuleStatus::Converted)])).unwrap();
        assert_eq!(json["mode"], "full");
        assert_eq!(json["modules"][0]["status"], "converted");
        assert!(json["modules"][0].get("error").is_none());
        assert_eq!(json["advisories"][0]["kind"], "unmapped_plugin");
    }
}
