//! The migration pipeline: load the module tree, analyze it, build the
//! catalog, then generate every file in memory.
//!
//! Nothing here touches the output location; handing the files to a sink
//! is the caller's job.

use crate::error::{MigrateError, Result};
use crate::report::{MigrationReport, ModuleOutcome, ModuleStatus};
use pom2gradle_core::output::{
    BUILD_FILE, CATALOG_FILE, IGNORE_FILE, PROPERTIES_FILE, SETTINGS_FILE,
};
use pom2gradle_core::{FileKind, GeneratedFile, MigrationMode};
use pom2gradle_gradle::{
    IGNORE_RULES, Project, VersionCatalog, generate_build_script, generate_properties,
    generate_settings, validate_catalog,
};
use pom2gradle_maven::{ModuleTree, PomSource};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationOptions {
    pub mode: MigrationMode,
}

/// Path of `file_name` inside a module directory, relative to the root.
fn module_file(source_dir: &str, file_name: &str) -> PathBuf {
    if source_dir == "." || source_dir.is_empty() {
        PathBuf::from(file_name)
    } else {
        Path::new(source_dir).join(file_name)
    }
}

/// Converts the Maven build rooted at `root_pom`.
///
/// # Errors
///
/// Fails only when the root POM cannot be read or parsed, when no module
/// at all can be converted, or when the generated catalog does not
/// validate. Per-module failures are recorded in the report instead.
pub fn migrate(
    source: &impl PomSource,
    root_pom: &Path,
    options: MigrationOptions,
) -> Result<MigrationReport> {
    let tree = ModuleTree::load(source, root_pom)?;
    let project = Project::analyze(&tree);

    let mut modules = Vec::new();
    for failure in tree.failures() {
        modules.push(ModuleOutcome {
            pom: module_file(&failure.source_dir, "pom.xml"),
            gradle_path: String::new(),
            status: ModuleStatus::Failed,
            error: Some(failure.error.to_string()),
        });
    }
    for failure in project.failures() {
        let module = tree.module(failure.id);
        modules.push(ModuleOutcome {
            pom: module_file(&module.source_dir, "pom.xml"),
            gradle_path: module.gradle_path(),
            status: ModuleStatus::Failed,
            error: Some(failure.error.to_string()),
        });
    }

    let catalog = VersionCatalog::build(&project);
    let catalog_toml = catalog.to_toml();
    let summary = validate_catalog(&catalog_toml)?;

    let mut advisories = tree.advisories().to_vec();
    advisories.extend(catalog.advisories().iter().cloned());

    let mut files = Vec::new();
    let mut retirable_poms = Vec::new();
    for plan in project.plans() {
        let module = plan.view.module;
        let gradle_path = plan.gradle_path();
        let pom = module_file(&module.source_dir, "pom.xml");
        match generate_build_script(&project, plan, &catalog, options.mode) {
            Ok(script) => {
                files.push(GeneratedFile::new(
                    module_file(&module.source_dir, BUILD_FILE),
                    FileKind::BuildScript {
                        module: gradle_path.clone(),
                    },
                    script.contents,
                ));
                advisories.extend(script.advisories);
                if !options.mode.is_overlay() {
                    retirable_poms.push(pom.clone());
                }
                modules.push(ModuleOutcome {
                    pom,
                    gradle_path,
                    status: ModuleStatus::Converted,
                    error: None,
                });
            }
            Err(error) => {
                tracing::warn!(module = %gradle_path, error = %error, "cannot generate build script");
                modules.push(ModuleOutcome {
                    pom,
                    gradle_path,
                    status: ModuleStatus::Failed,
                    error: Some(error.to_string()),
                });
            }
        }
    }

    if files.is_empty() {
        return Err(MigrateError::NothingConverted {
            root: root_pom.to_path_buf(),
        });
    }

    files.push(GeneratedFile::new(
        SETTINGS_FILE,
        FileKind::Settings,
        generate_settings(&project),
    ));
    files.push(GeneratedFile::new(
        CATALOG_FILE,
        FileKind::VersionCatalog,
        catalog_toml,
    ));
    files.push(GeneratedFile::new(
        PROPERTIES_FILE,
        FileKind::Properties,
        generate_properties(tree.module(tree.root())),
    ));
    if options.mode.is_overlay() {
        files.push(GeneratedFile::new(
            IGNORE_FILE,
            FileKind::IgnoreRules,
            IGNORE_RULES.to_string(),
        ));
    }

    let report = MigrationReport {
        mode: options.mode,
        files,
        advisories,
        modules,
        catalog: summary,
        retirable_poms,
    };
    tracing::info!(
        mode = %report.mode,
        modules = report.modules.len(),
        failed = report.failed_modules().count(),
        files = report.files.len(),
        advisories = report.advisories.len(),
        "migration finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pom2gradle_core::Advisory;
    use pom2gradle_maven::MemoryPomSource;

    const ROOT: &str = "<project><groupId>g</groupId><artifactId>root</artifactId><version>1</version>\
        <packaging>pom</packaging><modules><module>a</module><module>b</module></modules></project>";

    fn child(artifact: &str) -> String {
        format!(
            "<project><parent><groupId>g</groupId><artifactId>root</artifactId><version>1</version>\
             </parent><artifactId>{artifact}</artifactId></project>"
        )
    }

    #[test]
    fn test_module_file() {
        assert_eq!(module_file(".", BUILD_FILE), PathBuf::from("build.gradle.kts"));
        assert_eq!(
            module_file("a/b", BUILD_FILE),
            PathBuf::from("a/b/build.gradle.kts")
        );
    }

    #[test]
    fn test_file_set_per_mode() {
        let source = MemoryPomSource::new()
            .with("p/pom.xml", ROOT)
            .with("p/a/pom.xml", child("a"))
            .with("p/b/pom.xml", child("b"));

        let full = migrate(&source, Path::new("p/pom.xml"), MigrationOptions::default()).unwrap();
        let paths: Vec<_> = full.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("build.gradle.kts"),
                PathBuf::from("a/build.gradle.kts"),
                PathBuf::from("b/build.gradle.kts"),
                PathBuf::from(SETTINGS_FILE),
                PathBuf::from(CATALOG_FILE),
                PathBuf::from(PROPERTIES_FILE),
            ]
        );
        assert_eq!(full.retirable_poms.len(), 3);
        assert!(!full.is_partial());

        let overlay = migrate(
            &source,
            Path::new("p/pom.xml"),
            MigrationOptions {
                mode: MigrationMode::Overlay,
            },
        )
        .unwrap();
        assert!(overlay.retirable_poms.is_empty());
        assert_eq!(
            overlay.file(IGNORE_FILE).unwrap().contents,
            IGNORE_RULES
        );
    }

    #[test]
    fn test_failed_child_is_partial() {
        let source = MemoryPomSource::new()
            .with("p/pom.xml", ROOT)
            .with("p/a/pom.xml", child("a"))
            .with("p/b/pom.xml", "<project><artifactId>b</artifactId>");

        let report = migrate(&source, Path::new("p/pom.xml"), MigrationOptions::default()).unwrap();
        assert!(report.is_partial());
        let failed: Vec<_> = report.failed_modules().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].pom, PathBuf::from("b/pom.xml"));
        assert!(report.file("a/build.gradle.kts").is_some());
        assert!(report.file("b/build.gradle.kts").is_none());
        assert!(!report.file(SETTINGS_FILE).unwrap().contents.contains("include(\"b\")"));
    }

    #[test]
    fn test_odd_version_text_does_not_abort() {
        let source = MemoryPomSource::new()
            .with("p/pom.xml", ROOT)
            .with(
                "p/a/pom.xml",
                "<project><parent><groupId>g</groupId><artifactId>root</artifactId><version>1</version>\
                 </parent><artifactId>a</artifactId><dependencies><dependency><groupId>org.x</groupId>\
                 <artifactId>odd</artifactId><version>2.0&#10;\"rc\"</version></dependency>\
                 </dependencies></project>",
            )
            .with("p/b/pom.xml", child("b"));

        let report = migrate(&source, Path::new("p/pom.xml"), MigrationOptions::default()).unwrap();
        assert!(!report.is_partial());
        assert!(report.file("a/build.gradle.kts").is_some());
        assert!(report.file("b/build.gradle.kts").is_some());
        assert_eq!(report.catalog.libraries, 1);
        let catalog: toml_edit::DocumentMut =
            report.file(CATALOG_FILE).unwrap().contents.parse().unwrap();
        assert_eq!(catalog["versions"]["odd"].as_str(), Some("2.0\n\"rc\""));
    }

    #[test]
    fn test_root_failure_is_fatal() {
        let source = MemoryPomSource::new().with("p/pom.xml", "<project>");
        let err = migrate(&source, Path::new("p/pom.xml"), MigrationOptions::default()).unwrap_err();
        assert!(matches!(err, MigrateError::Maven(_)));
    }

    #[test]
    fn test_cycle_reported() {
        let source = MemoryPomSource::new()
            .with("p/pom.xml", ROOT)
            .with("p/a/pom.xml", child("a"))
            .with(
                "p/b/pom.xml",
                "<project><parent><groupId>g</groupId><artifactId>root</artifactId><version>1</version>\
                 </parent><artifactId>b</artifactId><packaging>pom</packaging>\
                 <modules><module>..</module></modules></project>",
            );
        let report = migrate(&source, Path::new("p/pom.xml"), MigrationOptions::default()).unwrap();
        assert_eq!(report.cycles().count(), 1);
        assert!(matches!(
            report.cycles().next(),
            Some(Advisory::ModuleCycle { .. })
        ));
        assert!(!report.is_partial());
    }
}
