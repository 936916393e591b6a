//! End-to-end migration tests: POMs on disk in, Gradle files on disk out.

use pom2gradle::{
    DiskWriter, MigrationOptions, MigrationReport, ModuleStatus, Preview, migrate, write_all,
};
use pom2gradle_core::output::{CATALOG_FILE, IGNORE_FILE, SETTINGS_FILE};
use pom2gradle_core::{Advisory, FileKind, MigrationMode};
use pom2gradle_maven::{FsPomSource, MemoryPomSource};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use toml_edit::DocumentMut;

const ROOT_POM: &str = include_str!("fixtures/ledger/pom.xml");
const BILLING_POM: &str = include_str!("fixtures/ledger/billing.xml");
const REPORTS_POM: &str = include_str!("fixtures/ledger/reports.xml");
const LEGACY_POM: &str = include_str!("fixtures/ledger/legacy.xml");

fn write_ledger(dir: &Path) {
    fs::write(dir.join("pom.xml"), ROOT_POM).unwrap();
    for (module, pom) in [
        ("billing", BILLING_POM),
        ("reports", REPORTS_POM),
        ("legacy", LEGACY_POM),
    ] {
        fs::create_dir_all(dir.join(module)).unwrap();
        fs::write(dir.join(module).join("pom.xml"), pom).unwrap();
    }
}

fn run(dir: &Path, mode: MigrationMode) -> MigrationReport {
    migrate(&FsPomSource, &dir.join("pom.xml"), MigrationOptions { mode }).unwrap()
}

#[test]
fn test_full_migration_to_disk() {
    let project = TempDir::new().unwrap();
    write_ledger(project.path());
    let report = run(project.path(), MigrationMode::Full);

    let out = TempDir::new().unwrap();
    let mut writer = DiskWriter::new(out.path()).unwrap();
    write_all(&mut writer, &report.files).unwrap();

    for path in [
        "build.gradle.kts",
        "billing/build.gradle.kts",
        "reports/build.gradle.kts",
        SETTINGS_FILE,
        CATALOG_FILE,
        "gradle.properties",
    ] {
        assert!(out.path().join(path).is_file(), "{path} not written");
    }
    assert!(!out.path().join("legacy/build.gradle.kts").exists());
    assert!(!out.path().join(IGNORE_FILE).exists());

    let settings = fs::read_to_string(out.path().join(SETTINGS_FILE)).unwrap();
    assert!(settings.contains("rootProject.name = \"ledger\"\n"));
    assert!(settings.contains("include(\"billing\")\ninclude(\"reports\")\n"));
    assert!(!settings.contains("legacy"));

    let reports = fs::read_to_string(out.path().join("reports/build.gradle.kts")).unwrap();
    assert!(reports.contains("    implementation(project(\":billing\"))\n"));
    assert!(reports.contains("    implementation(libs.commons.lang3)\n"));

    let catalog = fs::read_to_string(out.path().join(CATALOG_FILE)).unwrap();
    let doc: DocumentMut = catalog.parse().unwrap();
    let entry = &doc["libraries"]["commons-lang3"];
    assert_eq!(entry["group"].as_str(), Some("org.apache.commons"));
    let key = entry["version"]["ref"].as_str().unwrap();
    assert_eq!(doc["versions"][key].as_str(), Some("3.14.0"));
    assert!(doc["libraries"].get("ledger-billing").is_none());
    assert_eq!(report.catalog.libraries, doc["libraries"].as_table().unwrap().len());
}

#[test]
fn test_report_collects_advisories_and_failures() {
    let project = TempDir::new().unwrap();
    write_ledger(project.path());
    let report = run(project.path(), MigrationMode::Full);

    let overrides: Vec<_> = report.version_overrides().collect();
    assert_eq!(overrides.len(), 1);
    assert_eq!(
        overrides[0].to_string(),
        "org.apache.commons:commons-lang3: catalog uses 3.14.0, overriding 3.12.0 (ledger-billing)"
    );

    let unmapped: Vec<_> = report.unmapped_plugins().collect();
    assert_eq!(
        unmapped,
        vec![&Advisory::UnmappedPlugin {
            module: "ledger-billing".into(),
            coordinate: "com.acme.build:license-stamp-maven-plugin".into(),
        }]
    );
    let billing = report.file("billing/build.gradle.kts").unwrap();
    assert!(billing.contents.contains(
        "// TODO: Maven plugin com.acme.build:license-stamp-maven-plugin has no known Gradle equivalent"
    ));

    assert!(report.is_partial());
    let failed: Vec<_> = report.failed_modules().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].pom, PathBuf::from("legacy/pom.xml"));
    assert!(failed[0].error.as_deref().unwrap().contains("bundle"));
    assert_eq!(
        report
            .modules
            .iter()
            .filter(|m| m.status == ModuleStatus::Converted)
            .count(),
        3
    );
    assert_eq!(
        report.retirable_poms,
        vec![
            PathBuf::from("pom.xml"),
            PathBuf::from("billing/pom.xml"),
            PathBuf::from("reports/pom.xml"),
        ]
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mode"], "full");
    assert_eq!(json["catalog"]["libraries"], report.catalog.libraries);
    assert!(json["files"][0].get("contents").is_none());
}

#[test]
fn test_overlay_differs_only_in_headers_and_ignore_rules() {
    let project = TempDir::new().unwrap();
    write_ledger(project.path());
    let full = run(project.path(), MigrationMode::Full);
    let overlay = run(project.path(), MigrationMode::Overlay);

    assert!(overlay.retirable_poms.is_empty());
    assert_eq!(overlay.files.len(), full.files.len() + 1);
    let ignore = overlay.file(IGNORE_FILE).unwrap();
    assert_eq!(ignore.kind, FileKind::IgnoreRules);
    assert!(ignore.contents.contains(".gradle/\n"));
    assert!(ignore.contents.contains("build/\n"));

    for file in &full.files {
        let other = overlay.file(&file.path).unwrap();
        if matches!(file.kind, FileKind::BuildScript { .. }) {
            let strip = |s: &str| s.lines().skip(2).collect::<Vec<_>>().join("\n");
            assert_eq!(strip(&file.contents), strip(&other.contents));
            assert_ne!(file.contents, other.contents);
        } else {
            assert_eq!(file.contents, other.contents, "{}", file.path.display());
        }
    }
    assert_eq!(full.advisories, overlay.advisories);
}

#[test]
fn test_ignore_rules_appended_once() {
    let project = TempDir::new().unwrap();
    write_ledger(project.path());
    fs::write(project.path().join(IGNORE_FILE), "target/\n*.iml\n").unwrap();

    let report = run(project.path(), MigrationMode::Overlay);
    let mut writer = DiskWriter::new(project.path()).unwrap();
    write_all(&mut writer, &report.files).unwrap();
    write_all(&mut writer, &report.files).unwrap();

    let ignore = fs::read_to_string(project.path().join(IGNORE_FILE)).unwrap();
    assert!(ignore.starts_with("target/\n*.iml\n\n"));
    assert_eq!(ignore.matches(".gradle/").count(), 1);
    assert_eq!(fs::read_to_string(project.path().join("pom.xml")).unwrap(), ROOT_POM);
}

#[test]
fn test_dry_run_preview_writes_nothing() {
    let project = TempDir::new().unwrap();
    write_ledger(project.path());
    let report = run(project.path(), MigrationMode::Full);

    let mut preview = Preview::new(Vec::new());
    write_all(&mut preview, &report.files).unwrap();
    let text = String::from_utf8(preview.into_inner()).unwrap();

    assert!(text.starts_with("==> build.gradle.kts <==\n// Generated by pom2gradle from pom.xml.\n"));
    assert!(text.contains("==> gradle/libs.versions.toml <==\n# Generated by pom2gradle.\n"));
    assert!(!project.path().join("build.gradle.kts").exists());
}

#[test]
fn test_cycle_does_not_stop_migration() {
    let source = MemoryPomSource::new()
        .with(
            "app/pom.xml",
            "<project><groupId>g</groupId><artifactId>app</artifactId><version>1</version>\
             <packaging>pom</packaging><modules><module>lib</module></modules></project>",
        )
        .with(
            "app/lib/pom.xml",
            "<project><parent><groupId>g</groupId><artifactId>app</artifactId><version>1</version>\
             </parent><artifactId>lib</artifactId><modules><module>..</module></modules></project>",
        );

    let report = migrate(&source, Path::new("app/pom.xml"), MigrationOptions::default()).unwrap();
    assert_eq!(report.cycles().count(), 1);
    assert!(!report.is_partial());
    assert!(report.file("lib/build.gradle.kts").is_some());
}

#[test]
fn test_two_module_tree_with_managed_bom() {
    let source = MemoryPomSource::new()
        .with("store/pom.xml", include_str!("fixtures/boot-bom/pom.xml"))
        .with("store/child/pom.xml", include_str!("fixtures/boot-bom/child.xml"));
    let report = migrate(&source, Path::new("store/pom.xml"), MigrationOptions::default()).unwrap();
    assert!(!report.is_partial());

    let settings = &report.file(SETTINGS_FILE).unwrap().contents;
    assert!(settings.contains("rootProject.name = \"store\"\n"));
    assert!(settings.contains("include(\"child\")\n"));

    let doc: DocumentMut = report.file(CATALOG_FILE).unwrap().contents.parse().unwrap();
    let bom = &doc["libraries"]["spring-boot-dependencies"];
    assert_eq!(bom["group"].as_str(), Some("org.springframework.boot"));
    let starter = &doc["libraries"]["spring-boot-starter-web"];
    assert_eq!(starter["name"].as_str(), Some("spring-boot-starter-web"));

    let child = &report.file("child/build.gradle.kts").unwrap().contents;
    assert!(child.contains("implementation(libs.spring.boot.starter.web)"));
    assert!(!child.contains("project("));
    assert!(!child.contains("\"org.springframework.boot:"));
}
