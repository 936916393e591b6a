//! `gradle.properties` and ignore-rule generation.

use pom2gradle_maven::Module;

const SKIPPED_PREFIXES: &[&str] = &["maven.", "java.", "kotlin.", "project.reporting."];

/// Build performance defaults plus the root POM's custom properties,
/// kept as comments for reference.
pub fn generate_properties(root: &Module) -> String {
    let mut lines = vec![
        "# Generated by pom2gradle.".to_string(),
        "org.gradle.daemon=true".to_string(),
        "org.gradle.parallel=true".to_string(),
        "org.gradle.caching=true".to_string(),
        "# Enable once every applied plugin supports it:".to_string(),
        "# org.gradle.configuration-cache=true".to_string(),
    ];

    let mut custom = Vec::new();
    for (key, value) in &root.properties {
        if key == "project.build.sourceEncoding" {
            lines.push(format!("# Source encoding: {value}"));
        } else if !SKIPPED_PREFIXES.iter().any(|p| key.starts_with(p)) {
            custom.push(format!("# {}={value}", key.replace('.', "_")));
        }
    }
    if !custom.is_empty() {
        lines.push("# Maven properties:".to_string());
        lines.extend(custom);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Lines appended to the ignore file of an overlay migration.
pub const IGNORE_RULES: &str = "# Gradle
.gradle/
build/
!gradle/wrapper/gradle-wrapper.jar
!**/src/main/**/build/
!**/src/test/**/build/
";
