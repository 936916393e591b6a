//! Version catalog alias derivation.
//!
//! A library alias is its kebab-cased artifactId. Coordinates that would
//! share an alias all get a readable group prefix; if they still collide the
//! full groupId is used.

use std::collections::HashMap;

/// Readable prefixes for well-known groups. More specific groups come first.
const GROUP_PREFIXES: &[(&str, &str)] = &[
    ("org.springframework.boot", "spring-boot"),
    ("org.springframework.cloud", "spring-cloud"),
    ("org.springframework.data", "spring-data"),
    ("org.springframework.security", "spring-security"),
    ("org.springframework.kafka", "spring-kafka"),
    ("org.springframework", "spring"),
    ("io.awspring.cloud", "spring-cloud-aws"),
    ("org.apache.commons", "commons"),
    ("org.apache.kafka", "kafka"),
    ("org.apache.httpcomponents", "httpcomponents"),
    ("org.apache.logging.log4j", "log4j"),
    ("com.fasterxml.jackson.core", "jackson"),
    ("com.fasterxml.jackson.module", "jackson-module"),
    ("com.fasterxml.jackson.datatype", "jackson-datatype"),
    ("com.fasterxml.jackson.dataformat", "jackson-dataformat"),
    ("io.projectreactor", "reactor"),
    ("io.micrometer", "micrometer"),
    ("io.quarkus.platform", "quarkus-platform"),
    ("io.quarkus", "quarkus"),
    ("io.micronaut.data", "micronaut-data"),
    ("io.micronaut.test", "micronaut-test"),
    ("io.micronaut", "micronaut"),
    ("io.grpc", "grpc"),
    ("io.netty", "netty"),
    ("io.github.resilience4j", "resilience4j"),
    ("org.junit.jupiter", "junit-jupiter"),
    ("org.mockito", "mockito"),
    ("org.assertj", "assertj"),
    ("org.testcontainers", "testcontainers"),
    ("org.wiremock", "wiremock"),
    ("com.github.tomakehurst", "wiremock"),
    ("ch.qos.logback", "logback"),
    ("org.slf4j", "slf4j"),
    ("org.hibernate.orm", "hibernate"),
    ("org.hibernate.validator", "hibernate-validator"),
    ("org.postgresql", "postgresql"),
    ("com.h2database", "h2"),
    ("com.mysql", "mysql"),
    ("org.flywaydb", "flyway"),
    ("org.liquibase", "liquibase"),
    ("software.amazon.awssdk", "aws"),
    ("com.amazonaws", "aws-classic"),
    ("org.projectlombok", "lombok"),
    ("org.mapstruct", "mapstruct"),
    ("com.google.guava", "guava"),
    ("jakarta.", "jakarta"),
    ("javax.", "javax"),
];

/// First alias segments Gradle reserves for its own accessors.
const RESERVED_SEGMENTS: &[&str] = &["bundles", "versions", "plugins"];

const PLUGIN_SUFFIXES: &[&str] = &["-gradle-plugin", "-maven-plugin", "-plugin", "-maven"];

/// Lowercase kebab-case restricted to `[a-z0-9-]`, starting with a letter.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    let first_segment = trimmed.split('-').next().unwrap_or_default();
    if trimmed.is_empty() {
        "lib".to_string()
    } else if !trimmed.starts_with(|c: char| c.is_ascii_alphabetic())
        || RESERVED_SEGMENTS.contains(&first_segment)
    {
        format!("lib-{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Readable prefix for a groupId: the table entry or its last segment.
pub fn group_prefix(group_id: &str) -> String {
    GROUP_PREFIXES
        .iter()
        .find(|(group, _)| group_id.starts_with(group))
        .map_or_else(
            || sanitize(group_id.rsplit('.').next().unwrap_or(group_id)),
            |(_, prefix)| (*prefix).to_string(),
        )
}

/// `prefix-artifact`, unless the artifact already starts with the prefix.
fn prefixed(prefix: &str, artifact_id: &str) -> String {
    let artifact = sanitize(artifact_id);
    if artifact == prefix || artifact.starts_with(&format!("{prefix}-")) {
        artifact
    } else {
        sanitize(&format!("{prefix}-{artifact}"))
    }
}

/// Assigns one alias per coordinate. Coordinates must be distinct.
pub fn assign_aliases(coordinates: &[(&str, &str)]) -> Vec<String> {
    let mut aliases: Vec<String> = coordinates
        .iter()
        .map(|(_, artifact)| sanitize(artifact))
        .collect();

    let strategies: [&dyn Fn(&str, &str) -> String; 2] = [
        &|group, artifact| prefixed(&group_prefix(group), artifact),
        &|group, artifact| sanitize(&format!("{group}-{artifact}")),
    ];
    for strategy in strategies {
        for index in colliding(&aliases) {
            let (group, artifact) = coordinates[index];
            aliases[index] = strategy(group, artifact);
        }
    }

    for index in colliding(&aliases) {
        let mut n = 2;
        while aliases.contains(&format!("{}-{n}", aliases[index])) {
            n += 1;
        }
        aliases[index] = format!("{}-{n}", aliases[index]);
    }
    aliases
}

/// Indexes of every alias that occurs more than once.
fn colliding(aliases: &[String]) -> Vec<usize> {
    let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, alias) in aliases.iter().enumerate() {
        seen.entry(alias.as_str()).or_default().push(index);
    }
    let mut out: Vec<usize> = seen
        .into_values()
        .filter(|indexes| indexes.len() > 1)
        .flatten()
        .collect();
    out.sort_unstable();
    out
}

/// Alias for a Maven plugin: its artifactId without the plugin suffix.
pub fn plugin_alias(artifact_id: &str) -> String {
    let mut name = artifact_id;
    for suffix in PLUGIN_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
        }
    }
    sanitize(name)
}

/// Dotted accessor path: `spring-boot-starter` becomes `spring.boot.starter`.
pub fn accessor_path(alias: &str) -> String {
    alias.replace(['-', '_'], ".")
}

/// Whether `alias` is also a group of other aliases, which makes Gradle
/// expose it through `.asProvider()`.
pub fn needs_provider<'a>(alias: &str, others: impl IntoIterator<Item = &'a str>) -> bool {
    let path = format!("{}.", accessor_path(alias));
    others
        .into_iter()
        .any(|other| accessor_path(other).starts_with(&path))
}
