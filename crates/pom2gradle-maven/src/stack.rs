//! Tech stack detection over an effective module view.
//!
//! Detection is best-effort and never fails: attributes that cannot be read
//! from the POM come back as [`Detection::Assumed`] so the generator can
//! flag them for manual review.

use crate::effective::EffectiveModule;
use crate::types::{DEFAULT_PLUGIN_GROUP, Scope};
use serde::Serialize;

/// Language level used when nothing in the POM names one.
pub const DEFAULT_JAVA_VERSION: &str = "17";

pub const SPRING_BOOT_GROUP: &str = "org.springframework.boot";
pub const SPRING_BOOT_STARTER_PARENT: &str = "spring-boot-starter-parent";
pub const SPRING_BOOT_MAVEN_PLUGIN: &str = "spring-boot-maven-plugin";
pub const SPRING_BOOT_DEPENDENCIES: &str = "spring-boot-dependencies";
pub const SPRING_BOOT_DEVTOOLS: &str = "spring-boot-devtools";

pub const KOTLIN_GROUP: &str = "org.jetbrains.kotlin";
pub const KOTLIN_MAVEN_PLUGIN: &str = "kotlin-maven-plugin";

const COMPILER_PLUGIN: &str = "maven-compiler-plugin";

const LANGUAGE_LEVEL_PROPERTIES: &[&str] = &[
    "java.version",
    "maven.compiler.release",
    "maven.compiler.source",
    "maven.compiler.target",
    "jdk.version",
    "java.source.version",
];

/// Coordinates recognized as annotation processors.
pub const KNOWN_PROCESSORS: &[(&str, &str)] = &[
    ("org.projectlombok", "lombok"),
    ("org.mapstruct", "mapstruct-processor"),
    ("org.hibernate", "hibernate-jpamodelgen"),
    ("org.hibernate.orm", "hibernate-jpamodelgen"),
    (SPRING_BOOT_GROUP, "spring-boot-configuration-processor"),
    (SPRING_BOOT_GROUP, "spring-boot-autoconfigure-processor"),
    ("com.google.auto.value", "auto-value"),
    ("org.immutables", "value"),
    ("com.google.dagger", "dagger-compiler"),
    ("io.micronaut", "micronaut-inject-java"),
];

pub fn is_known_processor(group_id: &str, artifact_id: &str) -> bool {
    KNOWN_PROCESSORS
        .iter()
        .any(|(g, a)| *g == group_id && *a == artifact_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Kotlin,
}

/// A detected attribute, or the fallback used in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection<T> {
    Detected(T),
    Assumed(T),
}

impl<T> Detection<T> {
    pub const fn value(&self) -> &T {
        match self {
            Self::Detected(v) | Self::Assumed(v) => v,
        }
    }

    pub const fn is_assumed(&self) -> bool {
        matches!(self, Self::Assumed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpringBoot {
    /// Boot version pinned in the catalog; `None` when no source names it.
    pub version: Option<String>,
    /// `spring-boot-starter-parent` appears in the parent chain.
    pub starter_parent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorOrigin {
    /// A regular dependency in the given scope.
    Dependency(Scope),
    /// Listed only in `maven-compiler-plugin` `annotationProcessorPaths`.
    CompilerPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationProcessor {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub origin: ProcessorOrigin,
}

impl AnnotationProcessor {
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDescriptor {
    pub language: Language,
    pub kotlin_version: Option<String>,
    /// Java language level, `1.x` normalized to `x`.
    pub java_version: Detection<String>,
    pub spring_boot: Option<SpringBoot>,
    pub annotation_processors: Vec<AnnotationProcessor>,
}

impl StackDescriptor {
    pub fn is_kotlin(&self) -> bool {
        self.language == Language::Kotlin
    }

    pub fn is_processor(&self, group_id: &str, artifact_id: &str) -> bool {
        self.annotation_processors
            .iter()
            .any(|p| p.group_id == group_id && p.artifact_id == artifact_id)
    }
}

/// Derives the stack descriptor of one module.
pub fn detect(view: &EffectiveModule<'_>) -> StackDescriptor {
    let kotlin_plugin = view.plugin(KOTLIN_GROUP, KOTLIN_MAVEN_PLUGIN);
    let kotlin_stdlib = view.dependencies.iter().find(|d| {
        d.dependency.group_id == KOTLIN_GROUP && d.dependency.artifact_id.starts_with("kotlin-stdlib")
    });
    let is_kotlin = kotlin_plugin.is_some() || kotlin_stdlib.is_some();

    let kotlin_version = is_kotlin
        .then(|| {
            kotlin_plugin
                .and_then(|p| p.version.clone())
                .or_else(|| view.property("kotlin.version").map(str::to_string))
                .or_else(|| view.property("kotlin-version").map(str::to_string))
                .or_else(|| kotlin_stdlib.and_then(|d| d.version.resolved().map(str::to_string)))
        })
        .flatten();

    let descriptor = StackDescriptor {
        language: if is_kotlin {
            Language::Kotlin
        } else {
            Language::Java
        },
        kotlin_version,
        java_version: detect_java_version(view),
        spring_boot: detect_spring_boot(view),
        annotation_processors: detect_processors(view),
    };

    tracing::debug!(
        module = %view.coordinate(),
        language = ?descriptor.language,
        java = %descriptor.java_version.value(),
        spring_boot = descriptor.spring_boot.is_some(),
        processors = descriptor.annotation_processors.len(),
        "detected stack"
    );
    descriptor
}

/// `1.8` becomes `8`; anything else is kept.
pub fn normalize_java_version(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_prefix("1.") {
        Some(rest) if !rest.is_empty() && rest.len() <= 2 && rest.chars().all(|c| c.is_ascii_digit()) => {
            rest.to_string()
        }
        _ => raw.to_string(),
    }
}

fn detect_java_version(view: &EffectiveModule<'_>) -> Detection<String> {
    let from_properties = LANGUAGE_LEVEL_PROPERTIES
        .iter()
        .filter_map(|name| view.property(name))
        .find(|value| !value.is_empty() && !value.contains("${"));
    if let Some(value) = from_properties {
        return Detection::Detected(normalize_java_version(value));
    }

    if let Some(compiler) = view.plugin(DEFAULT_PLUGIN_GROUP, COMPILER_PLUGIN) {
        for key in ["release", "source", "target"] {
            if let Some(raw) = compiler.configuration.get(key) {
                let value = view.interpolate(raw);
                if value.is_complete() && !value.value.is_empty() {
                    return Detection::Detected(normalize_java_version(&value.value));
                }
            }
        }
    }

    if let Some(target) = view.property("kotlin.compiler.jvmTarget") {
        return Detection::Detected(normalize_java_version(target));
    }

    Detection::Assumed(DEFAULT_JAVA_VERSION.to_string())
}

fn detect_spring_boot(view: &EffectiveModule<'_>) -> Option<SpringBoot> {
    let starter_parent = view
        .parent_chain
        .iter()
        .find(|p| p.group_id == SPRING_BOOT_GROUP && p.artifact_id == SPRING_BOOT_STARTER_PARENT);
    let plugin = view.plugin(SPRING_BOOT_GROUP, SPRING_BOOT_MAVEN_PLUGIN);
    if starter_parent.is_none() && plugin.is_none() {
        return None;
    }

    let resolved = |raw: &str| {
        let value = view.interpolate(raw);
        value.is_complete().then_some(value.value)
    };
    let bom_version = view
        .boms
        .iter()
        .find(|b| {
            b.dependency.group_id == SPRING_BOOT_GROUP
                && b.dependency.artifact_id == SPRING_BOOT_DEPENDENCIES
        })
        .and_then(|b| b.version.resolved().map(str::to_string));

    let version = starter_parent
        .and_then(|p| p.version.as_deref())
        .and_then(resolved)
        .or_else(|| plugin.and_then(|p| p.version.as_deref()).and_then(resolved))
        .or(bom_version)
        .or_else(|| view.property("spring-boot.version").and_then(resolved));

    Some(SpringBoot {
        version,
        starter_parent: starter_parent.is_some(),
    })
}

fn detect_processors(view: &EffectiveModule<'_>) -> Vec<AnnotationProcessor> {
    let mut processors: Vec<AnnotationProcessor> = view
        .dependencies
        .iter()
        .filter(|d| is_known_processor(&d.dependency.group_id, &d.dependency.artifact_id))
        .map(|d| AnnotationProcessor {
            group_id: d.dependency.group_id.clone(),
            artifact_id: d.dependency.artifact_id.clone(),
            version: d.version.resolved().map(str::to_string),
            origin: ProcessorOrigin::Dependency(d.dependency.scope),
        })
        .collect();

    let Some(compiler) = view.plugin(DEFAULT_PLUGIN_GROUP, COMPILER_PLUGIN) else {
        return processors;
    };

    let mut paths: Vec<[Option<String>; 3]> = Vec::new();
    for (key, value) in compiler.configuration.iter() {
        let Some(rest) = key.strip_prefix("annotationProcessorPaths.") else {
            continue;
        };
        let slot = match rest.rsplit_once('.').map(|(_, field)| field) {
            Some("groupId") => 0,
            Some("artifactId") => 1,
            Some("version") => 2,
            _ => continue,
        };
        match paths.last_mut() {
            Some(current) if current[slot].is_none() => current[slot] = Some(value.to_string()),
            _ => {
                let mut next = [None, None, None];
                next[slot] = Some(value.to_string());
                paths.push(next);
            }
        }
    }

    for [group_id, artifact_id, version] in paths {
        let (Some(group_id), Some(artifact_id)) = (group_id, artifact_id) else {
            continue;
        };
        let group_id = view.interpolate(&group_id).value;
        let artifact_id = view.interpolate(&artifact_id).value;
        if processors
            .iter()
            .any(|p| p.group_id == group_id && p.artifact_id == artifact_id)
        {
            continue;
        }
        let version = version
            .map(|v| view.interpolate(&v))
            .and_then(|v| v.is_complete().then_some(v.value))
            .or_else(|| view.managed.get(&format!("{group_id}:{artifact_id}")).cloned());
        processors.push(AnnotationProcessor {
            group_id,
            artifact_id,
            version,
            origin: ProcessorOrigin::CompilerPath,
        });
    }
    processors
}
