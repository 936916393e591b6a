//! Version catalog (`gradle/libs.versions.toml`) assembly and validation.
//!
//! Every external coordinate referenced by any module becomes exactly one
//! catalog entry. When modules disagree on a version the highest one wins
//! and the losers are reported.

use crate::alias::{accessor_path, assign_aliases, needs_provider, plugin_alias};
use crate::error::{GradleError, Result};
use crate::mapping::{PluginMapping, plugin_mapping};
use crate::project::Project;
use pom2gradle_core::{Advisory, DeclaredVersion};
use pom2gradle_maven::{ProcessorOrigin, Scope, VersionSpec, compare_versions};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use toml_edit::{DocumentMut, InlineTable, Item, Table, Value, value};

pub const SPRING_BOOT_PLUGIN_ID: &str = "org.springframework.boot";
pub const DEPENDENCY_MANAGEMENT_PLUGIN_ID: &str = "io.spring.dependency-management";
pub const KOTLIN_JVM_PLUGIN_ID: &str = "org.jetbrains.kotlin.jvm";
pub const KOTLIN_SPRING_PLUGIN_ID: &str = "org.jetbrains.kotlin.plugin.spring";

const SPRING_BOOT_KEY: &str = "spring-boot";
const KOTLIN_KEY: &str = "kotlin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Library,
    /// Imported BOM, consumed through `platform(...)`.
    Platform,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub alias: String,
    pub group_id: String,
    pub artifact_id: String,
    pub kind: EntryKind,
    /// Key into `[versions]`; `None` when a platform supplies the version.
    pub version_ref: Option<String>,
    /// Placeholder that no module could resolve.
    pub unresolved: Option<String>,
    /// Lower versions declared elsewhere.
    pub overridden: Vec<DeclaredVersion>,
}

impl LibraryEntry {
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    pub alias: String,
    pub id: String,
    pub version_ref: Option<String>,
}

/// Entry counts of a validated catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub versions: usize,
    pub libraries: usize,
    pub plugins: usize,
}

/// One coordinate while occurrences are still being collected.
struct Candidate {
    group_id: String,
    artifact_id: String,
    kind: EntryKind,
    declared: Vec<DeclaredVersion>,
    unresolved: Option<(String, String)>,
}

#[derive(Default)]
struct Collector {
    candidates: Vec<Candidate>,
    index: HashMap<String, usize>,
}

impl Collector {
    fn record(
        &mut self,
        group_id: &str,
        artifact_id: &str,
        kind: EntryKind,
        version: &VersionSpec,
        module: &str,
    ) {
        let key = format!("{group_id}:{artifact_id}");
        let position = *self.index.entry(key).or_insert_with(|| {
            self.candidates.push(Candidate {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                kind,
                declared: Vec::new(),
                unresolved: None,
            });
            self.candidates.len() - 1
        });
        let candidate = &mut self.candidates[position];
        if kind == EntryKind::Platform {
            candidate.kind = EntryKind::Platform;
        }

        match version {
            VersionSpec::Declared(v) | VersionSpec::Managed(v) => {
                let declared = DeclaredVersion {
                    module: module.to_string(),
                    version: v.clone(),
                };
                if !candidate.declared.contains(&declared) {
                    candidate.declared.push(declared);
                }
            }
            VersionSpec::Unresolved(raw) => {
                if candidate.unresolved.is_none() {
                    candidate.unresolved = Some((module.to_string(), raw.clone()));
                }
            }
            VersionSpec::Platform => {}
        }
    }
}

/// The catalog shared by every module of the build.
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    versions: Vec<(String, String)>,
    libraries: Vec<LibraryEntry>,
    plugins: Vec<PluginEntry>,
    advisories: Vec<Advisory>,
}

impl VersionCatalog {
    /// Collects every external coordinate and plugin of the analyzed tree.
    pub fn build(project: &Project<'_>) -> Self {
        let mut catalog = Self::default();
        let mut collector = Collector::default();

        for plan in project.plans() {
            let view = &plan.view;
            let declaring = |id| project.tree.module(id).artifact_id.as_str();

            for bom in &view.boms {
                let dep = &bom.dependency;
                if project.module_for(&dep.group_id, &dep.artifact_id).is_some() {
                    continue;
                }
                collector.record(
                    &dep.group_id,
                    &dep.artifact_id,
                    EntryKind::Platform,
                    &bom.version,
                    declaring(bom.declared_in),
                );
            }

            for resolved in &view.dependencies {
                let dep = &resolved.dependency;
                if project.module_for(&dep.group_id, &dep.artifact_id).is_some()
                    || (dep.scope == Scope::System && dep.system_path.is_some())
                {
                    continue;
                }
                let kind = if dep.is_bom_import() {
                    EntryKind::Platform
                } else {
                    EntryKind::Library
                };
                collector.record(
                    &dep.group_id,
                    &dep.artifact_id,
                    kind,
                    &resolved.version,
                    declaring(resolved.declared_in),
                );
            }

            for processor in &plan.stack.annotation_processors {
                if processor.origin != ProcessorOrigin::CompilerPath {
                    continue;
                }
                let version = processor
                    .version
                    .clone()
                    .map_or(VersionSpec::Platform, VersionSpec::Declared);
                collector.record(
                    &processor.group_id,
                    &processor.artifact_id,
                    EntryKind::Library,
                    &version,
                    plan.name(),
                );
            }
        }

        let boot_version = project
            .plans()
            .iter()
            .find_map(|p| p.stack.spring_boot.as_ref()?.version.clone());
        let kotlin_version = project
            .plans()
            .iter()
            .find_map(|p| p.stack.kotlin_version.clone());
        let boot_key = boot_version.map(|v| catalog.add_version(SPRING_BOOT_KEY, &v));
        let kotlin_key = kotlin_version.map(|v| catalog.add_version(KOTLIN_KEY, &v));

        catalog.add_libraries(collector);

        let root_name = project.root().map_or("", |p| p.name()).to_string();
        if project.uses_spring_boot() {
            if boot_key.is_none() {
                catalog.advisories.push(Advisory::UnknownStackAttribute {
                    module: root_name.clone(),
                    attribute: "Spring Boot version".into(),
                    assumed: "an unversioned plugin entry".into(),
                });
            }
            catalog.add_plugin(SPRING_BOOT_KEY, SPRING_BOOT_PLUGIN_ID, boot_key.clone());
            catalog.add_plugin(
                "spring-dependency-management",
                DEPENDENCY_MANAGEMENT_PLUGIN_ID,
                None,
            );
        }
        if project.uses_kotlin() {
            if kotlin_key.is_none() {
                catalog.advisories.push(Advisory::UnknownStackAttribute {
                    module: root_name,
                    attribute: "Kotlin version".into(),
                    assumed: "an unversioned plugin entry".into(),
                });
            }
            catalog.add_plugin("kotlin-jvm", KOTLIN_JVM_PLUGIN_ID, kotlin_key.clone());
            let kotlin_spring = project
                .plans()
                .iter()
                .any(|p| p.stack.is_kotlin() && p.stack.spring_boot.is_some());
            if kotlin_spring {
                catalog.add_plugin("kotlin-spring", KOTLIN_SPRING_PLUGIN_ID, kotlin_key);
            }
        }

        for plan in project.plans() {
            for resolved in &plan.view.plugins {
                let plugin = &resolved.plugin;
                if let PluginMapping::Plugin(gradle) =
                    plugin_mapping(&plugin.group_id, &plugin.artifact_id)
                    && let Some(version) = gradle.version
                    && catalog.plugin(gradle.id).is_none()
                {
                    let alias = plugin_alias(&plugin.artifact_id);
                    let key = catalog.add_version(&alias, version);
                    catalog.add_plugin(&alias, gradle.id, Some(key));
                }
            }
        }

        tracing::debug!(
            libraries = catalog.libraries.len(),
            plugins = catalog.plugins.len(),
            "built version catalog"
        );
        catalog
    }

    fn add_libraries(&mut self, collector: Collector) {
        let coordinates: Vec<(&str, &str)> = collector
            .candidates
            .iter()
            .map(|c| (c.group_id.as_str(), c.artifact_id.as_str()))
            .collect();
        let aliases = assign_aliases(&coordinates);

        let mut entries = Vec::with_capacity(aliases.len());
        for (candidate, alias) in collector.candidates.iter().zip(aliases) {
            let coordinate = format!("{}:{}", candidate.group_id, candidate.artifact_id);
            let mut entry = LibraryEntry {
                alias,
                group_id: candidate.group_id.clone(),
                artifact_id: candidate.artifact_id.clone(),
                kind: candidate.kind,
                version_ref: None,
                unresolved: None,
                overridden: Vec::new(),
            };

            let chosen = candidate
                .declared
                .iter()
                .map(|d| d.version.as_str())
                .max_by(|a, b| compare_versions(a, b));
            if let Some(chosen) = chosen {
                entry.overridden = candidate
                    .declared
                    .iter()
                    .filter(|d| compare_versions(&d.version, chosen) != Ordering::Equal)
                    .cloned()
                    .collect();
                if !entry.overridden.is_empty() {
                    tracing::warn!(%coordinate, chosen, "conflicting versions declared");
                    self.advisories.push(Advisory::VersionOverride {
                        coordinate,
                        chosen: chosen.to_string(),
                        overridden: entry.overridden.clone(),
                    });
                }
                let key = entry.alias.clone();
                entry.version_ref = Some(self.add_version(&key, chosen));
            } else if let Some((module, raw)) = &candidate.unresolved {
                self.advisories.push(Advisory::UnresolvedVersion {
                    module: module.clone(),
                    coordinate,
                    raw: raw.clone(),
                });
                entry.unresolved = Some(raw.clone());
            }
            entries.push(entry);
        }
        self.libraries = entries;
    }

    /// Registers `value` under `key`, reusing an equal entry and
    /// suffixing the key when another value already holds it.
    fn add_version(&mut self, key: &str, value: &str) -> String {
        let mut candidate = key.to_string();
        let mut n = 1;
        loop {
            match self.versions.iter().find(|(k, _)| *k == candidate) {
                None => {
                    self.versions.push((candidate.clone(), value.to_string()));
                    return candidate;
                }
                Some((_, existing)) if existing == value => return candidate,
                Some(_) => {
                    n += 1;
                    candidate = format!("{key}-v{n}");
                }
            }
        }
    }

    fn add_plugin(&mut self, alias: &str, id: &str, version_ref: Option<String>) {
        if self.plugin(id).is_some() {
            return;
        }
        let mut unique = alias.to_string();
        let mut n = 1;
        while self.plugins.iter().any(|p| p.alias == unique) {
            n += 1;
            unique = format!("{alias}-{n}");
        }
        self.plugins.push(PluginEntry {
            alias: unique,
            id: id.to_string(),
            version_ref,
        });
    }

    pub fn versions(&self) -> &[(String, String)] {
        &self.versions
    }

    pub fn version(&self, key: &str) -> Option<&str> {
        self.versions
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn libraries(&self) -> &[LibraryEntry] {
        &self.libraries
    }

    pub fn plugins(&self) -> &[PluginEntry] {
        &self.plugins
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn library(&self, group_id: &str, artifact_id: &str) -> Option<&LibraryEntry> {
        self.libraries
            .iter()
            .find(|l| l.group_id == group_id && l.artifact_id == artifact_id)
    }

    pub fn plugin(&self, id: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|p| p.id == id)
    }

    /// Kotlin DSL accessor, e.g. `libs.jackson.databind`.
    pub fn library_accessor(&self, group_id: &str, artifact_id: &str) -> Result<String> {
        let entry = self
            .library(group_id, artifact_id)
            .ok_or_else(|| GradleError::MissingAlias {
                coordinate: format!("{group_id}:{artifact_id}"),
            })?;
        let others = self.libraries.iter().map(|l| l.alias.as_str());
        Ok(accessor("libs", &entry.alias, others))
    }

    /// Kotlin DSL accessor, e.g. `libs.plugins.spring.boot`.
    pub fn plugin_accessor(&self, id: &str) -> Result<String> {
        let entry = self.plugin(id).ok_or_else(|| GradleError::MissingAlias {
            coordinate: id.to_string(),
        })?;
        let others = self.plugins.iter().map(|p| p.alias.as_str());
        Ok(accessor("libs.plugins", &entry.alias, others))
    }

    /// Renders the catalog as TOML.
    pub fn to_toml(&self) -> String {
        let mut doc = DocumentMut::new();

        let mut versions = Table::new();
        versions.decor_mut().set_prefix("# Generated by pom2gradle.\n\n");
        for (key, version) in &self.versions {
            versions.insert(key, value(version.as_str()));
        }
        doc.insert("versions", Item::Table(versions));

        let mut libraries = Table::new();
        libraries.decor_mut().set_prefix("\n");
        for entry in &self.libraries {
            let mut notes = Vec::new();
            if !entry.overridden.is_empty() {
                let chosen = entry
                    .version_ref
                    .as_deref()
                    .and_then(|key| self.version(key))
                    .unwrap_or_default();
                let losers: Vec<String> = entry
                    .overridden
                    .iter()
                    .map(|d| format!("{} ({})", d.version, d.module))
                    .collect();
                notes.push(format!("{chosen} overrides {}", losers.join(", ")));
            }
            if let Some(raw) = &entry.unresolved {
                notes.push(format!(
                    "TODO: version {raw} could not be resolved; pin one here or import a platform"
                ));
            }

            let mut fields = InlineTable::new();
            fields.insert("group", entry.group_id.as_str().into());
            fields.insert("name", entry.artifact_id.as_str().into());
            if let Some(key) = &entry.version_ref {
                fields.insert("version", version_ref_table(key));
            }
            libraries.insert(&entry.alias, value(fields));
            if !notes.is_empty()
                && let Some(mut key) = libraries.key_mut(&entry.alias)
            {
                key.leaf_decor_mut().set_prefix(comment_lines(&notes));
            }
        }
        doc.insert("libraries", Item::Table(libraries));

        if !self.plugins.is_empty() {
            let mut plugins = Table::new();
            plugins.decor_mut().set_prefix("\n");
            for plugin in &self.plugins {
                let mut fields = InlineTable::new();
                fields.insert("id", plugin.id.as_str().into());
                if let Some(key) = &plugin.version_ref {
                    fields.insert("version", version_ref_table(key));
                }
                plugins.insert(&plugin.alias, value(fields));
            }
            doc.insert("plugins", Item::Table(plugins));
        }
        doc.to_string()
    }
}

/// `version.ref = "key"` as a dotted inline entry.
fn version_ref_table(key: &str) -> Value {
    let mut reference = InlineTable::new();
    reference.insert("ref", key.into());
    reference.set_dotted(true);
    Value::InlineTable(reference)
}

/// `# ...` lines for a key prefix. Control characters are blanked so a
/// comment never spills onto the next line.
fn comment_lines(notes: &[String]) -> String {
    notes
        .iter()
        .map(|note| {
            let flat: String = note
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            format!("# {flat}\n")
        })
        .collect()
}

fn accessor<'a>(namespace: &str, alias: &str, others: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = format!("{namespace}.{}", accessor_path(alias));
    if needs_provider(alias, others) {
        out.push_str(".asProvider()");
    }
    out
}

/// Parses a rendered catalog and checks that every entry is well formed
/// and every `version.ref` names a declared version.
pub fn validate_catalog(content: &str) -> Result<CatalogSummary> {
    let doc: DocumentMut =
        content
            .parse()
            .map_err(|e: toml_edit::TomlError| GradleError::InvalidCatalog {
                message: e.to_string(),
            })?;

    let mut summary = CatalogSummary::default();
    let mut versions = HashSet::new();
    if let Some(table) = doc.get("versions").and_then(|item| item.as_table()) {
        for (key, item) in table {
            if item.as_str().is_none() {
                return Err(invalid(format!("versions.{key} is not a string")));
            }
            versions.insert(key.to_string());
        }
        summary.versions = versions.len();
    }

    for (section, required) in [("libraries", ["group", "name"]), ("plugins", ["id", "id"])] {
        let Some(table) = doc.get(section).and_then(|item| item.as_table()) else {
            continue;
        };
        for (alias, item) in table {
            let Some(entry) = item.as_inline_table() else {
                return Err(invalid(format!("{section}.{alias} is not an inline table")));
            };
            if let Some(missing) = required.iter().find(|k| entry.get(k).is_none()) {
                return Err(invalid(format!("{section}.{alias} has no {missing}")));
            }
            if let Some(key) = version_ref(entry)
                && !versions.contains(key)
            {
                return Err(invalid(format!(
                    "{section}.{alias} references unknown version '{key}'"
                )));
            }
            match section {
                "libraries" => summary.libraries += 1,
                _ => summary.plugins += 1,
            }
        }
    }
    Ok(summary)
}

fn version_ref(entry: &toml_edit::InlineTable) -> Option<&str> {
    entry.get("version")?.as_inline_table()?.get("ref")?.as_str()
}

fn invalid(message: String) -> GradleError {
    GradleError::InvalidCatalog { message }
}
