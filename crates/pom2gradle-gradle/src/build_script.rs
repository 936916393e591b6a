//! `build.gradle.kts` generation for one module.
//!
//! Dependencies always go through catalog accessors or `project(...)`
//! references. Maven features with no direct Gradle counterpart (unmapped
//! plugins, profiles) are kept as inert comments and reported as advisories.

use crate::catalog::{
    DEPENDENCY_MANAGEMENT_PLUGIN_ID, KOTLIN_JVM_PLUGIN_ID, KOTLIN_SPRING_PLUGIN_ID,
    SPRING_BOOT_PLUGIN_ID, VersionCatalog,
};
use crate::error::Result;
use crate::kts::{KtsWriter, string_literal};
use crate::mapping::{GradlePlugin, PluginMapping, plugin_mapping, render_template, scope_configuration};
use crate::project::{ModulePlan, Project};
use crate::settings::custom_repositories;
use pom2gradle_core::{Advisory, MigrationMode};
use pom2gradle_maven::stack::{
    DEFAULT_JAVA_VERSION, KOTLIN_GROUP, KOTLIN_MAVEN_PLUGIN, SPRING_BOOT_DEVTOOLS,
    SPRING_BOOT_GROUP, SPRING_BOOT_MAVEN_PLUGIN,
};
use pom2gradle_maven::{
    Dependency, Exclusion, Plugin, ProcessorOrigin, Profile, ResolvedDependency, Scope,
};

/// Generated script text and the advisories raised while writing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildScript {
    pub contents: String,
    pub advisories: Vec<Advisory>,
}

pub fn generate_build_script(
    project: &Project<'_>,
    plan: &ModulePlan<'_>,
    catalog: &VersionCatalog,
    mode: MigrationMode,
) -> Result<BuildScript> {
    let mut generator = ScriptGenerator {
        project,
        plan,
        catalog,
        w: KtsWriter::default(),
        advisories: Vec::new(),
    };
    generator.header(mode);
    generator.plugins()?;
    generator.coordinates();
    generator.toolchain();
    generator.repositories();
    generator.dependencies()?;
    generator.tests();
    generator.plugin_templates();
    generator.plugin_notes();
    generator.profiles();

    tracing::debug!(module = %plan.gradle_path(), "generated build script");
    Ok(BuildScript {
        contents: generator.w.finish(),
        advisories: generator.advisories,
    })
}

struct ScriptGenerator<'g, 'a> {
    project: &'g Project<'a>,
    plan: &'g ModulePlan<'a>,
    catalog: &'g VersionCatalog,
    w: KtsWriter,
    advisories: Vec<Advisory>,
}

impl ScriptGenerator<'_, '_> {
    fn is_root(&self) -> bool {
        self.plan.view.module.is_root
    }

    fn has_children(&self) -> bool {
        !self.project.tree.children(self.plan.id()).is_empty()
    }

    fn builds_code(&self) -> bool {
        !self.plan.is_aggregator()
    }

    fn uses_boot(&self) -> bool {
        self.plan.stack.spring_boot.is_some()
    }

    fn header(&mut self, mode: MigrationMode) {
        self.w.comment("Generated by pom2gradle from pom.xml.");
        match mode {
            MigrationMode::Full => self
                .w
                .comment("Verify the Gradle build, then delete pom.xml."),
            MigrationMode::Overlay => self
                .w
                .comment("pom.xml stays authoritative; regenerate this file after changing it."),
        }
        self.w.blank();
    }

    fn plugins(&mut self) -> Result<()> {
        let mut lines = Vec::new();
        let mut ids: Vec<&str> = Vec::new();

        if self.builds_code() {
            if self.plan.stack.is_kotlin() {
                lines.push(format!("alias({})", self.catalog.plugin_accessor(KOTLIN_JVM_PLUGIN_ID)?));
                ids.push(KOTLIN_JVM_PLUGIN_ID);
                if self.uses_boot() {
                    lines.push(format!(
                        "alias({})",
                        self.catalog.plugin_accessor(KOTLIN_SPRING_PLUGIN_ID)?
                    ));
                    ids.push(KOTLIN_SPRING_PLUGIN_ID);
                }
            } else {
                lines.push("java".to_string());
            }
            match self.plan.view.packaging.as_str() {
                "war" => lines.push("war".to_string()),
                "ear" => lines.push("ear".to_string()),
                _ => {}
            }
            if self.uses_boot() {
                for id in [SPRING_BOOT_PLUGIN_ID, DEPENDENCY_MANAGEMENT_PLUGIN_ID] {
                    lines.push(format!("alias({})", self.catalog.plugin_accessor(id)?));
                    ids.push(id);
                }
            }
            for (_, gradle) in applied_plugins(self.plan) {
                if gradle.is_core() {
                    if !lines.iter().any(|l| l == gradle.id) {
                        lines.push(format!("id({})", string_literal(gradle.id)));
                    }
                } else {
                    lines.push(format!("alias({})", self.catalog.plugin_accessor(gradle.id)?));
                    ids.push(gradle.id);
                }
            }
        }

        if self.is_root() && self.has_children() {
            for plugin in self.catalog.plugins() {
                if !ids.contains(&plugin.id.as_str()) {
                    lines.push(format!(
                        "alias({}) apply false",
                        self.catalog.plugin_accessor(&plugin.id)?
                    ));
                }
            }
        }

        if !lines.is_empty() {
            self.w.open("plugins");
            for line in lines {
                self.w.line(line);
            }
            self.w.close();
            self.w.blank();
        }
        Ok(())
    }

    fn coordinates(&mut self) {
        let view = &self.plan.view;
        if self.is_root() {
            if self.has_children() {
                self.w.open("allprojects");
            }
            self.w.line(format!("group = {}", string_literal(&view.group_id)));
            if let Some(version) = &view.version {
                self.w.line(format!("version = {}", string_literal(version)));
            }
            if self.has_children() {
                self.w.close();
            }
        } else if let Some(root) = self.project.root() {
            if root.view.group_id != view.group_id {
                self.w.line(format!("group = {}", string_literal(&view.group_id)));
            }
            if let Some(version) = &view.version
                && root.view.version.as_ref() != Some(version)
            {
                self.w.line(format!("version = {}", string_literal(version)));
            }
        }
        if let Some(description) = &view.module.description {
            let description = view.interpolate(description).value;
            let description = description.split_whitespace().collect::<Vec<_>>().join(" ");
            self.w.line(format!("description = {}", string_literal(&description)));
        }
        self.w.blank();
    }

    fn toolchain(&mut self) {
        if !self.builds_code() {
            return;
        }
        let java = &self.plan.stack.java_version;
        if java.is_assumed() {
            self.w.comment(format!(
                "TODO: no Java level is declared in the POM; {DEFAULT_JAVA_VERSION} is assumed."
            ));
            self.advisories.push(Advisory::UnknownStackAttribute {
                module: self.plan.name().to_string(),
                attribute: "Java version".into(),
                assumed: DEFAULT_JAVA_VERSION.into(),
            });
        }
        self.w.open("java");
        self.w.open("toolchain");
        self.w
            .line(format!("languageVersion = JavaLanguageVersion.of({})", java.value()));
        self.w.close();
        self.w.close();
        self.w.blank();

        if self.plan.stack.is_kotlin() {
            self.w.open("kotlin");
            self.w.open("compilerOptions");
            self.w.line("freeCompilerArgs.addAll(\"-Xjsr305=strict\")");
            self.w.close();
            self.w.close();
            self.w.blank();
        }

        if self.plan.stack.is_kotlin() && !self.plan.stack.annotation_processors.is_empty() {
            self.w.open("configurations");
            self.w.open("compileOnly");
            self.w.line("extendsFrom(configurations.annotationProcessor.get())");
            self.w.close();
            self.w.close();
            self.w.blank();
        }
    }

    fn repositories(&mut self) {
        if !self.is_root() || !custom_repositories(self.project).is_empty() {
            return;
        }
        if self.builds_code() {
            self.w.open("repositories");
            self.w.line("mavenCentral()");
            self.w.close();
            self.w.blank();
        }
        if self.has_children() {
            self.w.open("subprojects");
            self.w.open("repositories");
            self.w.line("mavenCentral()");
            self.w.close();
            self.w.close();
            self.w.blank();
        }
    }

    /// `project(":x")` for in-tree modules, a catalog accessor otherwise.
    fn notation(&self, dep: &Dependency) -> Result<String> {
        if let Some(id) = self.project.module_for(&dep.group_id, &dep.artifact_id) {
            let path = self.project.tree.module(id).gradle_path();
            return Ok(format!("project({})", string_literal(&path)));
        }
        if dep.scope == Scope::System
            && let Some(path) = &dep.system_path
        {
            let relative = ["${project.basedir}/", "${basedir}/"]
                .iter()
                .find_map(|prefix| path.strip_prefix(prefix))
                .unwrap_or(path);
            return Ok(format!("files({})", string_literal(relative)));
        }
        let accessor = self.catalog.library_accessor(&dep.group_id, &dep.artifact_id)?;
        Ok(match &dep.classifier {
            Some(classifier) => format!(
                "variantOf({accessor}) {{ classifier({}) }}",
                string_literal(classifier)
            ),
            None => accessor,
        })
    }

    /// Configuration for the library itself. Processors additionally get an
    /// `annotationProcessor` line, see `dependencies`.
    fn configuration(&self, dep: &Dependency) -> &'static str {
        if self.uses_boot() && dep.group_id == SPRING_BOOT_GROUP && dep.artifact_id == SPRING_BOOT_DEVTOOLS {
            "developmentOnly"
        } else if dep.optional && dep.scope == Scope::Compile {
            "compileOnly"
        } else {
            scope_configuration(dep.scope)
                .configuration()
                .unwrap_or("implementation")
        }
    }

    fn dependencies(&mut self) -> Result<()> {
        if !self.builds_code() {
            return Ok(());
        }
        let view = &self.plan.view;
        let mut block = KtsWriter::default();
        let mut processor_notations = Vec::new();

        for bom in &view.boms {
            let notation = self.notation(&bom.dependency)?;
            block.line(format!("implementation(platform({notation}))"));
        }

        for resolved in &view.dependencies {
            let dep = &resolved.dependency;
            let notation = self.notation(dep)?;
            if dep.is_bom_import() {
                block.line(format!("implementation(platform({notation}))"));
                continue;
            }
            if dep.scope == Scope::System
                && let Some(path) = &dep.system_path
            {
                block.comment(format!("system scope: {path}"));
            }
            write_declaration(&mut block, self.configuration(dep), &notation, resolved);

            if self.plan.stack.is_processor(&dep.group_id, &dep.artifact_id) {
                let processor_config = if dep.scope == Scope::Test {
                    "testAnnotationProcessor"
                } else {
                    "annotationProcessor"
                };
                block.line(format!("{processor_config}({notation})"));
                processor_notations.push(notation);
            }
        }

        for processor in &self.plan.stack.annotation_processors {
            if processor.origin != ProcessorOrigin::CompilerPath {
                continue;
            }
            let notation = self
                .catalog
                .library_accessor(&processor.group_id, &processor.artifact_id)?;
            if !processor_notations.contains(&notation) {
                block.line(format!("annotationProcessor({notation})"));
            }
        }

        let body = block.finish();
        if !body.is_empty() {
            self.w.open("dependencies");
            for line in body.lines() {
                self.w.line(line);
            }
            self.w.close();
            self.w.blank();
        }
        Ok(())
    }

    fn tests(&mut self) {
        let deps = &self.plan.view.dependencies;
        if !self.builds_code() || !deps.iter().any(|d| d.dependency.scope == Scope::Test) {
            return;
        }
        let has = |group: &str, artifact: &str| {
            deps.iter()
                .any(|d| d.dependency.group_id == group && d.dependency.artifact_id == artifact)
        };
        let has_platform = deps.iter().any(|d| {
            d.dependency.group_id.starts_with("org.junit")
                || d.dependency.artifact_id == "spring-boot-starter-test"
        });
        let runner = if has("junit", "junit") && !has_platform {
            "useJUnit()"
        } else {
            "useJUnitPlatform()"
        };
        self.w.open("tasks.withType<Test>");
        self.w.line(runner);
        self.w.close();
        self.w.blank();
    }

    fn plugin_templates(&mut self) {
        let plan = self.plan;
        for (plugin, gradle) in applied_plugins(plan) {
            if gradle.template.is_empty() {
                continue;
            }
            let rendered = render_template(gradle.template, &plugin.configuration, |raw| {
                plan.view.interpolate(raw)
            });
            for unresolved in rendered.unresolved {
                tracing::warn!(
                    module = %plan.name(),
                    plugin = %plugin.artifact_id,
                    option = %unresolved.option,
                    "unresolved plugin option"
                );
                let raw = unresolved.raw.split_whitespace().collect::<Vec<_>>().join(" ");
                self.w.comment(format!(
                    "TODO: {} option {} = {raw} references undefined properties; set it by hand.",
                    plugin.artifact_id, unresolved.option
                ));
                self.advisories.push(Advisory::UnresolvedOption {
                    module: plan.name().to_string(),
                    plugin: plugin.artifact_id.clone(),
                    option: unresolved.option,
                    raw: unresolved.raw,
                });
            }
            for line in rendered.lines {
                self.w.line(line);
            }
            self.w.blank();
        }
    }

    /// Comments for plugins declared in this module's own POM that are
    /// not applied as Gradle plugins.
    fn plugin_notes(&mut self) {
        let plan = self.plan;
        let mut notes = Vec::new();
        for resolved in &plan.view.plugins {
            let plugin = &resolved.plugin;
            if resolved.declared_in != self.plan.id() || is_stack_plugin(plugin) {
                continue;
            }
            match plugin_mapping(&plugin.group_id, &plugin.artifact_id) {
                PluginMapping::Plugin(_) => {}
                PluginMapping::Builtin(note) => {
                    notes.push(format!("{}: handled by {note}", plugin.artifact_id));
                }
                PluginMapping::NoEquivalent => {
                    let coordinate = plugin.coordinate();
                    tracing::warn!(module = %self.plan.name(), %coordinate, "unmapped Maven plugin");
                    notes.push(format!(
                        "TODO: Maven plugin {coordinate} has no known Gradle equivalent; port its configuration by hand."
                    ));
                    self.advisories.push(Advisory::UnmappedPlugin {
                        module: self.plan.name().to_string(),
                        coordinate,
                    });
                }
            }
        }
        for note in notes {
            self.w.comment(note);
        }
        self.w.blank();
    }

    fn profiles(&mut self) {
        let plan = self.plan;
        let profiles = plan.view.profiles();
        if profiles.is_empty() {
            return;
        }
        self.w
            .comment("Maven profiles are not converted. Port each one by hand, for example");
        self.w
            .comment("with a project property check around the affected declarations.");
        for profile in profiles {
            self.w.comment("");
            self.profile(profile);
            self.advisories.push(Advisory::ManualProfile {
                module: self.plan.name().to_string(),
                profile: profile.id.clone(),
            });
        }
        self.w.blank();
    }

    fn profile(&mut self, profile: &Profile) {
        let view = &self.plan.view;
        let activation = if profile.is_explicit_only() {
            format!("activated with -P {}", profile.id)
        } else {
            let conditions: Vec<String> = profile.activation.iter().map(ToString::to_string).collect();
            format!("activation: {}", conditions.join("; "))
        };
        self.w.comment(format!("Profile '{}' ({activation})", profile.id));

        for dep in &profile.dependencies {
            let group = view.interpolate(&dep.group_id).value;
            let artifact = view.interpolate(&dep.artifact_id).value;
            let config = scope_configuration(dep.scope)
                .configuration()
                .unwrap_or("platform");
            self.w.comment(format!("  dependency {group}:{artifact} -> {config}"));
            if let Some(base) = view.dependency(&group, &artifact) {
                let base_config = scope_configuration(base.dependency.scope)
                    .configuration()
                    .unwrap_or("platform");
                if base_config == config {
                    self.w.comment("    also declared by the base build");
                } else {
                    self.w.comment(format!(
                        "    replaces the base build's {base_config} while the profile is active"
                    ));
                }
            }
        }
        for plugin in &profile.plugins {
            self.w.comment(format!("  plugin {}", plugin.coordinate()));
        }
        for (key, value) in &profile.properties {
            self.w.comment(format!("  property {key} = {value}"));
        }
    }
}

/// Mapped plugins a module applies itself, in declaration order.
fn applied_plugins<'p>(plan: &'p ModulePlan<'_>) -> Vec<(&'p Plugin, &'static GradlePlugin)> {
    if plan.is_aggregator() {
        return Vec::new();
    }
    let mut applied: Vec<(&Plugin, &'static GradlePlugin)> = Vec::new();
    for resolved in &plan.view.plugins {
        let plugin = &resolved.plugin;
        if let PluginMapping::Plugin(gradle) = plugin_mapping(&plugin.group_id, &plugin.artifact_id)
            && !applied.iter().any(|(_, g)| g.id == gradle.id)
        {
            applied.push((plugin, gradle));
        }
    }
    applied
}

fn is_stack_plugin(plugin: &Plugin) -> bool {
    (plugin.group_id == SPRING_BOOT_GROUP && plugin.artifact_id == SPRING_BOOT_MAVEN_PLUGIN)
        || (plugin.group_id == KOTLIN_GROUP && plugin.artifact_id == KOTLIN_MAVEN_PLUGIN)
}

fn exclusion_line(exclusion: &Exclusion) -> String {
    match (exclusion.group_id.as_str(), exclusion.artifact_id.as_str()) {
        ("*", "*") => "isTransitive = false".to_string(),
        ("*", artifact) => format!("exclude(module = {})", string_literal(artifact)),
        (group, "*") => format!("exclude(group = {})", string_literal(group)),
        (group, artifact) => format!(
            "exclude(group = {}, module = {})",
            string_literal(group),
            string_literal(artifact)
        ),
    }
}

fn write_declaration(w: &mut KtsWriter, configuration: &str, notation: &str, resolved: &ResolvedDependency) {
    let exclusions = &resolved.dependency.exclusions;
    if exclusions.is_empty() {
        w.line(format!("{configuration}({notation})"));
        return;
    }
    w.open(format!("{configuration}({notation})"));
    for exclusion in exclusions {
        w.line(exclusion_line(exclusion));
    }
    w.close();
}
