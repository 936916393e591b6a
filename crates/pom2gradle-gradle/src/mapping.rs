//! Maven to Gradle lookup tables.

use crate::kts::escape_string;
use pom2gradle_maven::{Interpolated, Scope};
use pom2gradle_maven::types::{DEFAULT_PLUGIN_GROUP, PluginConfiguration};
use regex::Regex;
use std::sync::OnceLock;

/// Gradle counterpart of a Maven scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationMapping {
    Configuration(&'static str),
    /// `import` scope: the coordinate is a BOM, declared through `platform(...)`.
    Platform,
}

impl ConfigurationMapping {
    pub const fn configuration(self) -> Option<&'static str> {
        match self {
            Self::Configuration(name) => Some(name),
            Self::Platform => None,
        }
    }
}

/// Total over [`Scope`].
pub const fn scope_configuration(scope: Scope) -> ConfigurationMapping {
    match scope {
        Scope::Compile => ConfigurationMapping::Configuration("implementation"),
        Scope::Provided | Scope::System => ConfigurationMapping::Configuration("compileOnly"),
        Scope::Runtime => ConfigurationMapping::Configuration("runtimeOnly"),
        Scope::Test => ConfigurationMapping::Configuration("testImplementation"),
        Scope::Import => ConfigurationMapping::Platform,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct GradlePlugin {
    pub id: &'static str,
    /// `None` for plugins shipped with Gradle.
    pub version: Option<&'static str>,
    /// Build script lines; `{option}` is filled from the Maven configuration.
    pub template: &'static [&'static str],
}

impl GradlePlugin {
    pub const fn is_core(&self) -> bool {
        self.version.is_none()
    }
}

/// Outcome of looking up a Maven plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginMapping {
    Plugin(&'static GradlePlugin),
    /// Gradle covers the plugin's job out of the box; the note says how.
    Builtin(&'static str),
    NoEquivalent,
}

const MOJO: &str = "org.codehaus.mojo";

static PLUGIN_TABLE: &[(&str, &str, PluginMapping)] = &[
    (
        "com.google.cloud.tools",
        "jib-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "com.google.cloud.tools.jib",
            version: Some("3.4.4"),
            template: &[
                "jib {",
                "    to {",
                "        image = \"{to.image}\"",
                "    }",
                "}",
            ],
        }),
    ),
    (
        "org.jacoco",
        "jacoco-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "jacoco",
            version: None,
            template: &[
                "tasks.jacocoTestReport {",
                "    dependsOn(tasks.test)",
                "}",
            ],
        }),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-checkstyle-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "checkstyle",
            version: None,
            template: &[],
        }),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-pmd-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "pmd",
            version: None,
            template: &[],
        }),
    ),
    (
        "com.github.spotbugs",
        "spotbugs-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "com.github.spotbugs",
            version: Some("6.0.26"),
            template: &[],
        }),
    ),
    (
        "com.diffplug.spotless",
        "spotless-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "com.diffplug.spotless",
            version: Some("6.25.0"),
            template: &[],
        }),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-shade-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "com.github.johnrengelman.shadow",
            version: Some("8.1.1"),
            template: &[],
        }),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-war-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "war",
            version: None,
            template: &[],
        }),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-ear-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "ear",
            version: None,
            template: &[],
        }),
    ),
    (
        MOJO,
        "exec-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "application",
            version: None,
            template: &["application {", "    mainClass = \"{mainClass}\"", "}"],
        }),
    ),
    (
        "org.asciidoctor",
        "asciidoctor-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "org.asciidoctor.jvm.convert",
            version: Some("4.0.3"),
            template: &[],
        }),
    ),
    (
        "org.flywaydb",
        "flyway-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "org.flywaydb.flyway",
            version: Some("10.20.1"),
            template: &[
                "flyway {",
                "    url = \"{url}\"",
                "    user = \"{user}\"",
                "}",
            ],
        }),
    ),
    (
        "org.jooq",
        "jooq-codegen-maven",
        PluginMapping::Plugin(&GradlePlugin {
            id: "nu.studer.jooq",
            version: Some("9.0"),
            template: &[],
        }),
    ),
    (
        "org.openapitools",
        "openapi-generator-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "org.openapi.generator",
            version: Some("7.10.0"),
            template: &[
                "openApiGenerate {",
                "    generatorName = \"{executions.execution.configuration.generatorName}\"",
                "    inputSpec = \"{executions.execution.configuration.inputSpec}\"",
                "}",
            ],
        }),
    ),
    (
        "org.xolstice.maven.plugins",
        "protobuf-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "com.google.protobuf",
            version: Some("0.9.4"),
            template: &[],
        }),
    ),
    (
        "pl.project13.maven",
        "git-commit-id-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "com.gorylenko.gradle-git-properties",
            version: Some("2.4.2"),
            template: &[],
        }),
    ),
    (
        "io.github.git-commit-id",
        "git-commit-id-maven-plugin",
        PluginMapping::Plugin(&GradlePlugin {
            id: "com.gorylenko.gradle-git-properties",
            version: Some("2.4.2"),
            template: &[],
        }),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-compiler-plugin",
        PluginMapping::Builtin("java toolchain and compiler options"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-surefire-plugin",
        PluginMapping::Builtin("the test task"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-failsafe-plugin",
        PluginMapping::Builtin("a dedicated integrationTest task or JVM test suite"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-resources-plugin",
        PluginMapping::Builtin("the processResources task"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-jar-plugin",
        PluginMapping::Builtin("the jar task"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-source-plugin",
        PluginMapping::Builtin("java { withSourcesJar() }"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-javadoc-plugin",
        PluginMapping::Builtin("java { withJavadocJar() }"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-deploy-plugin",
        PluginMapping::Builtin("the maven-publish plugin"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-install-plugin",
        PluginMapping::Builtin("publishToMavenLocal from maven-publish"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-clean-plugin",
        PluginMapping::Builtin("the clean task"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-site-plugin",
        PluginMapping::Builtin("nothing; Gradle has no site lifecycle"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-project-info-reports-plugin",
        PluginMapping::Builtin("nothing; Gradle has no site lifecycle"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-dependency-plugin",
        PluginMapping::Builtin("the dependencies task and configurations"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-enforcer-plugin",
        PluginMapping::Builtin("toolchains and dependency constraints"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-release-plugin",
        PluginMapping::Builtin("version handling in gradle.properties"),
    ),
    (
        DEFAULT_PLUGIN_GROUP,
        "maven-antrun-plugin",
        PluginMapping::Builtin("ant.withGroovyBuilder in a custom task"),
    ),
    (
        MOJO,
        "versions-maven-plugin",
        PluginMapping::Builtin("the version catalog"),
    ),
    (
        MOJO,
        "flatten-maven-plugin",
        PluginMapping::Builtin("nothing; Gradle publishes resolved versions"),
    ),
];

/// Looks up a Maven plugin. A miss is [`PluginMapping::NoEquivalent`].
pub fn plugin_mapping(group_id: &str, artifact_id: &str) -> PluginMapping {
    PLUGIN_TABLE
        .iter()
        .find(|(g, a, _)| *g == group_id && *a == artifact_id)
        .map_or(PluginMapping::NoEquivalent, |(_, _, mapping)| *mapping)
}

static TEMPLATE_OPTION: OnceLock<Regex> = OnceLock::new();

fn template_option() -> &'static Regex {
    TEMPLATE_OPTION.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_.]+)\}").unwrap())
}

/// A template option whose value still held `${...}` after interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedOption {
    pub option: String,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub lines: Vec<String>,
    pub unresolved: Vec<UnresolvedOption>,
}

/// Fills `{option}` placeholders from the plugin configuration.
///
/// Every value goes through `interpolate` and is escaped for a Kotlin
/// string literal. Missing options and values that do not interpolate
/// completely render as `TODO`; the latter are also listed in
/// [`RenderedTemplate::unresolved`].
pub fn render_template(
    template: &[&str],
    configuration: &PluginConfiguration,
    interpolate: impl Fn(&str) -> Interpolated,
) -> RenderedTemplate {
    let mut rendered = RenderedTemplate::default();
    for line in template {
        let filled = template_option().replace_all(line, |caps: &regex::Captures<'_>| {
            let option = &caps[1];
            let Some(raw) = configuration.get(option).filter(|v| !v.is_empty()) else {
                return "TODO".to_string();
            };
            let value = interpolate(raw);
            if value.is_complete() {
                escape_string(&value.value)
            } else {
                if !rendered.unresolved.iter().any(|u| u.option == option) {
                    rendered.unresolved.push(UnresolvedOption {
                        option: option.to_string(),
                        raw: raw.to_string(),
                    });
                }
                "TODO".to_string()
            }
        });
        rendered.lines.push(filled.into_owned());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use pom2gradle_maven::PropertyResolver;

    #[test]
    fn test_scope_mapping_total() {
        let expected = [
            (Scope::Compile, Some("implementation")),
            (Scope::Provided, Some("compileOnly")),
            (Scope::Runtime, Some("runtimeOnly")),
            (Scope::Test, Some("testImplementation")),
            (Scope::System, Some("compileOnly")),
            (Scope::Import, None),
        ];
        for (scope, configuration) in expected {
            assert_eq!(scope_configuration(scope).configuration(), configuration);
        }
        assert_eq!(Scope::ALL.len(), expected.len());
        assert_eq!(
            scope_configuration(Scope::Import),
            ConfigurationMapping::Platform
        );
    }

    #[test]
    fn test_plugin_lookup() {
        match plugin_mapping("com.google.cloud.tools", "jib-maven-plugin") {
            PluginMapping::Plugin(plugin) => {
                assert_eq!(plugin.id, "com.google.cloud.tools.jib");
                assert!(!plugin.is_core());
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
        match plugin_mapping("org.jacoco", "jacoco-maven-plugin") {
            PluginMapping::Plugin(plugin) => assert!(plugin.is_core()),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn test_builtin_and_miss() {
        assert!(matches!(
            plugin_mapping(DEFAULT_PLUGIN_GROUP, "maven-surefire-plugin"),
            PluginMapping::Builtin(_)
        ));
        assert_eq!(
            plugin_mapping("com.example", "custom-maven-plugin"),
            PluginMapping::NoEquivalent
        );
        assert_eq!(
            plugin_mapping("com.other", "jib-maven-plugin"),
            PluginMapping::NoEquivalent
        );
    }

    fn literal(raw: &str) -> Interpolated {
        Interpolated {
            value: raw.to_string(),
            unresolved: Vec::new(),
        }
    }

    #[test]
    fn test_render_template() {
        let mut config = PluginConfiguration::default();
        config.push("to.image", "registry.example.com/app");
        let PluginMapping::Plugin(jib) = plugin_mapping("com.google.cloud.tools", "jib-maven-plugin")
        else {
            panic!("jib should be mapped");
        };
        let rendered = render_template(jib.template, &config, literal);
        assert_eq!(rendered.lines[0], "jib {");
        assert_eq!(rendered.lines[2], "        image = \"registry.example.com/app\"");
        assert!(rendered.unresolved.is_empty());

        let rendered = render_template(
            &["mainClass = \"{mainClass}\""],
            &PluginConfiguration::default(),
            literal,
        );
        assert_eq!(rendered.lines, vec!["mainClass = \"TODO\""]);
    }

    #[test]
    fn test_render_template_interpolates_and_escapes() {
        let mut resolver = PropertyResolver::default();
        resolver.set_builtin("project.artifactId", Some("billing"));
        let mut config = PluginConfiguration::default();
        config.push("to.image", "registry.io/${project.artifactId}:${docker.tag}");
        config.push("mainClass", "com.acme.\"Main\"$Inner");

        let rendered = render_template(
            &["image = \"{to.image}\"", "mainClass = \"{mainClass}\""],
            &config,
            |raw| resolver.interpolate(raw),
        );
        assert_eq!(rendered.lines[0], "image = \"TODO\"");
        assert_eq!(rendered.lines[1], "mainClass = \"com.acme.\\\"Main\\\"\\$Inner\"");
        assert_eq!(
            rendered.unresolved,
            vec![UnresolvedOption {
                option: "to.image".into(),
                raw: "registry.io/${project.artifactId}:${docker.tag}".into(),
            }]
        );

        config = PluginConfiguration::default();
        config.push("to.image", "registry.io/${project.artifactId}");
        let rendered = render_template(&["image = \"{to.image}\""], &config, |raw| {
            resolver.interpolate(raw)
        });
        assert_eq!(rendered.lines, vec!["image = \"registry.io/billing\""]);
    }
}
