//! Domain types for parsed Maven modules.
//!
//! These are raw per-POM records: values are kept exactly as declared,
//! `${...}` placeholders included. Inheritance and interpolation happen in
//! [`crate::effective`].

use crate::error::UnknownScope;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Group assumed for `<plugin>` elements without a `<groupId>`.
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Scope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl Scope {
    pub const ALL: [Self; 6] = [
        Self::Compile,
        Self::Provided,
        Self::Runtime,
        Self::Test,
        Self::System,
        Self::Import,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "provided" => Ok(Self::Provided),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            "system" => Ok(Self::System),
            "import" => Ok(Self::Import),
            _ => Err(UnknownScope(s.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    /// `None` when the version is managed by a BOM or a parent.
    pub version: Option<String>,
    pub scope: Scope,
    pub classifier: Option<String>,
    /// `<type>`, e.g. `pom` or `test-jar`.
    pub dep_type: Option<String>,
    pub optional: bool,
    pub system_path: Option<String>,
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            scope: Scope::Compile,
            classifier: None,
            dep_type: None,
            optional: false,
            system_path: None,
            exclusions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Canonical identifier: "{groupId}:{artifactId}"
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// `<dependencyManagement>` entry importing a BOM.
    pub fn is_bom_import(&self) -> bool {
        self.scope == Scope::Import
    }

    /// Adds an exclusion unless the same pair is already listed.
    pub fn exclude(&mut self, exclusion: Exclusion) {
        if !self.exclusions.contains(&exclusion) {
            self.exclusions.push(exclusion);
        }
    }
}

/// Flattened `<configuration>` block of a plugin.
///
/// Keys are dotted element paths relative to `<configuration>`
/// (`annotationProcessorPaths.path.groupId`); repeated elements produce one
/// entry each, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginConfiguration {
    entries: Vec<(String, String)>,
}

impl PluginConfiguration {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub configuration: PluginConfiguration,
}

impl Plugin {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            configuration: PluginConfiguration::default(),
        }
    }

    /// Canonical identifier: "{groupId}:{artifactId}"
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// One `<activation>` condition of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    ActiveByDefault,
    /// `value` is `None` for an existence check; a name starting with `!`
    /// means the property must be absent.
    Property {
        name: String,
        value: Option<String>,
    },
    Os {
        name: Option<String>,
        family: Option<String>,
        arch: Option<String>,
        version: Option<String>,
    },
    FileExists(String),
    FileMissing(String),
    /// JDK version or range, e.g. `17` or `[11,17)`.
    Jdk(String),
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveByDefault => f.write_str("active by default"),
            Self::Property { name, value } => match (name.strip_prefix('!'), value) {
                (_, Some(value)) => write!(f, "property {name}={value}"),
                (Some(negated), None) => write!(f, "property {negated} is not set"),
                (None, None) => write!(f, "property {name} is set"),
            },
            Self::Os {
                name,
                family,
                arch,
                version,
            } => {
                let parts: Vec<String> = [
                    ("name", name),
                    ("family", family),
                    ("arch", arch),
                    ("version", version),
                ]
                .into_iter()
                .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}={v}")))
                .collect();
                write!(f, "OS {}", parts.join(", "))
            }
            Self::FileExists(path) => write!(f, "file {path} exists"),
            Self::FileMissing(path) => write!(f, "file {path} is missing"),
            Self::Jdk(range) => write!(f, "JDK {range}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    pub id: String,
    /// Empty when the profile is only activated explicitly (`-P id`).
    pub activation: Vec<Activation>,
    pub dependencies: Vec<Dependency>,
    pub plugins: Vec<Plugin>,
    pub properties: BTreeMap<String, String>,
}

impl Profile {
    pub fn is_explicit_only(&self) -> bool {
        self.activation.is_empty()
    }
}

/// The `<parent>` element. A module never owns its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub relative_path: Option<String>,
}

impl ParentRef {
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: String,
    pub url: String,
}

/// One POM as declared on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Own `<groupId>`; may be inherited from [`Module::parent`].
    pub group_id: Option<String>,
    pub artifact_id: String,
    /// Own `<version>`; may be inherited from [`Module::parent`].
    pub version: Option<String>,
    pub packaging: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub parent: Option<ParentRef>,
    /// `<modules>` entries in declaration order.
    pub modules: Vec<String>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub dependency_management: Vec<Dependency>,
    pub plugins: Vec<Plugin>,
    pub plugin_management: Vec<Plugin>,
    pub profiles: Vec<Profile>,
    pub repositories: Vec<Repository>,
    pub pom_path: PathBuf,
    /// Directory relative to the tree root, `.` for the root itself.
    pub source_dir: String,
    pub is_root: bool,
}

impl Module {
    pub fn new(artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: None,
            artifact_id: artifact_id.into(),
            version: None,
            packaging: "jar".into(),
            name: None,
            description: None,
            parent: None,
            modules: Vec::new(),
            properties: BTreeMap::new(),
            dependencies: Vec::new(),
            dependency_management: Vec::new(),
            plugins: Vec::new(),
            plugin_management: Vec::new(),
            profiles: Vec::new(),
            repositories: Vec::new(),
            pom_path: PathBuf::from("pom.xml"),
            source_dir: ".".into(),
            is_root: false,
        }
    }

    /// Own groupId, falling back to the parent's.
    pub fn declared_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Own version, falling back to the parent's.
    pub fn declared_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.as_deref()))
    }

    /// `pom` packaging: the module builds nothing itself.
    pub fn is_aggregator(&self) -> bool {
        self.packaging == "pom"
    }

    /// Gradle project path: `:` for the root, `:a:b` for `a/b`.
    ///
    /// Parent-directory segments are dropped; a module living entirely
    /// outside the root falls back to its artifactId.
    pub fn gradle_path(&self) -> String {
        if self.is_root {
            return ":".into();
        }
        let segments: Vec<&str> = self
            .source_dir
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .collect();
        if segments.is_empty() {
            format!(":{}", self.artifact_id)
        } else {
            format!(":{}", segments.join(":"))
        }
    }

    /// Whether `source_dir` leaves the root directory.
    pub fn is_outside_root(&self) -> bool {
        self.source_dir.split('/').any(|s| s == "..")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_variants() {
        for scope in Scope::ALL {
            assert_eq!(scope.as_str().parse::<Scope>().unwrap(), scope);
        }
        assert_eq!("TEST".parse::<Scope>().unwrap(), Scope::Test);
        assert_eq!(" runtime ".parse::<Scope>().unwrap(), Scope::Runtime);
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let err = "compileOnly".parse::<Scope>().unwrap_err();
        assert_eq!(err, UnknownScope("compileOnly".into()));
        assert!("".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_default() {
        assert_eq!(Scope::default(), Scope::Compile);
    }

    #[test]
    fn test_dependency_coordinate() {
        let dep = Dependency::new("org.apache.commons", "commons-lang3").with_version("3.14.0");
        assert_eq!(dep.coordinate(), "org.apache.commons:commons-lang3");
        assert_eq!(dep.version.as_deref(), Some("3.14.0"));
        assert!(!dep.is_bom_import());
        assert!(
            Dependency::new("org.springframework.boot", "spring-boot-dependencies")
                .with_scope(Scope::Import)
                .is_bom_import()
        );
    }

    #[test]
    fn test_exclusions_deduplicated() {
        let mut dep = Dependency::new("a", "b");
        let excl = Exclusion {
            group_id: "commons-logging".into(),
            artifact_id: "commons-logging".into(),
        };
        dep.exclude(excl.clone());
        dep.exclude(excl);
        assert_eq!(dep.exclusions.len(), 1);
    }

    #[test]
    fn test_plugin_configuration_order() {
        let mut config = PluginConfiguration::default();
        config.push("compilerArgs.arg", "-parameters");
        config.push("release", "21");
        config.push("compilerArgs.arg", "-Xlint:all");

        assert_eq!(config.get("release"), Some("21"));
        assert_eq!(
            config.get_all("compilerArgs.arg").collect::<Vec<_>>(),
            vec!["-parameters", "-Xlint:all"]
        );
        assert_eq!(config.len(), 3);
        assert!(config.get("missing").is_none());
    }

    #[test]
    fn test_activation_display() {
        let prop = Activation::Property {
            name: "env".into(),
            value: Some("dev".into()),
        };
        assert_eq!(prop.to_string(), "property env=dev");

        let negated = Activation::Property {
            name: "!skipDocs".into(),
            value: None,
        };
        assert_eq!(negated.to_string(), "property skipDocs is not set");

        let os = Activation::Os {
            name: None,
            family: Some("windows".into()),
            arch: None,
            version: None,
        };
        assert_eq!(os.to_string(), "OS family=windows");
        assert_eq!(Activation::Jdk("[17,)".into()).to_string(), "JDK [17,)");
    }

    #[test]
    fn test_gradle_path() {
        let mut root = Module::new("parent");
        root.is_root = true;
        assert_eq!(root.gradle_path(), ":");

        let mut nested = Module::new("leaf");
        nested.source_dir = "mid/leaf".into();
        assert_eq!(nested.gradle_path(), ":mid:leaf");

        let mut outside = Module::new("shared");
        outside.source_dir = "../shared".into();
        assert_eq!(outside.gradle_path(), ":shared");
        assert!(outside.is_outside_root());
        assert!(!nested.is_outside_root());
    }

    #[test]
    fn test_declared_coordinates_fall_back_to_parent() {
        let mut module = Module::new("child");
        module.parent = Some(ParentRef {
            group_id: "com.example".into(),
            artifact_id: "parent".into(),
            version: Some("1.0.0".into()),
            relative_path: None,
        });
        assert_eq!(module.declared_group_id(), Some("com.example"));
        assert_eq!(module.declared_version(), Some("1.0.0"));

        module.version = Some("2.0.0".into());
        assert_eq!(module.declared_version(), Some("2.0.0"));
    }
}
