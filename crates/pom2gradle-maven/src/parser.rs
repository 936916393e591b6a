//! pom.xml parser.
//!
//! Uses the quick-xml SAX reader. Elements are matched by their local name
//! so namespaced and namespace-free POMs parse the same way. Text, CDATA and
//! entity references are buffered and committed when the element closes.

use crate::error::{MavenError, Result, UnknownScope};
use crate::types::{
    Activation, DEFAULT_PLUGIN_GROUP, Dependency, Exclusion, Module, ParentRef, Plugin,
    PluginConfiguration, Profile, Repository, Scope,
};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use std::path::Path;

struct LineOffsetTable {
    line_starts: Vec<usize>,
}

impl LineOffsetTable {
    fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line and column of a byte offset.
    fn position(&self, content: &str, offset: usize) -> (usize, usize) {
        let mut offset = offset.min(content.len());
        while !content.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = content[line_start..offset].chars().count();
        (line + 1, column + 1)
    }
}

#[derive(Debug, Clone, Copy)]
enum DepTarget {
    Direct,
    Managed,
    Profile,
}

#[derive(Debug, Clone, Copy)]
enum PluginTarget {
    Build,
    Management,
    Profile,
}

/// Accumulator for a single `<dependency>` being parsed.
struct DepAccum {
    depth: usize,
    target: DepTarget,
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    scope: Option<String>,
    classifier: Option<String>,
    dep_type: Option<String>,
    optional: bool,
    system_path: Option<String>,
    exclusions: Vec<Exclusion>,
    exclusion: Option<(Option<String>, Option<String>)>,
}

impl DepAccum {
    const fn new(depth: usize, target: DepTarget) -> Self {
        Self {
            depth,
            target,
            group_id: None,
            artifact_id: None,
            version: None,
            scope: None,
            classifier: None,
            dep_type: None,
            optional: false,
            system_path: None,
            exclusions: Vec::new(),
            exclusion: None,
        }
    }

    fn record(&mut self, rel: &[&str], value: &str) {
        match rel {
            ["groupId"] => self.group_id = non_empty(value),
            ["artifactId"] => self.artifact_id = non_empty(value),
            ["version"] => self.version = non_empty(value),
            ["scope"] => self.scope = non_empty(value),
            ["classifier"] => self.classifier = non_empty(value),
            ["type"] => self.dep_type = non_empty(value),
            ["optional"] => self.optional = value.eq_ignore_ascii_case("true"),
            ["systemPath"] => self.system_path = non_empty(value),
            ["exclusions", "exclusion", field] => {
                if let Some((group, artifact)) = self.exclusion.as_mut() {
                    match *field {
                        "groupId" => *group = non_empty(value),
                        "artifactId" => *artifact = non_empty(value),
                        _ => {}
                    }
                }
            }
            ["exclusions", "exclusion"] => {
                if let Some((Some(group_id), Some(artifact_id))) = self.exclusion.take()
                    && !self
                        .exclusions
                        .iter()
                        .any(|e| e.group_id == group_id && e.artifact_id == artifact_id)
                {
                    self.exclusions.push(Exclusion {
                        group_id,
                        artifact_id,
                    });
                }
            }
            _ => {}
        }
    }

    fn finish(self, path: &Path) -> Result<(DepTarget, Dependency)> {
        let group_id = self.group_id.ok_or_else(|| MavenError::MissingCoordinate {
            path: path.to_path_buf(),
            element: "dependency",
            field: "groupId",
        })?;
        let artifact_id = self
            .artifact_id
            .ok_or_else(|| MavenError::MissingCoordinate {
                path: path.to_path_buf(),
                element: "dependency",
                field: "artifactId",
            })?;
        let scope = match self.scope {
            Some(raw) => raw
                .parse::<Scope>()
                .map_err(|UnknownScope(scope)| MavenError::InvalidScope {
                    path: path.to_path_buf(),
                    scope,
                    coordinate: format!("{group_id}:{artifact_id}"),
                })?,
            None => Scope::Compile,
        };

        Ok((
            self.target,
            Dependency {
                group_id,
                artifact_id,
                version: self.version,
                scope,
                classifier: self.classifier,
                dep_type: self.dep_type,
                optional: self.optional,
                system_path: self.system_path,
                exclusions: self.exclusions,
            },
        ))
    }
}

/// Accumulator for a single `<plugin>` being parsed.
struct PluginAccum {
    depth: usize,
    target: PluginTarget,
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    configuration: PluginConfiguration,
}

impl PluginAccum {
    fn new(depth: usize, target: PluginTarget) -> Self {
        Self {
            depth,
            target,
            group_id: None,
            artifact_id: None,
            version: None,
            configuration: PluginConfiguration::default(),
        }
    }

    fn record(&mut self, rel: &[&str], value: &str, is_leaf: bool) {
        match rel {
            ["groupId"] => self.group_id = non_empty(value),
            ["artifactId"] => self.artifact_id = non_empty(value),
            ["version"] => self.version = non_empty(value),
            ["configuration", key @ ..] if !key.is_empty() && is_leaf => {
                self.configuration.push(key.join("."), value);
            }
            _ => {}
        }
    }

    fn finish(self, path: &Path) -> Result<(PluginTarget, Plugin)> {
        let artifact_id = self
            .artifact_id
            .ok_or_else(|| MavenError::MissingCoordinate {
                path: path.to_path_buf(),
                element: "plugin",
                field: "artifactId",
            })?;
        Ok((
            self.target,
            Plugin {
                group_id: self
                    .group_id
                    .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string()),
                artifact_id,
                version: self.version,
                configuration: self.configuration,
            },
        ))
    }
}

#[derive(Default)]
struct OsAccum {
    name: Option<String>,
    family: Option<String>,
    arch: Option<String>,
    version: Option<String>,
}

#[derive(Default)]
struct ProfileAccum {
    id: Option<String>,
    activation: Vec<Activation>,
    dependencies: Vec<Dependency>,
    plugins: Vec<Plugin>,
    properties: BTreeMap<String, String>,
    property: Option<(Option<String>, Option<String>)>,
    os: Option<OsAccum>,
}

impl ProfileAccum {
    fn record(&mut self, rel: &[&str], value: &str, is_leaf: bool) {
        match rel {
            ["id"] => self.id = non_empty(value),
            ["activation", "activeByDefault"] => {
                if value.eq_ignore_ascii_case("true") {
                    self.activation.push(Activation::ActiveByDefault);
                }
            }
            ["activation", "jdk"] => {
                if let Some(range) = non_empty(value) {
                    self.activation.push(Activation::Jdk(range));
                }
            }
            ["activation", "property", field] => {
                if let Some((name, expected)) = self.property.as_mut() {
                    match *field {
                        "name" => *name = non_empty(value),
                        "value" => *expected = non_empty(value),
                        _ => {}
                    }
                }
            }
            ["activation", "property"] => {
                if let Some((Some(name), value)) = self.property.take() {
                    self.activation.push(Activation::Property { name, value });
                }
            }
            ["activation", "os", field] => {
                if let Some(os) = self.os.as_mut() {
                    let slot = match *field {
                        "name" => &mut os.name,
                        "family" => &mut os.family,
                        "arch" => &mut os.arch,
                        "version" => &mut os.version,
                        _ => return,
                    };
                    *slot = non_empty(value);
                }
            }
            ["activation", "os"] => {
                if let Some(os) = self.os.take()
                    && (os.name.is_some()
                        || os.family.is_some()
                        || os.arch.is_some()
                        || os.version.is_some())
                {
                    self.activation.push(Activation::Os {
                        name: os.name,
                        family: os.family,
                        arch: os.arch,
                        version: os.version,
                    });
                }
            }
            ["activation", "file", "exists"] => {
                if let Some(file) = non_empty(value) {
                    self.activation.push(Activation::FileExists(file));
                }
            }
            ["activation", "file", "missing"] => {
                if let Some(file) = non_empty(value) {
                    self.activation.push(Activation::FileMissing(file));
                }
            }
            ["properties", key] if is_leaf => {
                self.properties.insert((*key).to_string(), value.to_string());
            }
            _ => {}
        }
    }

    fn finish(self) -> Profile {
        Profile {
            id: self.id.unwrap_or_else(|| "default".to_string()),
            activation: self.activation,
            dependencies: self.dependencies,
            plugins: self.plugins,
            properties: self.properties,
        }
    }
}

#[derive(Default)]
struct ParentAccum {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    relative_path: Option<String>,
}

struct PomBuilder<'a> {
    path: &'a Path,
    module: Module,
    artifact_id: Option<String>,
    parent: Option<ParentAccum>,
    dep: Option<DepAccum>,
    plugin: Option<PluginAccum>,
    profile: Option<ProfileAccum>,
    repository: Option<(Option<String>, Option<String>)>,
}

impl<'a> PomBuilder<'a> {
    fn new(path: &'a Path) -> Self {
        let mut module = Module::new(String::new());
        module.pom_path = path.to_path_buf();
        Self {
            path,
            module,
            artifact_id: None,
            parent: None,
            dep: None,
            plugin: None,
            profile: None,
            repository: None,
        }
    }

    fn open(&mut self, names: &[&str]) {
        let depth = names.len();
        match names {
            ["project", "dependencies", "dependency"] => {
                self.dep = Some(DepAccum::new(depth, DepTarget::Direct));
            }
            ["project", "dependencyManagement", "dependencies", "dependency"] => {
                self.dep = Some(DepAccum::new(depth, DepTarget::Managed));
            }
            ["project", "profiles", "profile", "dependencies", "dependency"] => {
                self.dep = Some(DepAccum::new(depth, DepTarget::Profile));
            }
            ["project", "build", "plugins", "plugin"] => {
                self.plugin = Some(PluginAccum::new(depth, PluginTarget::Build));
            }
            ["project", "build", "pluginManagement", "plugins", "plugin"] => {
                self.plugin = Some(PluginAccum::new(depth, PluginTarget::Management));
            }
            ["project", "profiles", "profile", "build", "plugins", "plugin"] => {
                self.plugin = Some(PluginAccum::new(depth, PluginTarget::Profile));
            }
            ["project", "profiles", "profile"] => {
                self.profile = Some(ProfileAccum::default());
            }
            ["project", "profiles", "profile", "activation", "property"] => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.property = Some((None, None));
                }
            }
            ["project", "profiles", "profile", "activation", "os"] => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.os = Some(OsAccum::default());
                }
            }
            ["project", "repositories", "repository"] => {
                self.repository = Some((None, None));
            }
            ["project", "parent"] => {
                self.parent.get_or_insert_with(ParentAccum::default);
            }
            [.., "exclusions", "exclusion"] => {
                if let Some(dep) = self.dep.as_mut()
                    && depth == dep.depth + 2
                {
                    dep.exclusion = Some((None, None));
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, names: &[&str], value: &str, is_leaf: bool) -> Result<()> {
        let depth = names.len();

        if let Some(dep) = self.dep.as_mut() {
            if depth > dep.depth {
                dep.record(&names[dep.depth..], value);
                return Ok(());
            }
            if depth == dep.depth
                && let Some(dep) = self.dep.take()
            {
                let (target, dependency) = dep.finish(self.path)?;
                match target {
                    DepTarget::Direct => self.module.dependencies.push(dependency),
                    DepTarget::Managed => self.module.dependency_management.push(dependency),
                    DepTarget::Profile => {
                        if let Some(profile) = self.profile.as_mut() {
                            profile.dependencies.push(dependency);
                        }
                    }
                }
                return Ok(());
            }
        }

        if let Some(plugin) = self.plugin.as_mut() {
            if depth > plugin.depth {
                plugin.record(&names[plugin.depth..], value, is_leaf);
                return Ok(());
            }
            if depth == plugin.depth
                && let Some(plugin) = self.plugin.take()
            {
                let (target, plugin) = plugin.finish(self.path)?;
                match target {
                    PluginTarget::Build => self.module.plugins.push(plugin),
                    PluginTarget::Management => self.module.plugin_management.push(plugin),
                    PluginTarget::Profile => {
                        if let Some(profile) = self.profile.as_mut() {
                            profile.plugins.push(plugin);
                        }
                    }
                }
                return Ok(());
            }
        }

        match names {
            ["project", "profiles", "profile"] => {
                if let Some(profile) = self.profile.take() {
                    self.module.profiles.push(profile.finish());
                }
            }
            ["project", "profiles", "profile", rel @ ..] => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.record(rel, value, is_leaf);
                }
            }
            ["project", field] if is_leaf => match *field {
                "groupId" => self.module.group_id = non_empty(value),
                "artifactId" => self.artifact_id = non_empty(value),
                "version" => self.module.version = non_empty(value),
                "packaging" => {
                    if let Some(packaging) = non_empty(value) {
                        self.module.packaging = packaging;
                    }
                }
                "name" => self.module.name = non_empty(value),
                "description" => self.module.description = non_empty(value),
                _ => {}
            },
            ["project", "parent", field] => {
                if let Some(parent) = self.parent.as_mut() {
                    match *field {
                        "groupId" => parent.group_id = non_empty(value),
                        "artifactId" => parent.artifact_id = non_empty(value),
                        "version" => parent.version = non_empty(value),
                        "relativePath" => parent.relative_path = non_empty(value),
                        _ => {}
                    }
                }
            }
            ["project", "properties", key] if is_leaf => {
                self.module
                    .properties
                    .insert((*key).to_string(), value.to_string());
            }
            ["project", "modules", "module"] => {
                if let Some(module) = non_empty(value) {
                    self.module.modules.push(module);
                }
            }
            ["project", "repositories", "repository", field] => {
                if let Some((id, url)) = self.repository.as_mut() {
                    match *field {
                        "id" => *id = non_empty(value),
                        "url" => *url = non_empty(value),
                        _ => {}
                    }
                }
            }
            ["project", "repositories", "repository"] => {
                if let Some((id, Some(url))) = self.repository.take() {
                    self.module.repositories.push(Repository {
                        id: id.unwrap_or_default(),
                        url,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Module> {
        let missing = |element: &'static str, field: &'static str| MavenError::MissingCoordinate {
            path: self.path.to_path_buf(),
            element,
            field,
        };

        if let Some(parent) = self.parent.take() {
            let group_id = parent.group_id.ok_or_else(|| missing("parent", "groupId"))?;
            let artifact_id = parent
                .artifact_id
                .ok_or_else(|| missing("parent", "artifactId"))?;
            self.module.parent = Some(ParentRef {
                group_id,
                artifact_id,
                version: parent.version,
                relative_path: parent.relative_path,
            });
        }

        self.module.artifact_id = self
            .artifact_id
            .take()
            .ok_or_else(|| missing("project", "artifactId"))?;
        if self.module.declared_group_id().is_none() {
            return Err(missing("project", "groupId"));
        }
        Ok(self.module)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Parses one POM document.
///
/// The returned module has `source_dir` `.` and `is_root` unset; the tree
/// loader fills both in.
///
/// # Errors
///
/// Returns [`MavenError::Xml`] with a 1-based position for malformed
/// documents, [`MavenError::MissingCoordinate`] when a required coordinate
/// is absent, and [`MavenError::InvalidScope`] for unknown scopes.
pub fn parse_pom(content: &str, pom_path: &Path) -> Result<Module> {
    let line_table = LineOffsetTable::new(content);
    let xml_error = |offset: u64, message: String| {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let (line, column) = line_table.position(content, offset);
        MavenError::Xml {
            path: pom_path.to_path_buf(),
            line,
            column,
            message,
        }
    };

    let mut reader = Reader::from_str(content);
    let mut builder = PomBuilder::new(pom_path);
    let mut path: Vec<String> = Vec::new();
    let mut has_child: Vec<bool> = Vec::new();
    let mut text = String::new();
    let mut seen_root = false;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(xml_error(reader.error_position(), e.to_string())),
        };

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = local_name(e);
                if path.is_empty() {
                    if seen_root {
                        return Err(xml_error(
                            reader.buffer_position(),
                            format!("unexpected second root element <{name}>"),
                        ));
                    }
                    if name != "project" {
                        return Err(xml_error(
                            reader.buffer_position(),
                            format!("root element is <{name}>, expected <project>"),
                        ));
                    }
                    seen_root = true;
                }
                if let Some(flag) = has_child.last_mut() {
                    *flag = true;
                }
                path.push(name);
                has_child.push(false);
                text.clear();

                let names: Vec<&str> = path.iter().map(String::as_str).collect();
                builder.open(&names);
                if matches!(event, Event::Empty(_)) {
                    builder.close(&names, "", true)?;
                    path.pop();
                    has_child.pop();
                }
            }
            Event::Text(ref e) => match e.decode() {
                Ok(decoded) => text.push_str(&decoded),
                Err(_) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            },
            Event::CData(ref e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(ref e) => {
                let resolved = match e.resolve_char_ref() {
                    Ok(Some(c)) => Some(c.to_string()),
                    _ => e
                        .decode()
                        .ok()
                        .and_then(|name| resolve_predefined_entity(&name).map(str::to_string)),
                };
                match resolved {
                    Some(value) => text.push_str(&value),
                    None => {
                        let name = String::from_utf8_lossy(e.as_ref()).into_owned();
                        return Err(xml_error(
                            reader.buffer_position(),
                            format!("unknown entity &{name};"),
                        ));
                    }
                }
            }
            Event::End(_) => {
                let is_leaf = !has_child.pop().unwrap_or(false);
                let names: Vec<&str> = path.iter().map(String::as_str).collect();
                builder.close(&names, text.trim(), is_leaf)?;
                path.pop();
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(xml_error(
            content.len() as u64,
            format!("unexpected end of document inside <{open}>"),
        ));
    }
    if !seen_root {
        return Err(xml_error(
            content.len() as u64,
            "document has no <project> element".to_string(),
        ));
    }

    let module = builder.finish()?;
    tracing::debug!(
        path = %pom_path.display(),
        artifact = %module.artifact_id,
        dependencies = module.dependencies.len(),
        modules = module.modules.len(),
        "parsed pom"
    );
    Ok(module)
}
