//! Effective view of a module: Maven inheritance applied.
//!
//! Properties, managed versions, dependencies and plugins are merged from
//! the tree root down to the module; closer declarations override farther
//! ones and the module's own declarations override everything. Every other
//! component consumes these views instead of raw [`Module`] data.

use crate::error::{MavenError, Result};
use crate::interpolate::{Interpolated, PropertyResolver, has_placeholder};
use crate::tree::{ModuleId, ModuleTree};
use crate::types::{Dependency, Module, ParentRef, Plugin, Profile};
use std::collections::BTreeMap;

/// Where a dependency's version comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Declared on the dependency itself, fully interpolated.
    Declared(String),
    /// Taken from a `<dependencyManagement>` entry in the lineage.
    Managed(String),
    /// No version anywhere in the tree; a BOM or external parent supplies it.
    Platform,
    /// Placeholder that nothing in the tree resolves, kept verbatim.
    Unresolved(String),
}

impl VersionSpec {
    /// A concrete version usable in a catalog.
    pub fn resolved(&self) -> Option<&str> {
        match self {
            Self::Declared(v) | Self::Managed(v) => Some(v),
            Self::Platform | Self::Unresolved(_) => None,
        }
    }
}

/// A dependency with coordinates interpolated in the owning module's context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub dependency: Dependency,
    pub version: VersionSpec,
    /// Module whose POM declares the dependency.
    pub declared_in: ModuleId,
}

impl ResolvedDependency {
    pub fn coordinate(&self) -> String {
        self.dependency.coordinate()
    }
}

/// A build plugin with its version filled from `pluginManagement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlugin {
    pub plugin: Plugin,
    pub declared_in: ModuleId,
}

#[derive(Debug, Clone)]
pub struct EffectiveModule<'a> {
    pub id: ModuleId,
    pub module: &'a Module,
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub packaging: String,
    /// Merged properties, interpolated where possible.
    pub properties: BTreeMap<String, String>,
    /// Managed versions keyed by `groupId:artifactId`.
    pub managed: BTreeMap<String, String>,
    /// BOM imports from the lineage, root first.
    pub boms: Vec<ResolvedDependency>,
    pub dependencies: Vec<ResolvedDependency>,
    pub plugins: Vec<ResolvedPlugin>,
    /// `<parent>` references from this module up to the root.
    pub parent_chain: Vec<&'a ParentRef>,
    /// Whether a parent outside the tree may supply versions.
    pub has_external_parent: bool,
    resolver: PropertyResolver,
}

impl EffectiveModule<'_> {
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    pub fn interpolate(&self, raw: &str) -> Interpolated {
        self.resolver.interpolate(raw)
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.module.profiles
    }

    pub fn plugin(&self, group_id: &str, artifact_id: &str) -> Option<&Plugin> {
        self.plugins
            .iter()
            .map(|p| &p.plugin)
            .find(|p| p.group_id == group_id && p.artifact_id == artifact_id)
    }

    pub fn dependency(&self, group_id: &str, artifact_id: &str) -> Option<&ResolvedDependency> {
        self.dependencies.iter().find(|d| {
            d.dependency.group_id == group_id && d.dependency.artifact_id == artifact_id
        })
    }
}

/// Inserts or replaces by key, keeping the first position of the key.
fn upsert<T>(items: &mut Vec<(String, T)>, key: String, value: T) {
    if let Some(slot) = items.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        items.push((key, value));
    }
}

impl ModuleTree {
    /// Computes the effective view of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MavenError::UnresolvedProperty`] when a coordinate, or a
    /// dependency version nothing outside the tree could supply, keeps an
    /// unresolved placeholder.
    pub fn effective(&self, id: ModuleId) -> Result<EffectiveModule<'_>> {
        let module = self.module(id);
        let mut lineage: Vec<ModuleId> = self.ancestors(id).collect();
        lineage.reverse();
        lineage.push(id);

        let mut merged = BTreeMap::new();
        for ancestor in &lineage {
            merged.extend(
                self.module(*ancestor)
                    .properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }

        let unresolved = |field: String, placeholder: String| MavenError::UnresolvedProperty {
            path: module.pom_path.clone(),
            field,
            placeholder,
        };

        let raw_group = module.declared_group_id().unwrap_or_default();
        let raw_version = module.declared_version();
        let mut resolver = PropertyResolver::new(merged);
        for key in ["project.groupId", "pom.groupId", "groupId"] {
            resolver.set_builtin(key, Some(raw_group));
        }
        for key in ["project.artifactId", "pom.artifactId", "artifactId"] {
            resolver.set_builtin(key, Some(&module.artifact_id));
        }
        for key in ["project.version", "pom.version", "version"] {
            resolver.set_builtin(key, raw_version);
        }
        resolver.set_builtin("project.packaging", Some(&module.packaging));
        if let Some(parent) = &module.parent {
            resolver.set_builtin("project.parent.groupId", Some(&parent.group_id));
            resolver.set_builtin("project.parent.artifactId", Some(&parent.artifact_id));
            resolver.set_builtin("project.parent.version", parent.version.as_deref());
            resolver.set_builtin("parent.version", parent.version.as_deref());
            resolver.set_builtin("parent.groupId", Some(&parent.group_id));
        }

        let group_id = resolver
            .require(raw_group)
            .map_err(|p| unresolved("groupId".into(), p))?;
        let artifact_id = resolver
            .require(&module.artifact_id)
            .map_err(|p| unresolved("artifactId".into(), p))?;
        let version = raw_version
            .map(|v| resolver.require(v))
            .transpose()
            .map_err(|p| unresolved("version".into(), p))?;

        let properties: BTreeMap<String, String> = resolver
            .properties()
            .iter()
            .map(|(k, v)| (k.clone(), resolver.interpolate(v).value))
            .collect();

        let has_external_parent = lineage.iter().any(|ancestor| {
            let m = self.module(*ancestor);
            m.parent.as_ref().is_some_and(|parent| {
                self.parent(*ancestor)
                    .is_none_or(|tree_parent| self.module(tree_parent).artifact_id != parent.artifact_id)
            })
        });

        let mut managed: BTreeMap<String, String> = BTreeMap::new();
        let mut boms: Vec<(String, ResolvedDependency)> = Vec::new();
        for ancestor in &lineage {
            for dep in &self.module(*ancestor).dependency_management {
                let mut dep = dep.clone();
                dep.group_id = resolver.interpolate(&dep.group_id).value;
                dep.artifact_id = resolver.interpolate(&dep.artifact_id).value;
                let version = dep.version.as_deref().map(|v| resolver.interpolate(v));
                let key = dep.coordinate();
                if dep.is_bom_import() {
                    let spec = match version {
                        Some(v) if v.is_complete() => VersionSpec::Declared(v.value),
                        Some(v) => VersionSpec::Unresolved(v.value),
                        None => VersionSpec::Platform,
                    };
                    dep.version = spec.resolved().map(str::to_string);
                    upsert(
                        &mut boms,
                        key,
                        ResolvedDependency {
                            dependency: dep,
                            version: spec,
                            declared_in: *ancestor,
                        },
                    );
                } else if let Some(v) = version {
                    managed.insert(key, v.value);
                }
            }
        }
        let boms: Vec<ResolvedDependency> = boms.into_iter().map(|(_, d)| d).collect();
        let lenient = has_external_parent || !boms.is_empty();

        let mut dependencies: Vec<(String, ResolvedDependency)> = Vec::new();
        for ancestor in &lineage {
            for dep in &self.module(*ancestor).dependencies {
                let resolved = resolve_dependency(dep, *ancestor, &resolver, &managed, lenient)
                    .map_err(|(field, p)| unresolved(field, p))?;
                upsert(&mut dependencies, resolved.coordinate(), resolved);
            }
        }

        let mut plugin_versions: BTreeMap<String, &Plugin> = BTreeMap::new();
        for ancestor in &lineage {
            for plugin in &self.module(*ancestor).plugin_management {
                plugin_versions.insert(plugin.coordinate(), plugin);
            }
        }
        let mut plugins: Vec<(String, ResolvedPlugin)> = Vec::new();
        for ancestor in &lineage {
            for plugin in &self.module(*ancestor).plugins {
                let mut plugin = plugin.clone();
                let managed_plugin = plugin_versions.get(&plugin.coordinate());
                if plugin.version.is_none() {
                    plugin.version = managed_plugin.and_then(|p| p.version.clone());
                }
                if plugin.configuration.is_empty()
                    && let Some(managed_plugin) = managed_plugin
                {
                    plugin.configuration = managed_plugin.configuration.clone();
                }
                plugin.version = plugin
                    .version
                    .map(|v| resolver.interpolate(&v).value);
                upsert(
                    &mut plugins,
                    plugin.coordinate(),
                    ResolvedPlugin {
                        plugin,
                        declared_in: *ancestor,
                    },
                );
            }
        }

        let mut parent_chain: Vec<&ParentRef> = Vec::new();
        for ancestor in lineage.iter().rev() {
            if let Some(parent) = &self.module(*ancestor).parent {
                parent_chain.push(parent);
            }
        }

        Ok(EffectiveModule {
            id,
            module,
            group_id,
            artifact_id,
            version,
            packaging: module.packaging.clone(),
            properties,
            managed,
            boms,
            dependencies: dependencies.into_iter().map(|(_, d)| d).collect(),
            plugins: plugins.into_iter().map(|(_, p)| p).collect(),
            parent_chain,
            has_external_parent,
            resolver,
        })
    }
}

/// Interpolates one dependency; errors carry the field and placeholder.
fn resolve_dependency(
    dep: &Dependency,
    declared_in: ModuleId,
    resolver: &PropertyResolver,
    managed: &BTreeMap<String, String>,
    lenient: bool,
) -> std::result::Result<ResolvedDependency, (String, String)> {
    let raw = dep.coordinate();
    let mut dep = dep.clone();
    dep.group_id = resolver
        .require(&dep.group_id)
        .map_err(|p| (format!("groupId of {raw}"), p))?;
    dep.artifact_id = resolver
        .require(&dep.artifact_id)
        .map_err(|p| (format!("artifactId of {raw}"), p))?;
    dep.classifier = dep.classifier.map(|c| resolver.interpolate(&c).value);
    let coordinate = dep.coordinate();

    let version = match dep.version.as_deref() {
        Some(raw_version) => {
            let interpolated = resolver.interpolate(raw_version);
            match interpolated.unresolved.first() {
                None => VersionSpec::Declared(interpolated.value),
                Some(_) if lenient => {
                    tracing::debug!(
                        dependency = %coordinate,
                        version = raw_version,
                        "keeping unresolved version literal"
                    );
                    VersionSpec::Unresolved(raw_version.to_string())
                }
                Some(p) => return Err((format!("version of {coordinate}"), p.clone())),
            }
        }
        None => match managed.get(&coordinate) {
            Some(v) if has_placeholder(v) => VersionSpec::Unresolved(v.clone()),
            Some(v) => VersionSpec::Managed(v.clone()),
            None => VersionSpec::Platform,
        },
    };
    dep.version = version.resolved().map(str::to_string);

    Ok(ResolvedDependency {
        dependency: dep,
        version,
        declared_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pom;
    use std::path::Path;

    fn module(xml: &str, dir: &str) -> Module {
        let mut module = parse_pom(xml, &Path::new(dir).join("pom.xml")).unwrap();
        module.source_dir = dir.to_string();
        module
    }

    const PARENT: &str = r"<project>
  <groupId>com.example</groupId>
  <artifactId>parent</artifactId>
  <version>${revision}</version>
  <packaging>pom</packaging>
  <properties>
    <revision>1.4.0</revision>
    <jackson.version>2.17.0</jackson.version>
    <java.version>17</java.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>com.fasterxml.jackson.core</groupId>
        <artifactId>jackson-databind</artifactId>
        <version>${jackson.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>2.0.9</version>
    </dependency>
  </dependencies>
  <build>
    <pluginManagement>
      <plugins>
        <plugin>
          <artifactId>maven-surefire-plugin</artifactId>
          <version>3.2.5</version>
        </plugin>
      </plugins>
    </pluginManagement>
  </build>
</project>";

    const CHILD: &str = r"<project>
  <parent>
    <groupId>com.example</groupId>
    <artifactId>parent</artifactId>
    <version>${revision}</version>
  </parent>
  <artifactId>child</artifactId>
  <properties>
    <java.version>21</java.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>com.fasterxml.jackson.core</groupId>
      <artifactId>jackson-databind</artifactId>
    </dependency>
    <dependency>
      <groupId>${project.groupId}</groupId>
      <artifactId>sibling</artifactId>
      <version>${project.version}</version>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>2.0.12</version>
    </dependency>
  </dependencies>
  <build>
    <plugins>
      <plugin>
        <artifactId>maven-surefire-plugin</artifactId>
      </plugin>
    </plugins>
  </build>
</project>";

    fn two_module_tree() -> (ModuleTree, ModuleId) {
        let mut tree = ModuleTree::new(module(PARENT, "."));
        let child = tree.add_child(tree.root(), module(CHILD, "child"));
        (tree, child)
    }

    #[test]
    fn test_coordinates_inherited_and_interpolated() {
        let (tree, child) = two_module_tree();
        let view = tree.effective(child).unwrap();
        assert_eq!(view.group_id, "com.example");
        assert_eq!(view.artifact_id, "child");
        assert_eq!(view.version.as_deref(), Some("1.4.0"));
        assert!(!view.has_external_parent);
        assert_eq!(view.parent_chain.len(), 1);
    }

    #[test]
    fn test_closer_property_wins() {
        let (tree, child) = two_module_tree();
        assert_eq!(tree.effective(child).unwrap().property("java.version"), Some("21"));
        assert_eq!(
            tree.effective(tree.root()).unwrap().property("java.version"),
            Some("17")
        );
    }

    #[test]
    fn test_dependencies_inherited_and_overridden() {
        let (tree, child) = two_module_tree();
        let view = tree.effective(child).unwrap();
        assert_eq!(view.dependencies.len(), 3);

        let slf4j = view.dependency("org.slf4j", "slf4j-api").unwrap();
        assert_eq!(slf4j.version, VersionSpec::Declared("2.0.12".into()));
        assert_eq!(slf4j.declared_in, child);

        let jackson = view
            .dependency("com.fasterxml.jackson.core", "jackson-databind")
            .unwrap();
        assert_eq!(jackson.version, VersionSpec::Managed("2.17.0".into()));
        assert_eq!(jackson.dependency.version.as_deref(), Some("2.17.0"));

        let sibling = view.dependency("com.example", "sibling").unwrap();
        assert_eq!(sibling.version.resolved(), Some("1.4.0"));
    }

    #[test]
    fn test_plugin_version_from_management() {
        let (tree, child) = two_module_tree();
        let view = tree.effective(child).unwrap();
        let surefire = view
            .plugin("org.apache.maven.plugins", "maven-surefire-plugin")
            .unwrap();
        assert_eq!(surefire.version.as_deref(), Some("3.2.5"));
    }

    #[test]
    fn test_effective_properties_idempotent() {
        let (tree, child) = two_module_tree();
        let first = tree.effective(child).unwrap().properties;
        let second = tree.effective(child).unwrap().properties;
        assert_eq!(first, second);

        let view = tree.effective(child).unwrap();
        for value in view.properties.values() {
            assert_eq!(&view.interpolate(value).value, value);
        }
    }

    #[test]
    fn test_unresolved_version_fatal_without_external_source() {
        let xml = r"<project>
  <groupId>g</groupId>
  <artifactId>a</artifactId>
  <dependencies>
    <dependency>
      <groupId>x</groupId>
      <artifactId>y</artifactId>
      <version>${y.version}</version>
    </dependency>
  </dependencies>
</project>";
        let tree = ModuleTree::new(module(xml, "."));
        match tree.effective(tree.root()).unwrap_err() {
            MavenError::UnresolvedProperty {
                field, placeholder, ..
            } => {
                assert_eq!(field, "version of x:y");
                assert_eq!(placeholder, "y.version");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unresolved_version_kept_with_external_parent() {
        let xml = r"<project>
  <parent>
    <groupId>org.springframework.boot</groupId>
    <artifactId>spring-boot-starter-parent</artifactId>
    <version>3.2.0</version>
  </parent>
  <groupId>g</groupId>
  <artifactId>a</artifactId>
  <dependencies>
    <dependency>
      <groupId>x</groupId>
      <artifactId>y</artifactId>
      <version>${y.version}</version>
    </dependency>
    <dependency>
      <groupId>org.springframework.boot</groupId>
      <artifactId>spring-boot-starter-web</artifactId>
    </dependency>
  </dependencies>
</project>";
        let tree = ModuleTree::new(module(xml, "."));
        let view = tree.effective(tree.root()).unwrap();
        assert!(view.has_external_parent);
        assert_eq!(
            view.dependencies[0].version,
            VersionSpec::Unresolved("${y.version}".into())
        );
        assert_eq!(view.dependencies[1].version, VersionSpec::Platform);
        assert_eq!(
            view.parent_chain[0].artifact_id,
            "spring-boot-starter-parent"
        );
    }

    #[test]
    fn test_bom_imports_collected() {
        let xml = r"<project>
  <groupId>g</groupId>
  <artifactId>a</artifactId>
  <properties><boot.version>3.3.1</boot.version></properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-dependencies</artifactId>
        <version>${boot.version}</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>x</groupId>
      <artifactId>y</artifactId>
      <version>${unknown}</version>
    </dependency>
  </dependencies>
</project>";
        let tree = ModuleTree::new(module(xml, "."));
        let view = tree.effective(tree.root()).unwrap();
        assert_eq!(view.boms.len(), 1);
        assert_eq!(view.boms[0].version, VersionSpec::Declared("3.3.1".into()));
        assert!(view.managed.is_empty());
        assert!(matches!(
            view.dependencies[0].version,
            VersionSpec::Unresolved(_)
        ));
    }
}
