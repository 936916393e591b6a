//! Per-module analysis shared by every generator.

use crate::error::GradleError;
use pom2gradle_maven::{EffectiveModule, ModuleId, ModuleTree, StackDescriptor, detect};
use std::collections::HashMap;

/// Effective view and detected stack of one module.
#[derive(Debug)]
pub struct ModulePlan<'a> {
    pub view: EffectiveModule<'a>,
    pub stack: StackDescriptor,
}

impl ModulePlan<'_> {
    pub fn id(&self) -> ModuleId {
        self.view.id
    }

    /// Name used in advisories and comments.
    pub fn name(&self) -> &str {
        &self.view.artifact_id
    }

    pub fn gradle_path(&self) -> String {
        self.view.module.gradle_path()
    }

    /// Whether the module produces no artifact of its own.
    pub fn is_aggregator(&self) -> bool {
        self.view.module.is_aggregator()
    }
}

/// A module whose effective view could not be computed.
#[derive(Debug)]
pub struct ModuleError {
    pub id: ModuleId,
    pub error: GradleError,
}

/// The analyzed tree: one plan per module, in traversal order.
#[derive(Debug)]
pub struct Project<'a> {
    pub tree: &'a ModuleTree,
    plans: Vec<ModulePlan<'a>>,
    failures: Vec<ModuleError>,
    coordinates: HashMap<String, ModuleId>,
}

impl<'a> Project<'a> {
    /// Computes effective views and stacks for every module.
    ///
    /// Modules whose view fails are recorded and left out of the plans.
    pub fn analyze(tree: &'a ModuleTree) -> Self {
        let mut plans = Vec::with_capacity(tree.len());
        let mut failures = Vec::new();
        let mut coordinates = HashMap::new();

        for id in tree.iter() {
            match tree.effective(id) {
                Ok(view) => {
                    let stack = detect(&view);
                    coordinates.insert(view.coordinate(), id);
                    plans.push(ModulePlan { view, stack });
                }
                Err(error) => {
                    tracing::warn!(module = %tree.module(id).artifact_id, error = %error, "cannot analyze module");
                    failures.push(ModuleError {
                        id,
                        error: error.into(),
                    });
                }
            }
        }

        Self {
            tree,
            plans,
            failures,
            coordinates,
        }
    }

    pub fn plans(&self) -> &[ModulePlan<'a>] {
        &self.plans
    }

    pub fn plan(&self, id: ModuleId) -> Option<&ModulePlan<'a>> {
        self.plans.iter().find(|p| p.id() == id)
    }

    pub fn root(&self) -> Option<&ModulePlan<'a>> {
        self.plan(self.tree.root())
    }

    pub fn failures(&self) -> &[ModuleError] {
        &self.failures
    }

    /// In-tree module declaring `group_id:artifact_id`.
    pub fn module_for(&self, group_id: &str, artifact_id: &str) -> Option<ModuleId> {
        self.coordinates
            .get(&format!("{group_id}:{artifact_id}"))
            .copied()
    }

    pub fn is_multi_module(&self) -> bool {
        self.tree.is_multi_module()
    }

    /// Spring Boot is applied anywhere in the tree.
    pub fn uses_spring_boot(&self) -> bool {
        self.plans.iter().any(|p| p.stack.spring_boot.is_some())
    }

    pub fn uses_kotlin(&self) -> bool {
        self.plans.iter().any(|p| p.stack.is_kotlin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pom2gradle_maven::MemoryPomSource;
    use std::path::Path;

    #[test]
    fn test_analyze_collects_plans_and_coordinates() {
        let source = MemoryPomSource::new()
            .with(
                "p/pom.xml",
                "<project><groupId>g</groupId><artifactId>root</artifactId><version>1</version>\
                 <packaging>pom</packaging><modules><module>lib</module></modules></project>",
            )
            .with(
                "p/lib/pom.xml",
                "<project><parent><groupId>g</groupId><artifactId>root</artifactId>\
                 <version>1</version></parent><artifactId>lib</artifactId></project>",
            );
        let tree = ModuleTree::load(&source, Path::new("p/pom.xml")).unwrap();
        let project = Project::analyze(&tree);

        assert_eq!(project.plans().len(), 2);
        assert!(project.failures().is_empty());
        assert!(project.root().unwrap().is_aggregator());
        assert_eq!(project.module_for("g", "lib"), Some(tree.children(tree.root())[0]));
        assert_eq!(project.plans()[1].gradle_path(), ":lib");
        assert!(!project.uses_spring_boot());
        assert!(project.is_multi_module());
    }
}
