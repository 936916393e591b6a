//! The rooted module tree and its loader.

use crate::error::{MavenError, Result};
use crate::parser::parse_pom;
use crate::source::{PomSource, join_source_dir};
use crate::types::Module;
use pom2gradle_core::Advisory;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Index of a module inside its [`ModuleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A child POM that could not be loaded. Its subtree is absent from the tree.
#[derive(Debug)]
pub struct ModuleFailure {
    pub pom_path: PathBuf,
    /// Root-relative directory the module would have occupied.
    pub source_dir: String,
    pub error: MavenError,
}

/// Acyclic parent/child structure of modules.
///
/// Modules are stored in an arena; children only ever point at modules
/// added after their parent, so the structure cannot contain cycles.
#[derive(Debug)]
pub struct ModuleTree {
    modules: Vec<Module>,
    parents: Vec<Option<ModuleId>>,
    children: Vec<Vec<ModuleId>>,
    advisories: Vec<Advisory>,
    failures: Vec<ModuleFailure>,
}

impl ModuleTree {
    /// Creates a tree holding only `root`.
    pub fn new(mut root: Module) -> Self {
        root.is_root = true;
        root.source_dir = ".".into();
        Self {
            modules: vec![root],
            parents: vec![None],
            children: vec![Vec::new()],
            advisories: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Links `module` as the last child of `parent`.
    pub fn add_child(&mut self, parent: ModuleId, mut module: Module) -> ModuleId {
        module.is_root = false;
        let id = ModuleId(self.modules.len());
        self.modules.push(module);
        self.parents.push(Some(parent));
        self.children.push(Vec::new());
        self.children[parent.0].push(id);
        id
    }

    /// Parses `root_pom` and every module reachable through `<modules>`.
    ///
    /// Child failures, cycles and duplicate module references are recorded
    /// on the tree; only a failure of the root POM itself is returned.
    ///
    /// # Errors
    ///
    /// Returns the root's read, parse or resolution error.
    pub fn load(source: &impl PomSource, root_pom: &Path) -> Result<Self> {
        let content = source
            .read(root_pom)
            .map_err(|e| MavenError::io(root_pom, e))?;
        let root = parse_pom(&content, root_pom)?;
        let mut tree = Self::new(root);
        tree.effective(tree.root())?;

        let canonical_root = source.canonicalize(root_pom);
        let mut chain = vec![canonical_root.clone()];
        let mut visited = HashSet::from([canonical_root]);
        tree.load_children(source, tree.root(), &mut chain, &mut visited);

        tracing::info!(
            modules = tree.len(),
            failures = tree.failures.len(),
            advisories = tree.advisories.len(),
            "loaded module tree"
        );
        Ok(tree)
    }

    fn load_children(
        &mut self,
        source: &impl PomSource,
        parent: ModuleId,
        chain: &mut Vec<PathBuf>,
        visited: &mut HashSet<PathBuf>,
    ) {
        let parent_module = &self.modules[parent.0];
        let parent_pom = parent_module.pom_path.clone();
        let parent_dir = parent_module.source_dir.clone();
        let base = parent_pom.parent().map(Path::to_path_buf).unwrap_or_default();
        let entries = parent_module.modules.clone();

        for entry in entries {
            let pom_path = if entry.ends_with(".xml") {
                base.join(&entry)
            } else {
                base.join(&entry).join("pom.xml")
            };
            let canonical = source.canonicalize(&pom_path);

            if chain.contains(&canonical) {
                tracing::warn!(
                    from = %parent_pom.display(),
                    to = %pom_path.display(),
                    "module cycle detected, skipping edge"
                );
                self.advisories.push(Advisory::ModuleCycle {
                    from: parent_pom.clone(),
                    to: pom_path,
                });
                continue;
            }
            if !visited.insert(canonical.clone()) {
                tracing::warn!(path = %pom_path.display(), "module listed twice, skipping");
                self.advisories.push(Advisory::DuplicateModule {
                    from: parent_pom.clone(),
                    path: pom_path,
                });
                continue;
            }

            let source_dir = join_source_dir(&parent_dir, &entry);
            let parsed = source
                .read(&pom_path)
                .map_err(|e| MavenError::io(&pom_path, e))
                .and_then(|content| parse_pom(&content, &pom_path));
            let mut module = match parsed {
                Ok(module) => module,
                Err(error) => {
                    self.record_failure(pom_path, source_dir, error);
                    continue;
                }
            };
            module.source_dir.clone_from(&source_dir);

            let id = self.add_child(parent, module);
            if let Err(error) = self.effective(id).map(|_| ()) {
                self.detach_last(id);
                self.record_failure(pom_path, source_dir, error);
                continue;
            }

            chain.push(canonical);
            self.load_children(source, id, chain, visited);
            chain.pop();
        }
    }

    fn record_failure(&mut self, pom_path: PathBuf, source_dir: String, error: MavenError) {
        tracing::warn!(path = %pom_path.display(), error = %error, "skipping module");
        self.failures.push(ModuleFailure {
            pom_path,
            source_dir,
            error,
        });
    }

    /// Removes the most recently added module, which must be a leaf.
    fn detach_last(&mut self, id: ModuleId) {
        debug_assert_eq!(id.0 + 1, self.modules.len());
        debug_assert!(self.children[id.0].is_empty());
        self.modules.pop();
        self.children.pop();
        if let Some(Some(parent)) = self.parents.pop() {
            self.children[parent.0].retain(|c| *c != id);
        }
    }

    pub const fn root(&self) -> ModuleId {
        ModuleId(0)
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn parent(&self, id: ModuleId) -> Option<ModuleId> {
        self.parents[id.0]
    }

    pub fn children(&self, id: ModuleId) -> &[ModuleId] {
        &self.children[id.0]
    }

    /// Ancestors of `id`, closest first, excluding `id` itself.
    pub fn ancestors(&self, id: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Root-first, depth-first traversal in `<modules>` declaration order.
    ///
    /// Each call starts a fresh traversal.
    pub fn iter(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Modules in traversal order.
    pub fn flatten(&self) -> Vec<&Module> {
        self.iter().map(|id| self.module(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Multi-module trees have at least one child.
    pub fn is_multi_module(&self) -> bool {
        !self.children[0].is_empty()
    }

    /// Cycle and duplicate-module advisories raised while loading.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn cycles(&self) -> impl Iterator<Item = &Advisory> {
        self.advisories
            .iter()
            .filter(|a| matches!(a, Advisory::ModuleCycle { .. }))
    }

    pub fn failures(&self) -> &[ModuleFailure] {
        &self.failures
    }
}

/// Iterator returned by [`ModuleTree::iter`].
pub struct DepthFirst<'a> {
    tree: &'a ModuleTree,
    stack: Vec<ModuleId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = ModuleId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
