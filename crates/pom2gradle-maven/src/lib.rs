//! Maven side of the migration: pom.xml parsing, the module tree,
//! inheritance-aware effective views and tech stack detection.

pub mod effective;
pub mod error;
pub mod interpolate;
pub mod parser;
pub mod source;
pub mod stack;
pub mod tree;
pub mod types;
pub mod version;

pub use effective::{EffectiveModule, ResolvedDependency, ResolvedPlugin, VersionSpec};
pub use error::{MavenError, Result, UnknownScope};
pub use interpolate::{Interpolated, PropertyResolver};
pub use parser::parse_pom;
pub use source::{FsPomSource, MemoryPomSource, PomSource};
pub use stack::{
    AnnotationProcessor, Detection, Language, ProcessorOrigin, SpringBoot, StackDescriptor,
    detect,
};
pub use tree::{ModuleFailure, ModuleId, ModuleTree};
pub use types::{
    Activation, Dependency, Exclusion, Module, ParentRef, Plugin, PluginConfiguration, Profile,
    Repository, Scope,
};
pub use version::compare_versions;
