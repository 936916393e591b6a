//! Gradle side of the migration.
//!
//! Turns analyzed Maven modules into Gradle files:
//! - `gradle/libs.versions.toml` (version catalog shared by all modules)
//! - `build.gradle.kts` per module (Kotlin DSL)
//! - `settings.gradle.kts`, `gradle.properties` and ignore rules

pub mod alias;
pub mod build_script;
pub mod catalog;
pub mod error;
mod kts;
pub mod mapping;
pub mod project;
pub mod properties;
pub mod settings;

pub use build_script::{BuildScript, generate_build_script};
pub use catalog::{CatalogSummary, EntryKind, LibraryEntry, PluginEntry, VersionCatalog, validate_catalog};
pub use error::{GradleError, Result};
pub use mapping::{ConfigurationMapping, GradlePlugin, PluginMapping, plugin_mapping, scope_configuration};
pub use project::{ModuleError, ModulePlan, Project};
pub use properties::{IGNORE_RULES, generate_properties};
pub use settings::{custom_repositories, generate_settings};
