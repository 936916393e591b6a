//! Non-fatal conditions collected during a migration run.
//!
//! Advisories never abort anything. Every stage pushes them into the run's
//! report so the front end can render them; the core never prints them.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A version that lost catalog deduplication to a higher one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredVersion {
    /// artifactId of the declaring module.
    pub module: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// A `<module>` entry pointed back at a POM already on the ancestor chain.
    ModuleCycle { from: PathBuf, to: PathBuf },

    /// A POM reached a second time through a different aggregator.
    DuplicateModule { from: PathBuf, path: PathBuf },

    /// A Maven plugin without a known Gradle equivalent.
    UnmappedPlugin { module: String, coordinate: String },

    /// Several versions of one artifact were declared; the highest won.
    VersionOverride {
        coordinate: String,
        chosen: String,
        overridden: Vec<DeclaredVersion>,
    },

    /// A stack attribute could not be detected and a fallback was emitted.
    UnknownStackAttribute {
        module: String,
        attribute: String,
        assumed: String,
    },

    /// A dependency version placeholder nothing in the tree defines.
    UnresolvedVersion {
        module: String,
        coordinate: String,
        raw: String,
    },

    /// A plugin option whose placeholders could not be resolved; the
    /// generated block carries `TODO` in its place.
    UnresolvedOption {
        module: String,
        plugin: String,
        option: String,
        raw: String,
    },

    /// A Maven profile that was only documented, never converted.
    ManualProfile { module: String, profile: String },
}

impl Advisory {
    /// Short machine-friendly label, matching the serialized `kind` tag.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ModuleCycle { .. } => "module_cycle",
            Self::DuplicateModule { .. } => "duplicate_module",
            Self::UnmappedPlugin { .. } => "unmapped_plugin",
            Self::VersionOverride { .. } => "version_override",
            Self::UnknownStackAttribute { .. } => "unknown_stack_attribute",
            Self::UnresolvedVersion { .. } => "unresolved_version",
            Self::UnresolvedOption { .. } => "unresolved_option",
            Self::ManualProfile { .. } => "manual_profile",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleCycle { from, to } => write!(
                f,
                "module cycle: {} lists {} which is already one of its ancestors; edge skipped",
                from.display(),
                to.display()
            ),
            Self::DuplicateModule { from, path } => write!(
                f,
                "duplicate module: {} lists {} which was already parsed; skipped",
                from.display(),
                path.display()
            ),
            Self::UnmappedPlugin { module, coordinate } => write!(
                f,
                "{module}: Maven plugin {coordinate} has no known Gradle equivalent"
            ),
            Self::VersionOverride {
                coordinate,
                chosen,
                overridden,
            } => {
                write!(f, "{coordinate}: catalog uses {chosen}, overriding")?;
                for (i, declared) in overridden.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{} ({})", declared.version, declared.module)?;
                }
                Ok(())
            }
            Self::UnknownStackAttribute {
                module,
                attribute,
                assumed,
            } => write!(
                f,
                "{module}: {attribute} not declared, assumed {assumed}; confirm manually"
            ),
            Self::UnresolvedVersion {
                module,
                coordinate,
                raw,
            } => write!(
                f,
                "{module}: version '{raw}' of {coordinate} could not be resolved"
            ),
            Self::UnresolvedOption {
                module,
                plugin,
                option,
                raw,
            } => write!(
                f,
                "{module}: {plugin} option {option} = '{raw}' could not be resolved"
            ),
            Self::ManualProfile { module, profile } => write!(
                f,
                "{module}: Maven profile '{profile}' requires manual conversion"
            ),
        }
    }
}
