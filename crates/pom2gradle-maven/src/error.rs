//! Errors raised while reading, parsing, and resolving POM files.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MavenError {
    #[error("Malformed XML in {}:{line}:{column}: {message}", .path.display())]
    Xml {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{}: <{element}> is missing required <{field}>", .path.display())]
    MissingCoordinate {
        path: PathBuf,
        element: &'static str,
        field: &'static str,
    },

    #[error("{}: unresolved property '${{{placeholder}}}' in {field}", .path.display())]
    UnresolvedProperty {
        path: PathBuf,
        field: String,
        placeholder: String,
    },

    #[error("{}: unknown scope '{scope}' on dependency {coordinate}", .path.display())]
    InvalidScope {
        path: PathBuf,
        scope: String,
        coordinate: String,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MavenError {
    /// POM file the error was raised for.
    pub fn path(&self) -> &Path {
        match self {
            Self::Xml { path, .. }
            | Self::MissingCoordinate { path, .. }
            | Self::UnresolvedProperty { path, .. }
            | Self::InvalidScope { path, .. }
            | Self::Io { path, .. } => path,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A `<scope>` value Maven does not define.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown dependency scope '{0}'")]
pub struct UnknownScope(pub String);

pub type Result<T> = std::result::Result<T, MavenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_error_display() {
        let err = MavenError::Xml {
            path: PathBuf::from("app/pom.xml"),
            line: 12,
            column: 7,
            message: "unexpected end of document".into(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed XML in app/pom.xml:12:7: unexpected end of document"
        );
    }

    #[test]
    fn test_unresolved_property_display() {
        let err = MavenError::UnresolvedProperty {
            path: PathBuf::from("pom.xml"),
            field: "groupId".into(),
            placeholder: "company.group".into(),
        };
        assert_eq!(
            err.to_string(),
            "pom.xml: unresolved property '${company.group}' in groupId"
        );
    }

    #[test]
    fn test_missing_coordinate_display() {
        let err = MavenError::MissingCoordinate {
            path: PathBuf::from("core/pom.xml"),
            element: "dependency",
            field: "artifactId",
        };
        assert_eq!(
            err.to_string(),
            "core/pom.xml: <dependency> is missing required <artifactId>"
        );
        assert_eq!(err.path(), Path::new("core/pom.xml"));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err = MavenError::io(
            "missing/pom.xml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to read missing/pom.xml"));
    }
}
