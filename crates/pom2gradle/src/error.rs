use pom2gradle_gradle::GradleError;
use pom2gradle_maven::MavenError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a migration run.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error(transparent)]
    Maven(#[from] MavenError),

    #[error(transparent)]
    Gradle(#[from] GradleError),

    #[error("No module of {root} could be converted")]
    NothingConverted { root: PathBuf },

    #[error("Output path {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

impl MigrateError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_display() {
        let err = MigrateError::write(
            "out/settings.gradle.kts",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to write out/settings.gradle.kts: denied"
        );
    }

    #[test]
    fn test_maven_error_passes_through() {
        let err: MigrateError = MavenError::io(
            "pom.xml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        )
        .into();
        assert_eq!(err.to_string(), "Failed to read pom.xml: missing");
    }
}
