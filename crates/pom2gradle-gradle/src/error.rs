//! Errors raised while generating Gradle files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradleError {
    #[error(transparent)]
    Maven(#[from] pom2gradle_maven::MavenError),

    #[error("No version catalog alias for {coordinate}")]
    MissingAlias { coordinate: String },

    #[error("Generated version catalog is invalid: {message}")]
    InvalidCatalog { message: String },
}

pub type Result<T> = std::result::Result<T, GradleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_alias_display() {
        let err = GradleError::MissingAlias {
            coordinate: "org.example:widget".into(),
        };
        assert_eq!(
            err.to_string(),
            "No version catalog alias for org.example:widget"
        );
    }

    #[test]
    fn test_maven_error_is_transparent() {
        let maven = pom2gradle_maven::MavenError::UnresolvedProperty {
            path: PathBuf::from("core/pom.xml"),
            field: "groupId".into(),
            placeholder: "org".into(),
        };
        let expected = maven.to_string();
        let err: GradleError = maven.into();
        assert_eq!(err.to_string(), expected);
    }
}
