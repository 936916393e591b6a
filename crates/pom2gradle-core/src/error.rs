//! Errors shared across pom2gradle crates.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown migration mode '{0}': expected 'full' or 'overlay'")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_display() {
        let err = CoreError::UnknownMode("shadow".into());
        assert_eq!(
            err.to_string(),
            "Unknown migration mode 'shadow': expected 'full' or 'overlay'"
        );
    }
}
