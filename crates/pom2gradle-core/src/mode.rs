//! Migration mode switch.

use crate::error::CoreError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How the generated Gradle build relates to the existing Maven build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationMode {
    /// Gradle replaces Maven; POM files may be retired afterwards.
    #[default]
    Full,
    /// Gradle is added next to Maven; no Maven file is touched.
    Overlay,
}

impl MigrationMode {
    pub const fn is_overlay(self) -> bool {
        matches!(self, Self::Overlay)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Overlay => "overlay",
        }
    }
}

impl FromStr for MigrationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // "migrate" is the historical name of the full mode
            "full" | "migrate" => Ok(Self::Full),
            "overlay" => Ok(Self::Overlay),
            _ => Err(CoreError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("full".parse::<MigrationMode>().unwrap(), MigrationMode::Full);
        assert_eq!(
            "migrate".parse::<MigrationMode>().unwrap(),
            MigrationMode::Full
        );
        assert_eq!(
            "Overlay".parse::<MigrationMode>().unwrap(),
            MigrationMode::Overlay
        );
    }

    #[test]
    fn test_parse_unknown_mode() {
        let err = "dual".parse::<MigrationMode>().unwrap_err();
        assert_eq!(err, CoreError::UnknownMode("dual".into()));
    }

    #[test]
    fn test_default_and_display() {
        assert_eq!(MigrationMode::default(), MigrationMode::Full);
        assert!(!MigrationMode::Full.is_overlay());
        assert!(MigrationMode::Overlay.is_overlay());
        assert_eq!(MigrationMode::Overlay.to_string(), "overlay");
    }
}
