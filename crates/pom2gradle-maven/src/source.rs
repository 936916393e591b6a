//! Where POM documents come from.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read access to POM files, keyed by path.
pub trait PomSource {
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Stable identity of a path, used for cycle and duplicate detection.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        normalize_path(path)
    }
}

/// Reads POMs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPomSource;

impl PomSource for FsPomSource {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize_path(path))
    }
}

/// In-memory POM set, for tests and previews of unsaved trees.
#[derive(Debug, Clone, Default)]
pub struct MemoryPomSource {
    files: HashMap<PathBuf, String>,
}

impl MemoryPomSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .insert(normalize_path(path.as_ref()), content.into());
    }
}

impl PomSource for MemoryPomSource {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize_path(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

/// Lexically resolves `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Joins a `<module>` entry onto its parent's root-relative directory,
/// producing a `/`-separated path (`.` for the root itself).
pub fn join_source_dir(parent: &str, entry: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let entry = entry.trim_end_matches('/');
    let entry_dir = if entry.ends_with(".xml") {
        entry.rsplit_once('/').map_or("", |(dir, _)| dir)
    } else {
        entry
    };

    for segment in parent
        .split('/')
        .chain(entry_dir.split(['/', '\\']))
        .filter(|s| !s.is_empty() && *s != ".")
    {
        if segment == ".." && segments.last().is_some_and(|last| *last != "..") {
            segments.pop();
        } else {
            segments.push(segment);
        }
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("root/./core/../web/pom.xml")),
            PathBuf::from("root/web/pom.xml")
        );
        assert_eq!(
            normalize_path(Path::new("../shared/pom.xml")),
            PathBuf::from("../shared/pom.xml")
        );
    }

    #[test]
    fn test_join_source_dir() {
        assert_eq!(join_source_dir(".", "core"), "core");
        assert_eq!(join_source_dir("services", "api/"), "services/api");
        assert_eq!(join_source_dir("services", "../libs/util"), "libs/util");
        assert_eq!(join_source_dir(".", "../sibling"), "../sibling");
        assert_eq!(join_source_dir(".", "tools/pom-alt.xml"), "tools");
        assert_eq!(join_source_dir("a", "."), "a");
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryPomSource::new().with("proj/pom.xml", "<project/>");
        assert_eq!(
            source.read(Path::new("proj/./pom.xml")).unwrap(),
            "<project/>"
        );
        let err = source.read(Path::new("proj/core/pom.xml")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(
            source.canonicalize(Path::new("proj/core/../pom.xml")),
            PathBuf::from("proj/pom.xml")
        );
    }

    #[test]
    fn test_fs_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let pom = dir.path().join("pom.xml");
        std::fs::write(&pom, "<project/>").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let source = FsPomSource;
        assert_eq!(source.read(&pom).unwrap(), "<project/>");
        assert!(source.read(&dir.path().join("missing.xml")).is_err());
        assert_eq!(
            source.canonicalize(&dir.path().join("sub/../pom.xml")),
            source.canonicalize(&pom)
        );
    }
}
