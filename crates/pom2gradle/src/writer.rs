//! Output sinks for generated files.

use crate::error::{MigrateError, Result};
use pom2gradle_core::GeneratedFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for generated files.
pub trait FileSink {
    /// Stores one file.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Write`] when the file cannot be stored.
    fn write(&mut self, file: &GeneratedFile) -> Result<()>;
}

/// Writes every file below `root`, creating directories as needed.
#[derive(Debug, Clone)]
pub struct DiskWriter {
    root: PathBuf,
}

impl DiskWriter {
    /// # Errors
    ///
    /// Fails when `root` exists and is not a directory, or cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            return Err(MigrateError::NotADirectory { path: root });
        }
        fs::create_dir_all(&root).map_err(|e| MigrateError::write(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn append(&self, path: &Path, contents: &str) -> Result<()> {
        let existing = match fs::read_to_string(path) {
            Ok(existing) => existing,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(MigrateError::write(path, e)),
        };
        if existing.lines().any(|line| line.trim() == ".gradle/") {
            tracing::debug!(path = %path.display(), "ignore rules already present");
            return Ok(());
        }

        let mut updated = existing;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        if !updated.is_empty() {
            updated.push('\n');
        }
        updated.push_str(contents);
        fs::write(path, updated).map_err(|e| MigrateError::write(path, e))
    }
}

impl FileSink for DiskWriter {
    fn write(&mut self, file: &GeneratedFile) -> Result<()> {
        let path = self.root.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MigrateError::write(parent, e))?;
        }
        tracing::debug!(path = %path.display(), "writing");
        if file.is_append() {
            self.append(&path, &file.contents)
        } else {
            fs::write(&path, &file.contents).map_err(|e| MigrateError::write(&path, e))
        }
    }
}

/// Prints each file behind a `==> path <==` banner instead of writing it.
pub struct Preview<W: Write> {
    out: W,
}

impl<W: Write> Preview<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FileSink for Preview<W> {
    fn write(&mut self, file: &GeneratedFile) -> Result<()> {
        let banner = if file.is_append() {
            format!("==> {} (append) <==", file.path.display())
        } else {
            format!("==> {} <==", file.path.display())
        };
        writeln!(self.out, "{banner}")
            .and_then(|()| self.out.write_all(file.contents.as_bytes()))
            .and_then(|()| {
                if file.contents.ends_with('\n') {
                    writeln!(self.out)
                } else {
                    writeln!(self.out, "\n")
                }
            })
            .map_err(|e| MigrateError::write(&file.path, e))
    }
}

/// Hands every file to `sink`, stopping at the first failure.
///
/// # Errors
///
/// Propagates the sink's error.
pub fn write_all(sink: &mut impl FileSink, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        sink.write(file)?;
    }
    Ok(())
}
