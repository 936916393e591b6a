//! Core vocabulary shared by the pom2gradle crates.
//!
//! This crate holds the types every stage of the migration agrees on:
//! the migration mode, the advisory conditions collected during a run, and
//! the in-memory description of a generated file.

pub mod advisory;
pub mod error;
pub mod mode;
pub mod output;

pub use advisory::{Advisory, DeclaredVersion};
pub use error::{CoreError, Result};
pub use mode::MigrationMode;
pub use output::{FileKind, GeneratedFile};
