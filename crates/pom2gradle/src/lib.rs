//! Maven to Gradle Kotlin DSL migration: the pipeline, its report and the
//! sinks that commit generated files.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod writer;

pub use cli::Cli;
pub use error::{MigrateError, Result};
pub use pipeline::{MigrationOptions, migrate};
pub use report::{MigrationReport, ModuleOutcome, ModuleStatus};
pub use writer::{DiskWriter, FileSink, Preview, write_all};
