//! Command-line arguments.

use crate::pipeline::MigrationOptions;
use clap::Parser;
use pom2gradle_core::MigrationMode;
use std::path::{Path, PathBuf};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("POM2GRADLE_GIT_HASH"),
    ")"
);

/// Convert a Maven build into a Gradle Kotlin DSL build with a version catalog.
#[derive(Parser, Debug)]
#[command(name = "pom2gradle")]
#[command(version = VERSION)]
#[command(after_help = "EXAMPLES:
    # Convert the project in the current directory
    pom2gradle

    # Print the generated files without writing anything
    pom2gradle ./service --dry-run

    # Keep Maven authoritative and add Gradle next to it
    pom2gradle ./service --mode overlay

    # Machine-readable report
    pom2gradle ./service --json > report.json
")]
pub struct Cli {
    /// Project directory or root pom.xml
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Directory to write the Gradle build into (defaults to the project directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Print the generated files instead of writing them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// full: Gradle replaces Maven. overlay: Gradle is added next to Maven
    #[arg(short, long, default_value = "full", value_name = "MODE")]
    pub mode: MigrationMode,

    /// Print the migration report as JSON on stdout
    #[arg(long, conflicts_with = "dry_run")]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The root POM named by `project`.
    pub fn root_pom(&self) -> PathBuf {
        if self.project.extension().is_some_and(|ext| ext == "xml") {
            self.project.clone()
        } else {
            self.project.join("pom.xml")
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            self.root_pom()
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        })
    }

    pub const fn options(&self) -> MigrationOptions {
        MigrationOptions { mode: self.mode }
    }

    /// Filter used when `RUST_LOG` is unset.
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
