use clap::Parser;
use pom2gradle::{Cli, DiskWriter, MigrationReport, Preview, migrate, write_all};
use pom2gradle_maven::FsPomSource;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn run(cli: &Cli) -> pom2gradle::Result<MigrationReport> {
    let report = migrate(&FsPomSource, &cli.root_pom(), cli.options())?;
    if cli.dry_run {
        let mut preview = Preview::new(std::io::stdout().lock());
        write_all(&mut preview, &report.files)?;
    } else {
        let mut writer = DiskWriter::new(cli.output_dir())?;
        write_all(&mut writer, &report.files)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprint!("{}", report.render_text());
    }
    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(report) if report.is_partial() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
