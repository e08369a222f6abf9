use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gitline::config::{self, GitOptions};
use gitline::git::LocateError;
use gitline::segment::{GitContext, GitSegment};

mod cli;

use cli::{Cli, Commands, OutputFormat};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

/// Locate the repository, or `None` when there is nothing to show.
fn locate<'a>(
    directory: Option<&Path>,
    options: &'a GitOptions,
) -> anyhow::Result<Option<GitSegment<'a>>> {
    let dir = match directory {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    match GitSegment::locate(&dir, options) {
        Ok(segment) => Ok(Some(segment)),
        Err(e) if LocateError::is_absence(&e) => {
            log::debug!("{e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.config {
        config::set_config_path(path.clone());
    }

    let command = cli.command.unwrap_or(Commands::Status {
        format: OutputFormat::Text,
    });
    let directory = cli.directory.as_deref();

    match command {
        Commands::Schema { config: true } => {
            let schema = schemars::schema_for!(GitOptions);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Schema { config: false } => {
            let schema = schemars::schema_for!(GitContext);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Status { format } => {
            let options = config::load()?;
            let Some(segment) = locate(directory, &options)? else {
                return Ok(());
            };
            let context = segment.evaluate();
            match format {
                OutputFormat::Text => println!("{}", context.to_text()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&context)?),
            }
        }
        Commands::Locate => {
            let options = config::load()?;
            let Some(segment) = locate(directory, &options)? else {
                return Ok(());
            };
            let location = segment.location();
            println!("topology: {}", location.topology);
            println!("metadata: {}", location.metadata_dir);
            println!("working: {}", location.working_dir);
            println!("real: {}", location.real_dir);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
