//! dupsweep - duplicate file finder
//!
//! Finds files with identical content across one or more directories.
//! Files are grouped by size, hashed once with one or more algorithms into a
//! composite signature, and grouped by (size, signature). Redundant copies
//! are reported, or moved to the trash or deleted when explicitly requested.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::{resolve, NoProgress, ResolveConfig};
//! use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupsweep::scanner::SearchTarget;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default()).unwrap();
//! let (groups, _summary) = finder
//!     .find_duplicates(&[SearchTarget::new("/data").with_recursive(true)])
//!     .unwrap();
//!
//! let report = resolve::<NoProgress>(&groups, &ResolveConfig::default(), None);
//! println!("{}", report.summary());
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context};

use crate::actions::{resolve, ResolveConfig};
use crate::cli::{Cli, Commands, ConfigAction, ConfigArgs, OutputFormat, ScanArgs};
use crate::config::Settings;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, invalid targets, a refused
/// destructive run, interruption, or a failure writing the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    match cli.command {
        Commands::Scan(ref args) => run_scan(args, cli.quiet),
        Commands::Config(ref args) => run_config(args),
    }
}

fn run_scan(args: &ScanArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    if args.delete && !args.yes {
        bail!("--delete removes files; pass --yes to confirm");
    }

    let mut settings =
        Settings::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut settings);
    settings.validate()?;
    log::debug!("Effective settings: {:?}", settings);

    let handler = signal::install_handler()?;
    let progress = Arc::new(Progress::new(quiet || args.output == OutputFormat::Json));

    let config = FinderConfig::from_settings(&settings)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress.clone());
    let finder = DuplicateFinder::new(config)?;

    let targets = args.targets(settings.recursive);
    let (groups, summary) = finder.find_duplicates(&targets)?;

    if handler.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }

    let resolve_config = ResolveConfig::default()
        .with_mode(args.resolve_mode())
        .with_keep(settings.keep);
    let report = resolve(&groups, &resolve_config, Some(progress.as_ref()));

    let exit_code = ExitCode::for_outcome(
        !groups.is_empty(),
        summary.has_warnings() || !report.all_succeeded(),
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary, &report).write_to(&mut out)?,
        OutputFormat::Json => {
            JsonOutput::new(&groups, &summary, &report, exit_code).write_to(&mut out)?;
        }
    }
    out.flush()?;

    Ok(exit_code)
}

fn run_config(args: &ConfigArgs) -> anyhow::Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.action {
        ConfigAction::Show => {
            let settings = Settings::load(args.config.as_deref())?;
            write!(out, "{}", settings.to_toml()?)?;
        }
        ConfigAction::Path => match Settings::default_path() {
            Some(path) => writeln!(out, "{}", path.display())?,
            None => bail!("No configuration directory available on this platform"),
        },
    }

    Ok(ExitCode::Success)
}
