//! Command-line interface definitions.
//!
//! Global options (verbosity, colour, error format) come before the
//! subcommand.
//!
//! ```bash
//! # Report duplicates in one directory (dry run)
//! dupsweep scan ~/Downloads
//!
//! # Recurse into two trees, hash with BLAKE3 and SHA-512
//! dupsweep scan -r ~/photos /mnt/backup/photos --algorithm blake3 --algorithm sha512
//!
//! # Move redundant copies to the trash, keeping the newest
//! dupsweep scan -r ~/Downloads --keep newest --delete --trash -y
//!
//! # Show effective configuration
//! dupsweep config show
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::actions::{KeepPolicy, ResolveMode};
use crate::config::Settings;
use crate::scanner::{HashAlgorithm, SearchTarget};

/// Find duplicate files by content.
///
/// Files are grouped by size, hashed in a single pass with one or more
/// algorithms, and grouped by composite signature. Redundant copies are
/// reported, or removed when explicitly requested.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directories to scan, in discovery order
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Hash algorithm (repeatable; order sets the signature order)
    ///
    /// One of: md5, sha256, sha512, blake3, xxh64
    #[arg(short, long = "algorithm", value_name = "NAME", value_parser = parse_algorithm)]
    pub algorithms: Vec<HashAlgorithm>,

    /// Read block size (e.g., 64KiB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub block_size: Option<u64>,

    /// Number of I/O threads for hashing
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Which copy of each duplicate group to keep
    #[arg(short, long, value_enum, value_name = "POLICY")]
    pub keep: Option<KeepPolicy>,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Look inside archives (accepted, archives are currently hashed as plain files)
    #[arg(long)]
    pub search_archives: bool,

    /// Remove redundant copies instead of only reporting them
    #[arg(long)]
    pub delete: bool,

    /// With --delete, move files to the system trash instead of deleting them
    #[arg(long, requires = "delete")]
    pub trash: bool,

    /// Confirm removal (required with --delete)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ScanArgs {
    /// Overlay the flags given on the command line onto loaded settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if self.recursive {
            settings.recursive = true;
        }
        if !self.algorithms.is_empty() {
            settings.algorithms = self.algorithms.clone();
        }
        if let Some(block_size) = self.block_size {
            settings.block_size = usize::try_from(block_size).unwrap_or(usize::MAX);
        }
        if let Some(io_threads) = self.io_threads {
            settings.io_threads = io_threads;
        }
        if let Some(keep) = self.keep {
            settings.keep = keep;
        }
        if self.min_size.is_some() {
            settings.min_size = self.min_size;
        }
        if self.max_size.is_some() {
            settings.max_size = self.max_size;
        }
        if self.skip_hidden {
            settings.skip_hidden = true;
        }
    }

    /// Resolution mode selected by `--delete` and `--trash`.
    #[must_use]
    pub fn resolve_mode(&self) -> ResolveMode {
        match (self.delete, self.trash) {
            (false, _) => ResolveMode::DryRun,
            (true, true) => ResolveMode::Trash,
            (true, false) => ResolveMode::Permanent,
        }
    }

    /// Search targets, one per path, in command-line order.
    #[must_use]
    pub fn targets(&self, recursive: bool) -> Vec<SearchTarget> {
        self.paths
            .iter()
            .map(|p| {
                SearchTarget::new(p.clone())
                    .with_recursive(recursive)
                    .with_search_archives(self.search_archives)
            })
            .collect()
    }
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// What to show
    #[command(subcommand)]
    pub action: ConfigAction,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the effective settings as TOML
    Show,
    /// Print the default configuration file path
    Path,
}

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn parse_algorithm(s: &str) -> Result<HashAlgorithm, String> {
    s.parse()
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupsweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
