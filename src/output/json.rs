//! JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "size": 1024,
//!       "signature": "md5#..._sha256#...",
//!       "files": ["/data/a.txt", "/data/b.txt"],
//!       "keep": "/data/a.txt",
//!       "remove": ["/data/b.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_space": 1024,
//!     "mode": "dry-run",
//!     "removed_files": 0,
//!     "bytes_reclaimed": 0,
//!     "scan_duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   },
//!   "warnings": []
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::actions::{ResolveMode, ResolveReport};
use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group with its resolution plan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// Composite content signature
    pub signature: String,
    /// Member paths in discovery order
    pub files: Vec<String>,
    /// Surviving file
    pub keep: Option<String>,
    /// Removal candidates
    pub remove: Vec<String>,
    /// Members that resolve to the kept file and are left alone
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub same_as_keep: Vec<String>,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one copy per group)
    pub duplicate_files: usize,
    /// Bytes held by the redundant copies
    pub reclaimable_space: u64,
    /// Resolution mode: "dry-run", "trash" or "permanent"
    pub mode: &'static str,
    /// Files removed (0 in a dry run)
    pub removed_files: usize,
    /// Bytes actually freed (0 in a dry run)
    pub bytes_reclaimed: u64,
    /// Removals that failed
    pub failed_removals: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: &'static str,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups, ordered by first discovery
    pub groups: Vec<JsonDuplicateGroup>,
    /// Scan and resolution summary
    pub summary: JsonSummary,
    /// Per-file warnings (scan, hash and removal failures)
    pub warnings: Vec<String>,
}

fn mode_name(mode: ResolveMode) -> &'static str {
    match mode {
        ResolveMode::DryRun => "dry-run",
        ResolveMode::Trash => "trash",
        ResolveMode::Permanent => "permanent",
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl JsonOutput {
    /// Build the JSON document for a run.
    ///
    /// `report` plans are matched to `groups` by signature and size.
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        summary: &ScanSummary,
        report: &ResolveReport,
        exit_code: ExitCode,
    ) -> Self {
        let json_groups = groups
            .iter()
            .map(|group| {
                let plan = report
                    .plans
                    .iter()
                    .find(|p| p.size == group.size && p.signature == group.signature);
                JsonDuplicateGroup {
                    size: group.size,
                    signature: group.signature.clone(),
                    files: group.files.iter().map(|f| path_string(&f.path)).collect(),
                    keep: plan.map(|p| path_string(&p.keep.path)),
                    remove: plan
                        .map(|p| p.remove.iter().map(|f| path_string(&f.path)).collect())
                        .unwrap_or_default(),
                    same_as_keep: plan
                        .map(|p| p.same_as_keep.iter().map(|f| path_string(&f.path)).collect())
                        .unwrap_or_default(),
                }
            })
            .collect();

        let mut warnings = summary.warning_messages();
        warnings.extend(report.failures.iter().map(|f| f.error.to_string()));

        Self {
            groups: json_groups,
            summary: JsonSummary {
                total_files: summary.total_files,
                total_size: summary.total_size,
                duplicate_groups: summary.duplicate_groups,
                duplicate_files: summary.duplicate_files,
                reclaimable_space: summary.reclaimable_space,
                mode: mode_name(report.mode),
                removed_files: report.removed.len(),
                bytes_reclaimed: report.bytes_reclaimed,
                failed_removals: report.failures.len(),
                scan_duration_ms: summary.scan_duration.as_millis() as u64,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix(),
            },
            warnings,
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)
    }
}
