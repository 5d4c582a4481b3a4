//! Duplicate resolution: choosing survivors and removing the rest.
//!
//! # Overview
//!
//! For every confirmed [`DuplicateGroup`], a [`KeepPolicy`] picks the one
//! file that survives; every other member is a removal candidate. What
//! happens to candidates depends on the [`ResolveMode`]:
//! - `DryRun` (default): nothing is touched, candidates and reclaimable
//!   bytes are only reported
//! - `Trash`: candidates are moved to the system trash
//! - `Permanent`: candidates are removed with `std::fs::remove_file`
//!
//! # Safety
//!
//! - Deletion only happens when a destructive mode is explicitly chosen.
//! - Each candidate is re-stat'd before removal; a size change since the
//!   scan leaves the file alone and reports `Modified`.
//! - A plan that would remove every copy of a group is rejected.
//! - A failure on one file never stops the remaining removals.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::{resolve, NoProgress, ResolveConfig};
//! use dupsweep::duplicates::DuplicateGroup;
//!
//! let groups: Vec<DuplicateGroup> = Vec::new();
//! let report = resolve::<NoProgress>(&groups, &ResolveConfig::default(), None);
//! println!("{}", report.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecord;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {source}")]
    PermanentDeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_stat(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Which member of a duplicate group survives.
///
/// Ties on the policy's key fall back to discovery order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum KeepPolicy {
    /// Keep the first file discovered
    #[default]
    First,
    /// Keep the last file discovered
    Last,
    /// Keep the most recently modified file
    Newest,
    /// Keep the least recently modified file
    Oldest,
    /// Keep the file with the shortest path
    ShortestPath,
    /// Keep the file with the longest path
    LongestPath,
}

impl KeepPolicy {
    /// Index (within `files`) of the member to keep, or `None` for an empty slice.
    #[must_use]
    pub fn select(self, files: &[FileRecord]) -> Option<usize> {
        let by_discovery = |a: &FileRecord, b: &FileRecord| a.discovery_index.cmp(&b.discovery_index);
        let path_len = |f: &FileRecord| f.path.as_os_str().len();

        let indexed = files.iter().enumerate();
        let chosen = match self {
            Self::First => indexed.min_by(|(_, a), (_, b)| by_discovery(a, b)),
            Self::Last => indexed.max_by(|(_, a), (_, b)| by_discovery(a, b)),
            Self::Newest => indexed.min_by(|(_, a), (_, b)| {
                b.modified.cmp(&a.modified).then_with(|| by_discovery(a, b))
            }),
            Self::Oldest => indexed.min_by(|(_, a), (_, b)| {
                a.modified.cmp(&b.modified).then_with(|| by_discovery(a, b))
            }),
            Self::ShortestPath => indexed.min_by(|(_, a), (_, b)| {
                path_len(a).cmp(&path_len(b)).then_with(|| by_discovery(a, b))
            }),
            Self::LongestPath => indexed.min_by(|(_, a), (_, b)| {
                path_len(b).cmp(&path_len(a)).then_with(|| by_discovery(a, b))
            }),
        };

        chosen.map(|(idx, _)| idx)
    }
}

/// What to do with removal candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveMode {
    /// Report only
    #[default]
    DryRun,
    /// Move candidates to the system trash
    Trash,
    /// Remove candidates permanently
    Permanent,
}

impl ResolveMode {
    /// Whether this mode touches the filesystem.
    #[must_use]
    pub fn is_destructive(self) -> bool {
        !matches!(self, Self::DryRun)
    }
}

/// Configuration for resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveConfig {
    /// What to do with candidates.
    pub mode: ResolveMode,
    /// Which member of each group survives.
    pub keep: KeepPolicy,
}

impl ResolveConfig {
    /// Set the resolution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the keep policy.
    #[must_use]
    pub fn with_keep(mut self, keep: KeepPolicy) -> Self {
        self.keep = keep;
        self
    }
}

/// Survivor and removal candidates for one duplicate group.
#[derive(Debug, Clone)]
pub struct RemovalPlan {
    /// File size shared by the group
    pub size: u64,
    /// Composite signature shared by the group
    pub signature: String,
    /// The surviving file
    pub keep: FileRecord,
    /// Files to remove, in discovery order
    pub remove: Vec<FileRecord>,
    /// Members that resolve to the kept file (symlinks, other spellings of
    /// its path) and are left alone
    pub same_as_keep: Vec<FileRecord>,
}

impl RemovalPlan {
    /// Build the plan for `group` under `policy`.
    ///
    /// Returns `None` for groups with fewer than two members.
    #[must_use]
    pub fn for_group(group: &DuplicateGroup, policy: KeepPolicy) -> Option<Self> {
        if group.len() < 2 {
            return None;
        }
        let keep_idx = policy.select(&group.files)?;
        let keep = &group.files[keep_idx];
        let keep_resolved = keep.resolved_path();

        let mut remove = Vec::with_capacity(group.len() - 1);
        let mut same_as_keep = Vec::new();
        for (idx, file) in group.files.iter().enumerate() {
            if idx == keep_idx {
                continue;
            }
            if file.path == keep.path || file.resolved_path() == keep_resolved {
                log::debug!(
                    "{} is the same file as {}, not a removal candidate",
                    file.path.display(),
                    keep.path.display()
                );
                same_as_keep.push(file.clone());
            } else {
                remove.push(file.clone());
            }
        }

        Some(Self {
            size: group.size,
            signature: group.signature.clone(),
            keep: keep.clone(),
            remove,
            same_as_keep,
        })
    }

    /// Bytes freed if every candidate is removed.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.size * self.remove.len() as u64
    }
}

/// Build removal plans for all groups.
#[must_use]
pub fn plan_removals(groups: &[DuplicateGroup], policy: KeepPolicy) -> Vec<RemovalPlan> {
    groups
        .iter()
        .filter_map(|g| RemovalPlan::for_group(g, policy))
        .collect()
}

/// Check that a plan leaves a copy in place.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if a candidate is the survivor itself,
/// under any path that resolves to it.
pub fn validate_preserves_copy(plan: &RemovalPlan) -> Result<(), DeleteError> {
    if plan.remove.iter().any(|f| f.is_same_file(&plan.keep)) {
        return Err(DeleteError::AllCopiesWouldBeDeleted);
    }
    Ok(())
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// A failed removal.
#[derive(Debug)]
pub struct DeleteFailure {
    /// File that could not be removed
    pub path: PathBuf,
    /// Why
    pub error: DeleteError,
}

/// Outcome of resolving a set of duplicate groups.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Mode the report was produced in
    pub mode: ResolveMode,
    /// Plans, one per group, in group order
    pub plans: Vec<RemovalPlan>,
    /// Successfully removed files
    pub removed: Vec<DeleteResult>,
    /// Failed removals
    pub failures: Vec<DeleteFailure>,
    /// Bytes actually freed
    pub bytes_reclaimed: u64,
}

impl ResolveReport {
    /// Number of removal candidates across all plans.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.plans.iter().map(|p| p.remove.len()).sum()
    }

    /// Bytes that removing every candidate would free.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.plans.iter().map(RemovalPlan::reclaimable).sum()
    }

    /// Files removed, or that would be removed in a dry run.
    #[must_use]
    pub fn affected_count(&self) -> usize {
        if self.mode.is_destructive() {
            self.removed.len()
        } else {
            self.candidate_count()
        }
    }

    /// Bytes freed, or that would be freed in a dry run.
    #[must_use]
    pub fn affected_bytes(&self) -> u64 {
        if self.mode.is_destructive() {
            self.bytes_reclaimed
        } else {
            self.reclaimable_bytes()
        }
    }

    /// Check if all removals succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.mode {
            ResolveMode::DryRun => format!(
                "Dry run: {} file(s) would be removed, {} bytes reclaimable",
                self.candidate_count(),
                self.reclaimable_bytes()
            ),
            _ if self.all_succeeded() => format!(
                "Removed {} file(s), freed {} bytes",
                self.removed.len(),
                self.bytes_reclaimed
            ),
            _ => format!(
                "Removed {} file(s), {} failed, freed {} bytes",
                self.removed.len(),
                self.failures.len(),
                self.bytes_reclaimed
            ),
        }
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &Path, error: &DeleteError);

    /// Called when the batch completes.
    fn on_complete(&self, report: &ResolveReport);
}

/// Callback that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DeleteProgressCallback for NoProgress {
    fn on_before_delete(&self, _: &Path, _: usize, _: usize) {}
    fn on_delete_success(&self, _: &Path, _: u64) {}
    fn on_delete_failure(&self, _: &Path, _: &DeleteError) {}
    fn on_complete(&self, _: &ResolveReport) {}
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` / `Io` if the file cannot be stat'd
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_stat(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` / `Io` if the file cannot be stat'd
/// - `PermanentDeleteFailed` if removal fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_stat(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete a record's file after checking its size still matches the scan.
///
/// # Errors
///
/// - `Modified` if the size changed since the scan
/// - Other errors from [`delete_to_trash`] or [`permanent_delete`]
pub fn delete_verified(record: &FileRecord, mode: ResolveMode) -> Result<DeleteResult, DeleteError> {
    let current = fs::metadata(&record.path)
        .map_err(|e| DeleteError::from_stat(&record.path, e))?
        .len();

    if current != record.size {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            record.path.display(),
            record.size,
            current
        );
        return Err(DeleteError::Modified(record.path.clone()));
    }

    match mode {
        ResolveMode::Permanent => permanent_delete(&record.path),
        ResolveMode::Trash => delete_to_trash(&record.path),
        ResolveMode::DryRun => Ok(DeleteResult::new(record.path.clone(), record.size, false)),
    }
}

/// Plan and, in a destructive mode, carry out removal of duplicates.
///
/// Processes every group; a failure on one file is recorded and the
/// remaining files are still processed.
pub fn resolve<C: DeleteProgressCallback>(
    groups: &[DuplicateGroup],
    config: &ResolveConfig,
    callback: Option<&C>,
) -> ResolveReport {
    let mut report = ResolveReport {
        mode: config.mode,
        plans: plan_removals(groups, config.keep),
        ..Default::default()
    };

    if !config.mode.is_destructive() {
        log::info!(
            "Dry run: {} removal candidate(s) in {} group(s), {} bytes reclaimable",
            report.candidate_count(),
            report.plans.len(),
            report.reclaimable_bytes()
        );
        if let Some(cb) = callback {
            cb.on_complete(&report);
        }
        return report;
    }

    let total = report.candidate_count();
    let mut index = 0;
    let mut removed = Vec::new();
    let mut failures = Vec::new();

    for plan in &report.plans {
        if let Err(e) = validate_preserves_copy(plan) {
            log::error!("Skipping group {}: {}", plan.signature, e);
            failures.push(DeleteFailure {
                path: plan.keep.path.clone(),
                error: e,
            });
            continue;
        }

        for record in &plan.remove {
            if let Some(cb) = callback {
                cb.on_before_delete(&record.path, index, total);
            }
            index += 1;

            match delete_verified(record, config.mode) {
                Ok(del) => {
                    if let Some(cb) = callback {
                        cb.on_delete_success(&del.path, del.size);
                    }
                    removed.push(del);
                }
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", record.path.display(), e);
                    if let Some(cb) = callback {
                        cb.on_delete_failure(&record.path, &e);
                    }
                    failures.push(DeleteFailure {
                        path: record.path.clone(),
                        error: e,
                    });
                }
            }
        }
    }

    report.bytes_reclaimed = removed.iter().map(|d: &DeleteResult| d.size).sum();
    report.removed = removed;
    report.failures = failures;

    log::info!("{}", report.summary());

    if let Some(cb) = callback {
        cb.on_complete(&report);
    }

    report
}
