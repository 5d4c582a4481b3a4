//! Duplicate detection pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the full pipeline over one or more search
//! targets:
//!
//! 1. **Scanning** - walk every target in order, assigning a run-wide
//!    discovery index to each file
//! 2. **Size grouping** - drop files whose size is unique
//!    (see [`crate::duplicates::groups`])
//! 3. **Hashing** - compute the composite signature of every remaining file
//!    in a single read, on a bounded thread pool
//! 4. **Duplicate grouping** - group by (size, signature)
//!
//! Per-file failures in scanning and hashing are collected in the
//! [`ScanSummary`] and the run continues. Only invalid targets, invalid
//! configuration and interruption halt a run.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupsweep::scanner::SearchTarget;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default()).unwrap();
//! let targets = [SearchTarget::new("/data/photos").with_recursive(true)];
//! let (groups, summary) = finder.find_duplicates(&targets).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_signature, group_by_size, DuplicateGroup};
use crate::config::{ConfigError, Settings};
use crate::progress::ProgressCallback;
use crate::scanner::{
    ContentHasher, FileRecord, HashAlgorithm, HashError, ScanError, SearchTarget, Walker,
    WalkerConfig, DEFAULT_BLOCK_SIZE,
};

/// Files larger than this are logged when hashing starts.
const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024 * 1024;

/// Stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Walking the search targets
    Scanning,
    /// Grouping records by size
    SizeGrouping,
    /// Computing content signatures
    Hashing,
    /// Grouping by (size, signature)
    DuplicateGrouping,
    /// Removing or reporting redundant copies
    Resolving,
    /// Finished
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scanning => "Scanning",
            Self::SizeGrouping => "Grouping by size",
            Self::Hashing => "Hashing",
            Self::DuplicateGrouping => "Grouping duplicates",
            Self::Resolving => "Resolving",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for hashing
    pub io_threads: usize,
    /// Filters applied while walking
    pub walker_config: WalkerConfig,
    /// Hash algorithms, in signature order
    pub algorithms: Vec<HashAlgorithm>,
    /// Read block size in bytes
    pub block_size: usize,
    /// Optional shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("algorithms", &self.algorithms)
            .field("block_size", &self.block_size)
            .field("shutdown_flag", &self.shutdown_flag.is_some())
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            algorithms: vec![HashAlgorithm::Md5, HashAlgorithm::Sha256],
            block_size: DEFAULT_BLOCK_SIZE,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Build a finder configuration from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            io_threads: settings.io_threads,
            walker_config: settings.walker_config(),
            algorithms: settings.algorithms.clone(),
            block_size: settings.block_size,
            ..Self::default()
        }
    }

    /// Set the number of I/O threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads;
        self
    }

    /// Set the walker filters.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the hash algorithms.
    #[must_use]
    pub fn with_algorithms(mut self, algorithms: Vec<HashAlgorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Set the read block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files successfully hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one copy per group)
    pub duplicate_files: usize,
    /// Total space held by the redundant copies
    pub reclaimable_space: u64,
    /// Files reached through more than one target and counted once
    pub overlapping_files: usize,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Entries that could not be scanned
    pub scan_errors: Vec<ScanError>,
    /// Files that could not be hashed
    pub hash_errors: Vec<HashError>,
}

impl ScanSummary {
    /// Number of per-item warnings (scan and hash failures).
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.scan_errors.len() + self.hash_errors.len()
    }

    /// Whether any per-item failure occurred.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Warning messages, scan failures first.
    #[must_use]
    pub fn warning_messages(&self) -> Vec<String> {
        self.scan_errors
            .iter()
            .map(ToString::to_string)
            .chain(self.hash_errors.iter().map(ToString::to_string))
            .collect()
    }

    /// Percentage of scanned bytes held by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that halt a run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// No search target was given.
    #[error("No search targets given")]
    NoTargets,

    /// A target root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// A target root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A target root could not be inspected.
    #[error("Invalid search target: {0}")]
    InvalidTarget(ScanError),

    /// The finder configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The hashing thread pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Duplicate finder that orchestrates the detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<ContentHasher>,
}

impl DuplicateFinder {
    /// Create a finder, validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no algorithm is given, the block size is zero,
    /// or `io_threads` is zero.
    pub fn new(config: FinderConfig) -> Result<Self, FinderError> {
        if config.io_threads == 0 {
            return Err(ConfigError::Invalid("io_threads must be at least 1".to_string()).into());
        }

        let mut hasher =
            ContentHasher::new(&config.algorithms)?.with_block_size(config.block_size)?;
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }

        log::debug!(
            "Finder configured: algorithms [{}], block size {}, {} I/O threads",
            hasher
                .algorithms()
                .iter()
                .map(|a| a.name())
                .collect::<Vec<_>>()
                .join(", "),
            hasher.block_size(),
            config.io_threads
        );

        Ok(Self {
            config,
            hasher: Arc::new(hasher),
        })
    }

    /// The content hasher used by this finder.
    #[must_use]
    pub fn hasher(&self) -> &ContentHasher {
        &self.hasher
    }

    /// Find duplicate files across all targets.
    ///
    /// Targets are walked in the given order; a file reached through more
    /// than one target is counted once, at its first discovery.
    ///
    /// # Errors
    ///
    /// - `NoTargets` if `targets` is empty
    /// - `PathNotFound` / `NotADirectory` / `InvalidTarget` for a bad root
    /// - `Interrupted` if shutdown is requested
    /// - `ThreadPool` if the hashing pool cannot be created
    pub fn find_duplicates(
        &self,
        targets: &[SearchTarget],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if targets.is_empty() {
            return Err(FinderError::NoTargets);
        }
        for target in targets {
            target.validate().map_err(|e| match e {
                ScanError::NotFound(p) => FinderError::PathNotFound(p),
                ScanError::NotADirectory(p) => FinderError::NotADirectory(p),
                other => FinderError::InvalidTarget(other),
            })?;
        }
        warn_overlapping_targets(targets);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut summary = ScanSummary::default();
        let records = self.scan_targets(targets, &mut summary)?;

        self.run_pipeline(records, summary, start_time)
    }

    /// Find duplicates among already-scanned records.
    ///
    /// Discovery order is the input order; `discovery_index` is reassigned.
    ///
    /// # Errors
    ///
    /// - `Interrupted` if shutdown is requested
    /// - `ThreadPool` if the hashing pool cannot be created
    pub fn find_duplicates_from_records(
        &self,
        records: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let records = records
            .into_iter()
            .enumerate()
            .map(|(idx, r)| r.with_discovery_index(idx))
            .collect();

        self.run_pipeline(records, ScanSummary::default(), start_time)
    }

    fn scan_targets(
        &self,
        targets: &[SearchTarget],
        summary: &mut ScanSummary,
    ) -> Result<Vec<FileRecord>, FinderError> {
        self.phase_start(Phase::Scanning, 0);

        let mut records = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut resolved_dirs: HashMap<PathBuf, PathBuf> = HashMap::new();

        for target in targets {
            log::info!(
                "Scanning {}{}",
                target.root.display(),
                if target.recursive { " (recursive)" } else { "" }
            );
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_message(&format!("Scanning {}", target.root.display()));
            }

            let mut walker = Walker::new(target, self.config.walker_config.clone());
            if let Some(ref flag) = self.config.shutdown_flag {
                walker = walker.with_shutdown_flag(Arc::clone(flag));
            }

            for result in walker.walk() {
                match result {
                    Ok(record) => {
                        if !seen.insert(scan_location(&record.path, &mut resolved_dirs)) {
                            log::debug!("Already scanned: {}", record.path.display());
                            summary.overlapping_files += 1;
                            continue;
                        }
                        let record = record.with_discovery_index(records.len());
                        if let Some(ref callback) = self.config.progress_callback {
                            callback.on_progress(records.len() + 1, &record.path);
                        }
                        records.push(record);
                    }
                    Err(e) => summary.scan_errors.push(e),
                }
            }

            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }
        }

        self.phase_end(Phase::Scanning);

        summary.total_files = records.len();
        summary.total_size = records.iter().map(|r| r.size).sum();
        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        Ok(records)
    }

    fn run_pipeline(
        &self,
        records: Vec<FileRecord>,
        mut summary: ScanSummary,
        start_time: Instant,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        if summary.total_files == 0 {
            summary.total_files = records.len();
            summary.total_size = records.iter().map(|r| r.size).sum();
        }

        self.phase_start(Phase::SizeGrouping, records.len());
        let (size_groups, stats) = group_by_size(records);
        summary.eliminated_by_size = stats.eliminated_unique;
        self.phase_end(Phase::SizeGrouping);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let candidates: Vec<FileRecord> =
            size_groups.into_iter().flat_map(|g| g.files).collect();
        let hashed = self.hash_candidates(candidates, &mut summary)?;

        self.phase_start(Phase::DuplicateGrouping, hashed.len());
        let groups = group_by_signature(hashed);
        self.phase_end(Phase::DuplicateGrouping);

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} groups, {} duplicates, {} reclaimable, {} warning(s) in {:.2?}",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.warning_count(),
            summary.scan_duration
        );

        Ok((groups, summary))
    }

    fn hash_candidates(
        &self,
        candidates: Vec<FileRecord>,
        summary: &mut ScanSummary,
    ) -> Result<Vec<FileRecord>, FinderError> {
        if candidates.is_empty() {
            log::debug!("No candidates to hash");
            return Ok(Vec::new());
        }

        self.phase_start(Phase::Hashing, candidates.len());
        log::info!("Hashing {} candidate files", candidates.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()?;

        let completed = AtomicUsize::new(0);
        let results: Vec<(FileRecord, Result<(), HashError>)> = pool.install(|| {
            candidates
                .into_par_iter()
                .map(|mut record| {
                    if self.config.is_shutdown_requested() {
                        let err = HashError::Interrupted(record.path.clone());
                        return (record, Err(err));
                    }

                    if record.size > LARGE_FILE_THRESHOLD {
                        log::debug!(
                            "Hashing large file ({}): {}",
                            ByteSize::b(record.size),
                            record.path.display()
                        );
                    }

                    let result = self.hasher.hash_record(&mut record);
                    match &result {
                        Ok(()) => log::trace!("Hashed: {}", record.path.display()),
                        Err(HashError::Interrupted(_)) => {}
                        Err(e) => log::warn!("Failed to hash {}: {}", record.path.display(), e),
                    }

                    if let Some(ref callback) = self.config.progress_callback {
                        let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(current, &record.path);
                    }

                    (record, result)
                })
                .collect()
        });

        if self.config.is_shutdown_requested() {
            log::info!("Hashing interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let mut hashed = Vec::with_capacity(results.len());
        for (record, result) in results {
            match result {
                Ok(()) => {
                    summary.hashed_files += 1;
                    summary.bytes_hashed += record.size;
                    hashed.push(record);
                }
                Err(e) => summary.hash_errors.push(e),
            }
        }

        self.phase_end(Phase::Hashing);
        Ok(hashed)
    }

    fn phase_start(&self, phase: Phase, total: usize) {
        log::debug!("Phase started: {}", phase);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(phase, total);
        }
    }

    fn phase_end(&self, phase: Phase) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(phase);
        }
    }
}

/// Where a scanned entry lives, independent of how its root was spelled.
///
/// The parent directory is canonicalized (cached per directory) and the
/// entry's own name is kept, so `dir/a` and `dir/sub/../a` coincide while a
/// symlink stays distinct from its target.
fn scan_location(path: &Path, resolved_dirs: &mut HashMap<PathBuf, PathBuf>) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };

    if let Some(dir) = resolved_dirs.get(parent) {
        return dir.join(name);
    }

    match parent.canonicalize() {
        Ok(dir) => {
            let location = dir.join(name);
            resolved_dirs.insert(parent.to_path_buf(), dir);
            location
        }
        Err(e) => {
            log::debug!("Cannot resolve {}: {}", parent.display(), e);
            path.to_path_buf()
        }
    }
}

/// Warn when one target's root lies inside another's walked tree.
fn warn_overlapping_targets(targets: &[SearchTarget]) {
    let roots: Vec<(PathBuf, bool)> = targets
        .iter()
        .map(|t| {
            (
                t.root.canonicalize().unwrap_or_else(|_| t.root.clone()),
                t.recursive,
            )
        })
        .collect();

    for (i, (outer, recursive)) in roots.iter().enumerate() {
        for (j, (inner, _)) in roots.iter().enumerate() {
            if i == j {
                continue;
            }
            let overlaps = inner == outer || (*recursive && inner.starts_with(outer));
            if overlaps && (inner != outer || i < j) {
                log::warn!(
                    "Search targets overlap: {} is reached from {}; shared files are counted once",
                    inner.display(),
                    outer.display()
                );
            }
        }
    }
}
