//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct which turns one
//! [`SearchTarget`] into a sequence of [`FileRecord`] values.
//!
//! # Features
//!
//! - One-level or fully recursive traversal, per target
//! - Children visited in file-name order for a deterministic discovery order
//! - Symlinks and special files are recorded when `stat` succeeds on them
//! - Entries that cannot be stat'd are yielded as [`ScanError`] values
//!   instead of stopping the walk
//! - Size and hidden-file filters
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{SearchTarget, Walker, WalkerConfig};
//!
//! let target = SearchTarget::new("/home/user/Downloads");
//! let walker = Walker::new(&target, WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use jwalk::WalkDir;

use super::{FileRecord, ScanError, SearchTarget, WalkerConfig};

/// Directory walker for one search target.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Descend into subdirectories
    recursive: bool,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given target.
    ///
    /// # Arguments
    ///
    /// * `target` - Root directory and recursion flag
    /// * `config` - Walker filters
    #[must_use]
    pub fn new(target: &SearchTarget, config: WalkerConfig) -> Self {
        if target.search_archives {
            log::debug!(
                "Archive search requested for {} but archives are scanned as plain files",
                target.root.display()
            );
        }

        Self {
            root: target.root.clone(),
            recursive: target.recursive,
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker will stop iteration
    /// as soon as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the target, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Every record has `discovery_index` 0; the caller assigns
    /// run-wide indices.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .max_depth(max_depth)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    // Skip the root directory itself
                    if entry.depth == 0 {
                        return None;
                    }

                    // Directories are descended into (or not), never recorded
                    if entry.file_type().is_dir() {
                        return None;
                    }

                    let path = entry.path();

                    // stat follows symlinks; anything that resolves is a candidate
                    match std::fs::metadata(&path) {
                        Ok(metadata) => self.process_file_entry(path, &metadata),
                        Err(e) => Some(Err(self.handle_io_error(&path, e))),
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, &e)))
                }
            }
        })
    }

    /// Process a file entry and create a FileRecord if it passes filters.
    fn process_file_entry(
        &self,
        path: PathBuf,
        metadata: &Metadata,
    ) -> Option<Result<FileRecord, ScanError>> {
        // A symlink pointing at a directory
        if metadata.is_dir() {
            log::trace!("Skipping link to directory: {}", path.display());
            return None;
        }

        let size = metadata.len();

        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        log::trace!("Found {} ({} bytes)", path.display(), size);
        Some(Ok(FileRecord::new(path, size, modified)))
    }

    /// Handle I/O errors during stat.
    fn handle_io_error(&self, path: &Path, error: io::Error) -> ScanError {
        log::warn!("Skipping {}: {}", path.display(), error);
        ScanError::from_io(path, error)
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: &jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        let kind = error
            .io_error()
            .map_or(io::ErrorKind::Other, io::Error::kind);
        ScanError::from_io(&path, io::Error::new(kind, error.to_string()))
    }
}
