//! Scanner module for directory traversal and content hashing.
//!
//! This module provides functionality for:
//! - Walking search targets, recursively or one level deep, using jwalk
//! - Single-pass multi-algorithm content hashing
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Streaming digests and composite content signatures
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{SearchTarget, Walker, WalkerConfig};
//!
//! let target = SearchTarget::new("/home/user/Downloads").with_recursive(true);
//! let walker = Walker::new(&target, WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

// Re-export main types
pub use hasher::{
    ContentHasher, HashAlgorithm, StreamingDigest, DEFAULT_BLOCK_SIZE, SIGNATURE_SEPARATOR,
};
pub use walker::Walker;

/// One file discovered during a scan.
///
/// Created by the [`Walker`], signed by the [`ContentHasher`] and then read
/// by the grouping and resolving stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file, as produced by walking the search root
    pub path: PathBuf,
    /// File size in bytes, fixed at scan time
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Position in the run's discovery order
    pub discovery_index: usize,
    /// Path of the member inside an archive (empty for ordinary files)
    pub archive_member: String,
    signature: String,
}

impl FileRecord {
    /// Create a new, unsigned record.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
            discovery_index: 0,
            archive_member: String::new(),
            signature: String::new(),
        }
    }

    /// Set the discovery index.
    #[must_use]
    pub fn with_discovery_index(mut self, index: usize) -> Self {
        self.discovery_index = index;
        self
    }

    /// Composite signature, if the record has been hashed.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        if self.signature.is_empty() {
            None
        } else {
            Some(&self.signature)
        }
    }

    /// Whether a signature has been assigned.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Assign the composite signature.
    ///
    /// The signature is written once per hashing pass; a second assignment
    /// is ignored and returns `false`.
    pub fn assign_signature(&mut self, signature: String) -> bool {
        if self.is_hashed() {
            log::warn!(
                "Signature already assigned for {}, keeping the first one",
                self.path.display()
            );
            return false;
        }
        self.signature = signature;
        true
    }

    /// The file this record's path finally refers to.
    ///
    /// Symlinks are followed and `.`/`..` components removed. Falls back to
    /// the path as recorded when it cannot be resolved.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        std::fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone())
    }

    /// Whether both records name the same file on disk.
    #[must_use]
    pub fn is_same_file(&self, other: &FileRecord) -> bool {
        self.path == other.path || self.resolved_path() == other.resolved_path()
    }
}

/// A root directory the caller wants scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    /// Root directory
    pub root: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Look inside archives (reserved, currently has no effect)
    pub search_archives: bool,
}

impl SearchTarget {
    /// Create a non-recursive target for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            search_archives: false,
        }
    }

    /// Set the recursive flag.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the search-archives flag.
    #[must_use]
    pub fn with_search_archives(mut self, search_archives: bool) -> Self {
        self.search_archives = search_archives;
        self
    }

    /// Check that the root exists and is a directory.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the root does not exist
    /// - `NotADirectory` if the root is not a directory
    pub fn validate(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ScanError::NotFound(self.root.clone()))
            }
            Err(e) => Err(ScanError::from_io(&self.root, e)),
        }
    }
}

/// Filters applied while walking.
///
/// Whether to descend into subdirectories is a property of each
/// [`SearchTarget`], not of this configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,
}

impl WalkerConfig {
    /// Create a new configuration.
    ///
    /// # Arguments
    ///
    /// * `skip_hidden` - Whether to skip hidden files
    /// * `min_size` - Minimum file size filter
    /// * `max_size` - Maximum file size filter
    #[must_use]
    pub fn new(skip_hidden: bool, min_size: Option<u64>, max_size: Option<u64>) -> Self {
        Self {
            skip_hidden,
            min_size,
            max_size,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) | Self::NotADirectory(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
