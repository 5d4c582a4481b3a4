//! Size grouping and duplicate group construction.
//!
//! # Overview
//!
//! Size grouping is the first filter of duplicate detection: files with
//! different sizes cannot be duplicates, so only sizes shared by two or
//! more files go on to be hashed. Hashed records are then grouped by the
//! pair (size, signature) into [`DuplicateGroup`]s.
//!
//! Both stages preserve discovery order: groups are ordered by their first
//! member, and members keep the order they were discovered in.
//!
//! # Example
//!
//! ```
//! use dupsweep::scanner::FileRecord;
//! use dupsweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048, SystemTime::now()),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileRecord;

/// Files sharing one exact size.
#[derive(Debug, Clone)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in discovery order
    pub files: Vec<FileRecord>,
}

impl SizeGroup {
    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Confirmed set of files with identical size and content signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Composite content signature, shared by every member
    pub signature: String,
    /// Members in discovery order
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(size: u64, signature: String, files: Vec<FileRecord>) -> Self {
        Self {
            size,
            signature,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space held by the redundant copies (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    fn first_discovery(&self) -> usize {
        self.files
            .first()
            .map_or(usize::MAX, |f| f.discovery_index)
    }
}

/// Statistics from the size grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of empty files encountered
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by exact size.
///
/// Only groups with two or more members are returned, ordered by the
/// discovery index of their first member. Empty files form a size group
/// like any other size.
///
/// # Example
///
/// ```
/// use dupsweep::scanner::FileRecord;
/// use dupsweep::duplicates::group_by_size;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100, SystemTime::now()).with_discovery_index(0),
///     FileRecord::new(PathBuf::from("/b.txt"), 200, SystemTime::now()).with_discovery_index(1),
///     FileRecord::new(PathBuf::from("/c.txt"), 100, SystemTime::now()).with_discovery_index(2),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].size, 100);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<SizeGroup>, GroupingStats) {
    let mut order: Vec<u64> = Vec::new();
    let mut by_size: HashMap<u64, Vec<FileRecord>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }

        let bucket = by_size.entry(file.size).or_default();
        if bucket.is_empty() {
            order.push(file.size);
        }
        bucket.push(file);
    }

    stats.unique_sizes = order.len();

    let mut groups = Vec::new();
    for size in order {
        let Some(files) = by_size.remove(&size) else {
            continue;
        };
        if files.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
            continue;
        }

        stats.potential_duplicates += files.len();
        stats.duplicate_groups += 1;
        log::debug!("Size group {} bytes: {} potential duplicates", size, files.len());
        groups.push(SizeGroup::with_files(size, files));
    }

    log::info!(
        "Size grouping complete: {} files -> {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Group hashed records by (size, signature).
///
/// Unhashed records are skipped. Only groups with two or more members
/// are returned, ordered by their first member's discovery index; members
/// are ordered by discovery index.
#[must_use]
pub fn group_by_signature(
    files: impl IntoIterator<Item = FileRecord>,
) -> Vec<DuplicateGroup> {
    let mut by_key: HashMap<(u64, String), Vec<FileRecord>> = HashMap::new();

    for file in files {
        let Some(signature) = file.signature().map(str::to_owned) else {
            log::trace!("Skipping unhashed record: {}", file.path.display());
            continue;
        };
        by_key.entry((file.size, signature)).or_default().push(file);
    }

    let mut groups: Vec<DuplicateGroup> = by_key
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|((size, signature), mut files)| {
            files.sort_by_key(|f| f.discovery_index);
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                signature,
                files.len(),
                size
            );
            DuplicateGroup::new(size, signature, files)
        })
        .collect();

    groups.sort_by_key(DuplicateGroup::first_discovery);
    groups
}
