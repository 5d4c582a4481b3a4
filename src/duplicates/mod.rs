//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Content hashing of same-size candidates
//! - Grouping by (size, signature)
//! - Pipeline orchestration and scan statistics

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, Phase, ScanSummary};
pub use groups::{group_by_signature, group_by_size, DuplicateGroup, GroupingStats, SizeGroup};
