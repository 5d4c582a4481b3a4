//! Report formatters for scan and resolution results.
//!
//! - [`text`]: coloured, human-readable report
//! - [`json`]: machine-readable report for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::{resolve, NoProgress, ResolveConfig};
//! use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupsweep::output::TextOutput;
//! use dupsweep::scanner::SearchTarget;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default()).unwrap();
//! let (groups, summary) = finder.find_duplicates(&[SearchTarget::new(".")]).unwrap();
//! let report = resolve::<NoProgress>(&groups, &ResolveConfig::default(), None);
//!
//! TextOutput::new(&groups, &summary, &report)
//!     .write_to(std::io::stdout().lock())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
