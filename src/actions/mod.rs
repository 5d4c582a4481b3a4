//! File actions module.
//!
//! Resolution of confirmed duplicate groups:
//! - Keep policies selecting the surviving copy
//! - Dry-run reporting (default)
//! - Move to system trash via the trash crate
//! - Permanent deletion
//! - Size re-check before removal to detect modified files
//!
//! ```no_run
//! use dupsweep::actions::{delete_to_trash, KeepPolicy};
//! use std::path::Path;
//!
//! let result = delete_to_trash(Path::new("/path/to/duplicate.txt"));
//! assert_eq!(KeepPolicy::default(), KeepPolicy::First);
//! ```

pub mod delete;

pub use delete::{
    delete_to_trash, delete_verified, permanent_delete, plan_removals, resolve,
    validate_preserves_copy, DeleteError, DeleteFailure, DeleteProgressCallback, DeleteResult,
    KeepPolicy, NoProgress, RemovalPlan, ResolveConfig, ResolveMode, ResolveReport,
};
