//! Directory scanning, tree caching and resumable traversal for filetrail.
//!
//! # Overview
//!
//! `filetrail-scan` turns a root directory into a tree of typed files and
//! walks it in a stable order, so long-running batch work can stop and pick
//! up where it left off:
//!
//! - [`Scanner`] lists each directory in name order, prunes directories
//!   without files and skips entries that are neither files nor directories;
//! - [`CacheStore`] keeps a scanned tree (or a whole iterator) in a side
//!   file so repeated runs avoid rescanning;
//! - [`FileIterator`] owns the tree and a resume cursor and hands out a
//!   [`Traversal`] per pass.
//!
//! # Example
//!
//! ```rust,no_run
//! use filetrail_core::{FileOptions, TypedFile};
//! use filetrail_files::JsonFile;
//! use filetrail_scan::FileIterator;
//!
//! let progress = "/data/docs.progress";
//! let mut iter = FileIterator::<JsonFile>::load_or_create(
//!     "/data/docs",
//!     progress,
//!     FileOptions::default(),
//! )?;
//!
//! let mut walk = iter.begin_iteration();
//! while let Some(doc) = walk.next() {
//!     println!("processing {}", doc.name());
//!     walk.checkpoint(progress)?;
//! }
//! # Ok::<(), filetrail_core::TrailError>(())
//! ```

mod cache;
mod iterator;
mod scanner;

pub use cache::{CACHE_VERSION, CacheStore};
pub use iterator::{FileIterator, Traversal};
pub use scanner::{ScanOutcome, Scanner};

// Re-export core types for convenience
pub use filetrail_core::{
    IteratorConfig, ScanWarning, TrailError, TreeNode, TreeStats, TypedFile, WarningKind,
};
