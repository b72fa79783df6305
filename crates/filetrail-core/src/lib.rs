//! Core types and traits for filetrail.
//!
//! This crate provides the fundamental data structures used throughout
//! the filetrail crates: the typed-file capability trait, tree nodes,
//! iterator configuration and the shared error taxonomy.

mod config;
mod error;
mod file;
mod node;
mod tree;

pub use config::{
    CACHE_SUFFIX, IteratorConfig, IteratorConfigBuilder, IteratorConfigBuilderError,
    default_cache_path,
};
pub use error::{FileError, ScanWarning, TrailError, WarningKind};
pub use file::{FileKind, FileOptions, TypedFile, require_regular_file};
pub use node::{Leaves, TreeNode, leaves};
pub use tree::TreeStats;
