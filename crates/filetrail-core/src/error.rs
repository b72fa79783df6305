//! Error and warning types shared by the filetrail crates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by typed-file construction, access and creation.
#[derive(Debug, Error)]
pub enum FileError {
    /// Path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Path exists but is not a regular file.
    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Content validation rejected the file.
    #[error("Validation failed for {path}: not a valid {kind} file")]
    ValidationFailed { path: PathBuf, kind: &'static str },

    /// The file variant cannot be synthesized.
    #[error("{kind} files cannot be created: {path}")]
    CreateUnsupported { path: PathBuf, kind: &'static str },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image could not be decoded.
    #[error("Image error at {path}: {message}")]
    Image { path: PathBuf, message: String },

    /// Document could not be parsed or serialized.
    #[error("JSON error at {path}: {message}")]
    Json { path: PathBuf, message: String },
}

impl FileError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors raised by scanning, caching and iteration.
#[derive(Debug, Error)]
pub enum TrailError {
    /// Root directory has no entries at all.
    #[error("Root directory is empty: {path}")]
    EmptyRoot { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A file inside the tree could not be constructed.
    #[error(transparent)]
    File(#[from] FileError),

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache file could not be decoded.
    #[error("Failed to decode cache {path}: {message}")]
    CacheDecode { path: PathBuf, message: String },

    /// Cache file could not be encoded.
    #[error("Failed to encode cache {path}: {message}")]
    CacheEncode { path: PathBuf, message: String },

    /// Cache was written by an incompatible format version.
    #[error("Unsupported cache version {found} in {path} (expected {expected})")]
    CacheVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// Cache was written for a different file variant.
    #[error("Cache {path} holds {found} files, expected {expected}")]
    CacheKindMismatch {
        path: PathBuf,
        found: String,
        expected: String,
    },

    /// A tree node breaks the tree invariants.
    #[error("Invalid tree node at {path}: {message}")]
    InvalidTreeNode { path: PathBuf, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl TrailError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::File(FileError::NotFound { path }),
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Directory held no files and was left out of the tree.
    EmptyDirectoryPruned,
    /// Entry is neither a regular file nor a directory.
    UnrecognizedEntry,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create an empty folder warning.
    pub fn empty_directory(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let message = format!("{} is an empty folder. Ignored.", path.display());
        Self::new(path, message, WarningKind::EmptyDirectoryPruned)
    }

    /// Create an unrecognized entry warning.
    pub fn unrecognized(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let message = format!("{} is not a file nor a folder. Ignored.", path.display());
        Self::new(path, message, WarningKind::UnrecognizedEntry)
    }
}
