//! Typed file variants for filetrail.
//!
//! Each variant implements [`TypedFile`](filetrail_core::TypedFile):
//!
//! - [`RawFile`] hands out a buffered reader over the bytes;
//! - [`ImageFile`] hands out a decoded RGB buffer and cannot be created;
//! - [`JsonFile`] hands out the parsed document and saves it back when the
//!   access closure succeeds.
//!
//! # Example
//!
//! ```rust,no_run
//! use filetrail_core::{FileError, FileOptions, TypedFile};
//! use filetrail_files::JsonFile;
//!
//! let file = JsonFile::create("/tmp/progress.json")?;
//! file.access(|doc| {
//!     doc["done"] = serde_json::json!(true);
//!     Ok::<_, FileError>(())
//! })?;
//! # Ok::<(), FileError>(())
//! ```

mod json;
mod raster;
mod raw;

pub use json::JsonFile;
pub use raster::ImageFile;
pub use raw::RawFile;

// Re-export core types for convenience
pub use filetrail_core::{FileError, FileKind, FileOptions, TypedFile};
