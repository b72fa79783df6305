//! The typed-file capability trait.
//!
//! A typed file is a handle over one regular file on disk. Every variant
//! shares the same contract:
//!
//! - [`TypedFile::open`] checks the path exists and is a regular file, and
//!   optionally validates the content;
//! - [`TypedFile::access`] hands a type-specific view of the content to a
//!   closure and releases any underlying resource on every exit path;
//! - [`TypedFile::create`] makes a new, empty file of that type (or refuses,
//!   for variants that cannot be synthesized).

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FileError;

/// Which typed-file variant a tree or cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Raw byte stream.
    Raw,
    /// Decoded raster image.
    Image,
    /// Parsed JSON document.
    Json,
}

impl FileKind {
    /// Lowercase name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Raw => "raw",
            FileKind::Image => "image",
            FileKind::Json => "json",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction options shared by the bundled file variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOptions {
    /// Decode or parse the content at construction and fail if it is invalid.
    #[serde(default)]
    pub validate: bool,
}

impl FileOptions {
    /// Options that validate content at construction.
    pub fn validated() -> Self {
        Self { validate: true }
    }
}

/// A capability-bearing handle over one regular file.
///
/// Two handles are equal iff their paths are equal. Implementors serialize
/// as their path only, so a handle decoded from a cache is not revalidated.
pub trait TypedFile:
    Sized + 'static + Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned
{
    /// Descriptor stored alongside cached trees of this variant.
    const KIND: FileKind;

    /// Construction options for this variant.
    type Options: Clone + Default + fmt::Debug + Serialize + DeserializeOwned;

    /// Type-specific view handed out by [`TypedFile::access`].
    type View;

    /// Open a handle over an existing regular file.
    fn open(path: impl Into<PathBuf>, options: &Self::Options) -> Result<Self, FileError>;

    /// Path this handle refers to.
    fn path(&self) -> &Path;

    /// Try to open and minimally decode `path`.
    fn validate(path: &Path) -> bool;

    /// Run `f` over a view of the file's content.
    ///
    /// Any handle acquired for the view is released before this returns,
    /// whether `f` succeeds or fails.
    fn access<R, E>(&self, f: impl FnOnce(&mut Self::View) -> Result<R, E>) -> Result<R, E>
    where
        E: From<FileError>;

    /// Create a new, empty file of this type at `path`.
    fn create(path: impl Into<PathBuf>) -> Result<Self, FileError>;

    /// File name including extension.
    fn name(&self) -> Cow<'_, str> {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    }

    /// File name without its final extension.
    fn basename(&self) -> Cow<'_, str> {
        self.path()
            .file_stem()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    }

    /// Final extension, if any.
    fn extension(&self) -> Option<Cow<'_, str>> {
        self.path().extension().map(|e| e.to_string_lossy())
    }

    /// Directory holding the file.
    fn folder(&self) -> &Path {
        self.path().parent().unwrap_or_else(|| Path::new(""))
    }

    /// Copy the file's bytes to `dest`, creating its folder if needed.
    fn save_to(&self, dest: impl AsRef<Path>) -> Result<(), FileError> {
        let dest = dest.as_ref();
        if let Some(folder) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !folder.exists() {
                tracing::warn!(target: "files", folder = %folder.display(), "destination folder does not exist, creating it");
                fs::create_dir_all(folder).map_err(|e| FileError::io(folder, e))?;
            }
        }
        fs::copy(self.path(), dest).map_err(|e| FileError::io(self.path(), e))?;
        Ok(())
    }
}

/// Check that `path` exists and is a regular file.
pub fn require_regular_file(path: &Path) -> Result<(), FileError> {
    let metadata = fs::metadata(path).map_err(|e| FileError::io(path, e))?;
    if !metadata.is_file() {
        return Err(FileError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_require_regular_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        assert!(require_regular_file(&file).is_ok());
        assert!(matches!(
            require_regular_file(temp.path()),
            Err(FileError::NotAFile { .. })
        ));
        assert!(matches!(
            require_regular_file(&temp.path().join("missing")),
            Err(FileError::NotFound { .. })
        ));
    }

    #[test]
    fn test_file_kind_serde() {
        assert_eq!(serde_json::to_string(&FileKind::Image).unwrap(), "\"image\"");
        assert_eq!(FileKind::Json.to_string(), "json");
    }
}
