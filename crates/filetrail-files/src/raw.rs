//! Generic file handle exposing the raw byte stream.

use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use filetrail_core::{FileError, FileKind, FileOptions, TypedFile, require_regular_file};

/// Any regular file, read as bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawFile {
    path: PathBuf,
}

impl TypedFile for RawFile {
    const KIND: FileKind = FileKind::Raw;
    type Options = FileOptions;
    type View = BufReader<File>;

    fn open(path: impl Into<PathBuf>, options: &FileOptions) -> Result<Self, FileError> {
        let path = path.into();
        require_regular_file(&path)?;
        if options.validate && !Self::validate(&path) {
            return Err(FileError::ValidationFailed {
                path,
                kind: Self::KIND.as_str(),
            });
        }
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn validate(path: &Path) -> bool {
        File::open(path).is_ok()
    }

    fn access<R, E>(&self, f: impl FnOnce(&mut BufReader<File>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<FileError>,
    {
        let file = File::open(&self.path).map_err(|e| FileError::io(&self.path, e))?;
        let mut reader = BufReader::new(file);
        f(&mut reader)
    }

    fn create(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        if path.exists() {
            tracing::warn!(target: "files", path = %path.display(), "file already exists, keeping its content");
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| FileError::io(&path, e))?;
        Self::open(path, &FileOptions::default())
    }
}
