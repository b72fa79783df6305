//! JSON document handle with save-on-clean-exit access.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use filetrail_core::{FileError, FileKind, FileOptions, TypedFile, require_regular_file};

/// Content written by [`JsonFile::create`].
const EMPTY_DOCUMENT: &str = "{}";

/// A JSON document.
///
/// [`TypedFile::access`] parses the document, hands it out for editing and
/// writes it back only if the closure returns `Ok`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Parse the document without writing anything back.
    pub fn document(&self) -> Result<Value, FileError> {
        read_document(&self.path)
    }

    fn write_document(&self, value: &Value) -> Result<(), FileError> {
        let text = serde_json::to_string_pretty(value).map_err(|e| FileError::Json {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, text).map_err(|e| FileError::io(&self.path, e))
    }
}

fn read_document(path: &Path) -> Result<Value, FileError> {
    let file = File::open(path).map_err(|e| FileError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| FileError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Append `.json` unless the path already ends with it.
fn with_json_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some_and(|e| e == "json") {
        return path;
    }
    let mut raw: OsString = path.into_os_string();
    raw.push(".json");
    PathBuf::from(raw)
}

impl TypedFile for JsonFile {
    const KIND: FileKind = FileKind::Json;
    type Options = FileOptions;
    type View = Value;

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
        read_document(path).is_ok()
    }

    fn access<R, E>(&self, f: impl FnOnce(&mut Value) -> Result<R, E>) -> Result<R, E>
    where
        E: From<FileError>,
    {
        let mut document = read_document(&self.path)?;
        let result = f(&mut document)?;
        self.write_document(&document)?;
        Ok(result)
    }

    fn create(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = with_json_extension(path.into());
        if path.exists() {
            tracing::warn!(target: "files", path = %path.display(), "document already exists, keeping its content");
        } else {
            fs::write(&path, EMPTY_DOCUMENT).map_err(|e| FileError::io(&path, e))?;
        }
        Self::open(path, &FileOptions::default())
    }
}
