//! Iterator configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::TrailError;

/// Suffix appended to the root directory name for the default cache file.
pub const CACHE_SUFFIX: &str = "cache";

/// Configuration for building a file iterator.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::check"))]
pub struct IteratorConfig {
    /// Root directory to walk.
    pub root: PathBuf,

    /// Load the tree from a cache file, writing one after a fresh scan.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Explicit cache file (None = sibling `<root>.cache`).
    #[builder(default)]
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// Re-check every cached path on load and rescan when one is gone.
    #[builder(default = "false")]
    #[serde(default)]
    pub validate: bool,
}

fn default_true() -> bool {
    true
}

impl IteratorConfigBuilder {
    fn check(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(Some(ref cache)) = self.cache_path {
            if cache.as_os_str().is_empty() {
                return Err("Cache path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl From<IteratorConfigBuilderError> for TrailError {
    fn from(error: IteratorConfigBuilderError) -> Self {
        TrailError::InvalidConfig {
            message: error.to_string(),
        }
    }
}

impl IteratorConfig {
    /// Create a new iterator config builder.
    pub fn builder() -> IteratorConfigBuilder {
        IteratorConfigBuilder::default()
    }

    /// Create a config with cache enabled and validation off.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            use_cache: true,
            cache_path: None,
            validate: false,
        }
    }

    /// Cache file this config reads and writes, if caching is on.
    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        if !self.use_cache {
            return None;
        }
        Some(
            self.cache_path
                .clone()
                .unwrap_or_else(|| default_cache_path(&self.root)),
        )
    }
}

impl Default for IteratorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Sibling cache file for `root`: `/data/images` -> `/data/images.cache`.
pub fn default_cache_path(root: &Path) -> PathBuf {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{name}.{CACHE_SUFFIX}");
    match root.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
