//! Cache file persistence for scanned trees and iterator snapshots.
//!
//! A cache file is a JSON document wrapped in a versioned envelope:
//!
//! ```json
//! { "version": 1, "kind": "image", "payload": { "Tree": [ ... ] } }
//! ```
//!
//! The payload is either a bare tree or a full iterator snapshot (tree plus
//! resume counters). Either payload can be read back as a tree.

use std::borrow::Cow;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use filetrail_core::{FileKind, TrailError, TreeNode, TypedFile, default_cache_path};

/// Cache format version - increment when changing the format.
pub const CACHE_VERSION: u32 = 1;

/// Fields read before the payload to reject incompatible caches early.
#[derive(Deserialize)]
struct CacheHeader {
    version: u32,
    kind: FileKind,
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "F: TypedFile", deserialize = "F: TypedFile"))]
struct CacheFile<'a, F: TypedFile> {
    version: u32,
    kind: FileKind,
    payload: Payload<'a, F>,
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "F: TypedFile", deserialize = "F: TypedFile"))]
enum Payload<'a, F: TypedFile> {
    Tree(Cow<'a, [TreeNode<F>]>),
    Iterator(IteratorSnapshot<'a, F>),
}

/// Persisted state of a file iterator.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(serialize = "F: TypedFile", deserialize = "F: TypedFile"))]
pub(crate) struct IteratorSnapshot<'a, F: TypedFile> {
    pub root: PathBuf,
    pub options: F::Options,
    pub finished_before: u64,
    pub finished_now: u64,
    pub tree: Cow<'a, [TreeNode<F>]>,
}

/// Reads and writes one cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Create a store for an explicit cache file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store for the sibling cache of `root` (`<root>.cache`).
    pub fn for_root(root: &Path) -> Self {
        Self::new(default_cache_path(root))
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the cache file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Delete the cache file if present.
    pub fn remove(&self) -> Result<(), TrailError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrailError::io(&self.path, e)),
        }
    }

    /// Load a tree, taking it from an iterator snapshot if that is what the
    /// file holds.
    pub fn load_tree<F: TypedFile>(&self) -> Result<Vec<TreeNode<F>>, TrailError> {
        let tree = match self.read::<F>()?.payload {
            Payload::Tree(tree) => tree.into_owned(),
            Payload::Iterator(snapshot) => snapshot.tree.into_owned(),
        };
        check_tree(&self.path, &tree)?;
        tracing::debug!(target: "cache", path = %self.path.display(), nodes = tree.len(), "loaded tree from cache");
        Ok(tree)
    }

    /// Write a bare tree.
    pub fn save_tree<F: TypedFile>(&self, tree: &[TreeNode<F>]) -> Result<(), TrailError> {
        self.write(Payload::Tree(Cow::Borrowed(tree)))
    }

    /// Load an iterator snapshot.
    pub(crate) fn load_snapshot<F: TypedFile>(
        &self,
    ) -> Result<IteratorSnapshot<'static, F>, TrailError> {
        match self.read::<F>()?.payload {
            Payload::Iterator(snapshot) => {
                check_tree(&self.path, &snapshot.tree)?;
                Ok(snapshot)
            }
            Payload::Tree(_) => Err(TrailError::CacheDecode {
                path: self.path.clone(),
                message: "cache holds a bare tree, not an iterator snapshot".to_string(),
            }),
        }
    }

    /// Write an iterator snapshot.
    pub(crate) fn save_snapshot<F: TypedFile>(
        &self,
        snapshot: IteratorSnapshot<'_, F>,
    ) -> Result<(), TrailError> {
        self.write(Payload::Iterator(snapshot))
    }

    fn read<F: TypedFile>(&self) -> Result<CacheFile<'static, F>, TrailError> {
        let text = fs::read_to_string(&self.path).map_err(|e| TrailError::io(&self.path, e))?;

        let header: CacheHeader = serde_json::from_str(&text).map_err(|e| self.decode_error(e))?;
        if header.version != CACHE_VERSION {
            return Err(TrailError::CacheVersion {
                path: self.path.clone(),
                found: header.version,
                expected: CACHE_VERSION,
            });
        }
        if header.kind != F::KIND {
            return Err(TrailError::CacheKindMismatch {
                path: self.path.clone(),
                found: header.kind.to_string(),
                expected: F::KIND.to_string(),
            });
        }

        serde_json::from_str(&text).map_err(|e| self.decode_error(e))
    }

    /// Write to a temporary sibling, then rename over the cache file.
    fn write<F: TypedFile>(&self, payload: Payload<'_, F>) -> Result<(), TrailError> {
        let file = CacheFile {
            version: CACHE_VERSION,
            kind: F::KIND,
            payload,
        };
        let text = serde_json::to_string(&file).map_err(|e| TrailError::CacheEncode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TrailError::io(parent, e))?;
        }

        let mut tmp: OsString = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp_path = PathBuf::from(tmp);

        fs::write(&tmp_path, text).map_err(|e| TrailError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| TrailError::io(&self.path, e))?;

        tracing::debug!(target: "cache", path = %self.path.display(), "wrote cache");
        Ok(())
    }

    fn decode_error(&self, error: serde_json::Error) -> TrailError {
        TrailError::CacheDecode {
            path: self.path.clone(),
            message: error.to_string(),
        }
    }
}

/// Reject trees holding an empty directory; the scanner never produces one.
fn check_tree<F: TypedFile>(cache_path: &Path, tree: &[TreeNode<F>]) -> Result<(), TrailError> {
    match tree.iter().find_map(TreeNode::find_empty_directory) {
        Some(dir) => Err(TrailError::InvalidTreeNode {
            path: dir.to_path_buf(),
            message: format!("empty directory in cache {}", cache_path.display()),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetrail_core::FileOptions;
    use filetrail_files::{ImageFile, RawFile};
    use tempfile::TempDir;

    fn raw_tree(temp: &TempDir) -> Vec<TreeNode<RawFile>> {
        let a = temp.path().join("a.txt");
        let b = temp.path().join("sub/b.txt");
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let opts = FileOptions::default();
        vec![
            TreeNode::Leaf(RawFile::open(&a, &opts).unwrap()),
            TreeNode::directory(
                temp.path().join("sub"),
                vec![TreeNode::Leaf(RawFile::open(&b, &opts).unwrap())],
            ),
        ]
    }

    #[test]
    fn test_tree_round_trip() {
        let temp = TempDir::new().unwrap();
        let tree = raw_tree(&temp);
        let store = CacheStore::new(temp.path().join("cache/tree.cache"));

        store.save_tree(&tree).unwrap();
        assert!(store.exists());

        let loaded: Vec<TreeNode<RawFile>> = store.load_tree().unwrap();
        assert_eq!(loaded, tree);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path().join("tree.cache"));
        store.save_tree(&raw_tree(&temp)).unwrap();

        let result = store.load_tree::<ImageFile>();
        assert!(matches!(result, Err(TrailError::CacheKindMismatch { .. })));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.cache");
        fs::write(&path, r#"{"version": 999, "kind": "raw", "payload": {"Tree": []}}"#).unwrap();

        let result = CacheStore::new(&path).load_tree::<RawFile>();
        assert!(matches!(
            result,
            Err(TrailError::CacheVersion { found: 999, .. })
        ));
    }

    #[test]
    fn test_empty_directory_in_cache_rejected() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(temp.path().join("bad.cache"));
        let tree: Vec<TreeNode<RawFile>> = vec![TreeNode::directory("/nowhere", Vec::new())];
        store.save_tree(&tree).unwrap();

        let result = store.load_tree::<RawFile>();
        assert!(matches!(result, Err(TrailError::InvalidTreeNode { .. })));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("junk.cache");
        fs::write(&path, "not json at all").unwrap();

        let result = CacheStore::new(&path).load_tree::<RawFile>();
        assert!(matches!(result, Err(TrailError::CacheDecode { .. })));
    }

    #[test]
    fn test_snapshot_readable_as_tree() {
        let temp = TempDir::new().unwrap();
        let tree = raw_tree(&temp);
        let store = CacheStore::new(temp.path().join("snap.cache"));

        store
            .save_snapshot(IteratorSnapshot {
                root: temp.path().to_path_buf(),
                options: FileOptions::default(),
                finished_before: 1,
                finished_now: 1,
                tree: Cow::Borrowed(&tree),
            })
            .unwrap();

        assert_eq!(store.load_tree::<RawFile>().unwrap(), tree);
        let snapshot = store.load_snapshot::<RawFile>().unwrap();
        assert_eq!(snapshot.finished_before, 1);
        assert!(store.save_tree(&tree).is_ok());
        assert!(store.load_snapshot::<RawFile>().is_err());
    }

    #[test]
    fn test_for_root_and_remove() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("data");
        let store = CacheStore::for_root(&root);
        assert_eq!(store.path(), temp.path().join("data.cache"));

        store.remove().unwrap();
        store.save_tree::<RawFile>(&[]).unwrap();
        store.remove().unwrap();
        assert!(!store.exists());
    }
}
