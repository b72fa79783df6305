//! Resumable iteration over the files of a directory tree.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use filetrail_core::{
    IteratorConfig, ScanWarning, TrailError, TreeNode, TreeStats, TypedFile, leaves,
};

use crate::cache::{CacheStore, IteratorSnapshot};
use crate::scanner::Scanner;

/// Owns a scanned tree of typed files plus a resume cursor.
///
/// The cursor is two counters. `finished_now` counts files passed during
/// the current traversal and restarts at zero with every
/// [`begin_iteration`](Self::begin_iteration). `finished_before` is only
/// moved by [`checkpoint`](Self::checkpoint); a traversal silently passes
/// over that many files before yielding anything. Resuming is therefore
/// only exact while the tree keeps the shape it had at the checkpoint.
#[derive(Debug, Clone)]
pub struct FileIterator<F: TypedFile> {
    root: PathBuf,
    options: F::Options,
    tree: Vec<TreeNode<F>>,
    finished_before: u64,
    finished_now: u64,
    warnings: Vec<ScanWarning>,
}

impl<F: TypedFile> FileIterator<F> {
    /// Build an iterator over `config.root`.
    ///
    /// With caching on, an existing cache file is loaded instead of scanning
    /// and a fresh scan is written to the cache. With `config.validate`, a
    /// cached tree that references a vanished file is discarded, rescanned
    /// and rewritten.
    pub fn new(config: &IteratorConfig, options: F::Options) -> Result<Self, TrailError> {
        let root = std::path::absolute(&config.root).map_err(|e| TrailError::io(&config.root, e))?;
        ensure_non_empty_root(&root)?;

        let scanner = Scanner::<F>::new(options.clone());
        let mut iter = Self {
            root,
            options,
            tree: Vec::new(),
            finished_before: 0,
            finished_now: 0,
            warnings: Vec::new(),
        };

        let Some(cache_path) = config.resolved_cache_path() else {
            iter.replace_tree(&scanner)?;
            return Ok(iter);
        };

        let store = CacheStore::new(cache_path);
        if store.exists() {
            iter.tree = store.load_tree()?;
        } else {
            iter.replace_tree(&scanner)?;
            store.save_tree(&iter.tree)?;
        }

        if config.validate {
            if let Some(missing) = first_missing_file(&iter.tree) {
                tracing::warn!(
                    target: "cache",
                    missing = %missing.display(),
                    cache = %store.path().display(),
                    "cached tree is stale, rescanning"
                );
                iter.replace_tree(&scanner)?;
                store.save_tree(&iter.tree)?;
            }
        }

        Ok(iter)
    }

    /// Build an iterator over `root` with default configuration.
    pub fn from_root(root: impl Into<PathBuf>, options: F::Options) -> Result<Self, TrailError> {
        Self::new(&IteratorConfig::new(root), options)
    }

    /// Load a checkpointed iterator from `cache_path`.
    pub fn load(cache_path: impl AsRef<Path>) -> Result<Self, TrailError> {
        let store = CacheStore::new(cache_path.as_ref());
        let snapshot = store.load_snapshot::<F>()?;
        tracing::debug!(
            target: "cache",
            path = %store.path().display(),
            finished_before = snapshot.finished_before,
            "loaded iterator snapshot"
        );
        Ok(Self {
            root: snapshot.root,
            options: snapshot.options,
            tree: snapshot.tree.into_owned(),
            finished_before: snapshot.finished_before,
            finished_now: snapshot.finished_now,
            warnings: Vec::new(),
        })
    }

    /// Load a checkpointed iterator, or build a fresh one over `root` when
    /// `cache_path` does not exist yet.
    pub fn load_or_create(
        root: impl Into<PathBuf>,
        cache_path: impl AsRef<Path>,
        options: F::Options,
    ) -> Result<Self, TrailError> {
        let cache_path = cache_path.as_ref();
        if cache_path.exists() {
            return Self::load(cache_path);
        }
        tracing::warn!(
            target: "cache",
            path = %cache_path.display(),
            "cache file does not exist, creating a new iterator"
        );
        Self::from_root(root, options)
    }

    /// Record the current position and persist the whole iterator.
    pub fn checkpoint(&mut self, cache_path: impl AsRef<Path>) -> Result<(), TrailError> {
        self.finished_before = self.finished_now;
        CacheStore::new(cache_path.as_ref()).save_snapshot(IteratorSnapshot {
            root: self.root.clone(),
            options: self.options.clone(),
            finished_before: self.finished_before,
            finished_now: self.finished_now,
            tree: Cow::Borrowed(&self.tree),
        })?;
        tracing::debug!(
            target: "traverse",
            finished = self.finished_before,
            total = self.len(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Start a traversal pass from the last checkpoint.
    pub fn begin_iteration(&mut self) -> Traversal<'_, F> {
        self.finished_now = 0;
        Traversal {
            iter: self,
            stack: vec![0],
        }
    }

    /// Scan the root again, replacing the tree. The resume cursor is kept.
    pub fn rescan(&mut self) -> Result<(), TrailError> {
        if self.finished_before > 0 {
            tracing::warn!(
                target: "traverse",
                finished_before = self.finished_before,
                "rescanning with a saved position, resume may skip or repeat files if the tree changed"
            );
        }
        let scanner = Scanner::<F>::new(self.options.clone());
        self.replace_tree(&scanner)
    }

    /// Move the checkpoint back to the first file and persist it to
    /// `cache_path`.
    pub fn reset_progress(&mut self, cache_path: impl AsRef<Path>) -> Result<(), TrailError> {
        self.finished_now = 0;
        self.checkpoint(cache_path)
    }

    /// Root directory of the tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Options used to construct files.
    pub fn options(&self) -> &F::Options {
        &self.options
    }

    /// Top-level nodes of the tree.
    pub fn tree(&self) -> &[TreeNode<F>] {
        &self.tree
    }

    /// Files completed at the last checkpoint.
    pub fn finished_before(&self) -> u64 {
        self.finished_before
    }

    /// Files passed during the current traversal.
    pub fn finished_now(&self) -> u64 {
        self.finished_now
    }

    /// Total number of files in the tree.
    pub fn len(&self) -> u64 {
        self.tree.iter().map(TreeNode::file_count).sum()
    }

    /// Check if the tree holds no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Files not yet covered by the last checkpoint.
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.finished_before)
    }

    /// Summary statistics for the tree.
    pub fn stats(&self) -> TreeStats {
        TreeStats::from_nodes(&self.tree)
    }

    /// Warnings from the most recent scan run by this instance.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    fn replace_tree(&mut self, scanner: &Scanner<F>) -> Result<(), TrailError> {
        let outcome = scanner.scan(&self.root)?;
        self.tree = outcome.nodes;
        self.warnings = outcome.warnings;
        Ok(())
    }
}

impl<'a, F: TypedFile> IntoIterator for &'a mut FileIterator<F> {
    type Item = F;
    type IntoIter = Traversal<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.begin_iteration()
    }
}

/// A single depth-first, left-to-right pass over a [`FileIterator`].
///
/// Files already covered by the last checkpoint are passed over without
/// being yielded.
#[derive(Debug)]
pub struct Traversal<'a, F: TypedFile> {
    iter: &'a mut FileIterator<F>,
    /// Next child index at each depth.
    stack: Vec<usize>,
}

impl<F: TypedFile> Traversal<'_, F> {
    /// Checkpoint the underlying iterator at the current position.
    pub fn checkpoint(&mut self, cache_path: impl AsRef<Path>) -> Result<(), TrailError> {
        self.iter.checkpoint(cache_path)
    }

    /// Files passed so far in this traversal, skipped ones included.
    pub fn position(&self) -> u64 {
        self.iter.finished_now
    }
}

/// Children of the directory reached by following `path` from `tree`.
///
/// Every index in `path` has already been advanced past the directory it
/// entered, hence the `- 1`.
fn level<'t, F: TypedFile>(tree: &'t [TreeNode<F>], path: &[usize]) -> &'t [TreeNode<F>] {
    path.iter()
        .fold(tree, |nodes, &next| nodes[next - 1].children())
}

impl<F: TypedFile> Iterator for Traversal<'_, F> {
    type Item = F;

    fn next(&mut self) -> Option<F> {
        loop {
            let (&pos, parents) = self.stack.split_last()?;
            let file = match level(&self.iter.tree, parents).get(pos) {
                None => {
                    self.stack.pop();
                    continue;
                }
                Some(TreeNode::Leaf(file)) => Some(file.clone()),
                Some(TreeNode::Directory { .. }) => None,
            };

            if let Some(last) = self.stack.last_mut() {
                *last += 1;
            }

            match file {
                Some(file) => {
                    let skip = self.iter.finished_now < self.iter.finished_before;
                    self.iter.finished_now += 1;
                    if !skip {
                        return Some(file);
                    }
                }
                None => self.stack.push(0),
            }
        }
    }
}

fn ensure_non_empty_root(root: &Path) -> Result<(), TrailError> {
    let mut entries = fs::read_dir(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotADirectory => TrailError::NotADirectory {
            path: root.to_path_buf(),
        },
        _ => TrailError::io(root, e),
    })?;
    if entries.next().is_none() {
        return Err(TrailError::EmptyRoot {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

fn first_missing_file<F: TypedFile>(tree: &[TreeNode<F>]) -> Option<&Path> {
    leaves(tree).map(|file| file.path()).find(|path| !path.exists())
}
