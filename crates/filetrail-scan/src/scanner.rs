//! Recursive, name-ordered directory scanner.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use filetrail_core::{ScanWarning, TrailError, TreeNode, TreeStats, TypedFile};

/// Result of scanning one root directory.
#[derive(Debug, Clone)]
pub struct ScanOutcome<F> {
    /// Top-level nodes under the root, in name order.
    pub nodes: Vec<TreeNode<F>>,
    /// Absolute root path that was scanned.
    pub root_path: PathBuf,
    /// Summary statistics.
    pub stats: TreeStats,
    /// Duration of the scan.
    pub scan_duration: Duration,
    /// Entries skipped during the scan.
    pub warnings: Vec<ScanWarning>,
}

/// Builds a [`TreeNode`] forest of typed files from a root directory.
///
/// Entries are listed one directory at a time and visited in ascending
/// byte order of their names. Directories that end up holding no files are
/// pruned; entries that are neither files nor directories are skipped.
/// Failure to construct a typed file for any regular file aborts the scan.
#[derive(Debug, Clone)]
pub struct Scanner<F: TypedFile> {
    options: F::Options,
    _file: PhantomData<F>,
}

impl<F: TypedFile> Scanner<F> {
    /// Create a scanner constructing files with `options`.
    pub fn new(options: F::Options) -> Self {
        Self {
            options,
            _file: PhantomData,
        }
    }

    /// Perform a scan of the given root directory.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome<F>, TrailError> {
        let start = Instant::now();
        let root_path = std::path::absolute(root).map_err(|e| TrailError::io(root, e))?;

        let metadata = fs::metadata(&root_path).map_err(|e| TrailError::io(&root_path, e))?;
        if !metadata.is_dir() {
            return Err(TrailError::NotADirectory { path: root_path });
        }

        let mut warnings = Vec::new();
        let nodes = self.scan_dir(&root_path, &mut warnings)?;
        let stats = TreeStats::from_nodes(&nodes);
        let scan_duration = start.elapsed();

        tracing::debug!(
            target: "scan",
            root = %root_path.display(),
            files = stats.total_files,
            dirs = stats.total_dirs,
            warnings = warnings.len(),
            elapsed_ms = scan_duration.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            nodes,
            root_path,
            stats,
            scan_duration,
            warnings,
        })
    }

    /// Recursively scan one directory into its child list.
    fn scan_dir(
        &self,
        dir: &Path,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<Vec<TreeNode<F>>, TrailError> {
        let mut names = fs::read_dir(dir)
            .map_err(|e| TrailError::io(dir, e))?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TrailError::io(dir, e))?;
        names.sort();

        let mut nodes = Vec::with_capacity(names.len());
        for name in names {
            let path = dir.join(&name);

            // Follows symlinks; a dangling link has no metadata.
            let Ok(metadata) = fs::metadata(&path) else {
                self.skip(ScanWarning::unrecognized(&path), warnings);
                continue;
            };

            if metadata.is_file() {
                let file = F::open(path, &self.options)?;
                nodes.push(TreeNode::Leaf(file));
            } else if metadata.is_dir() {
                let children = self.scan_dir(&path, warnings)?;
                if children.is_empty() {
                    self.skip(ScanWarning::empty_directory(&path), warnings);
                    continue;
                }
                nodes.push(TreeNode::directory(path, children));
            } else {
                self.skip(ScanWarning::unrecognized(&path), warnings);
            }
        }

        Ok(nodes)
    }

    fn skip(&self, warning: ScanWarning, warnings: &mut Vec<ScanWarning>) {
        tracing::warn!(target: "scan", path = %warning.path.display(), "{}", warning.message);
        warnings.push(warning);
    }
}

impl<F: TypedFile> Default for Scanner<F> {
    fn default() -> Self {
        Self::new(F::Options::default())
    }
}
