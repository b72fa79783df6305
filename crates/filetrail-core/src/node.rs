//! Tree node type.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::file::TypedFile;

/// A unit of the directory model: a file leaf or a non-empty directory.
///
/// Siblings are kept in ascending entry-name order as found at scan time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "F: Serialize", deserialize = "F: DeserializeOwned"))]
pub enum TreeNode<F> {
    /// A typed file.
    Leaf(F),
    /// A directory with at least one file somewhere beneath it.
    Directory {
        /// Absolute path of the directory.
        path: PathBuf,
        /// Children in name order.
        children: Vec<TreeNode<F>>,
    },
}

impl<F: TypedFile> TreeNode<F> {
    /// Create a directory node.
    pub fn directory(path: impl Into<PathBuf>, children: Vec<TreeNode<F>>) -> Self {
        TreeNode::Directory {
            path: path.into(),
            children,
        }
    }

    /// Path of the file or directory.
    pub fn path(&self) -> &Path {
        match self {
            TreeNode::Leaf(file) => file.path(),
            TreeNode::Directory { path, .. } => path,
        }
    }

    /// Check if this node is a file.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }

    /// The file held by a leaf.
    pub fn as_leaf(&self) -> Option<&F> {
        match self {
            TreeNode::Leaf(file) => Some(file),
            TreeNode::Directory { .. } => None,
        }
    }

    /// Direct children (empty for leaves).
    pub fn children(&self) -> &[TreeNode<F>] {
        match self {
            TreeNode::Leaf(_) => &[],
            TreeNode::Directory { children, .. } => children,
        }
    }

    /// Number of files in this subtree.
    pub fn file_count(&self) -> u64 {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Directory { children, .. } => children.iter().map(Self::file_count).sum(),
        }
    }

    /// Number of directories in this subtree, including this one.
    pub fn dir_count(&self) -> u64 {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Directory { children, .. } => {
                1 + children.iter().map(Self::dir_count).sum::<u64>()
            }
        }
    }

    /// First directory in this subtree with no children.
    pub fn find_empty_directory(&self) -> Option<&Path> {
        match self {
            TreeNode::Leaf(_) => None,
            TreeNode::Directory { path, children } if children.is_empty() => Some(path),
            TreeNode::Directory { children, .. } => {
                children.iter().find_map(Self::find_empty_directory)
            }
        }
    }
}

/// Depth-first, left-to-right walk over every file in a forest.
pub fn leaves<F>(nodes: &[TreeNode<F>]) -> Leaves<'_, F> {
    Leaves {
        stack: vec![nodes.iter()],
    }
}

/// Iterator returned by [`leaves`].
pub struct Leaves<'a, F> {
    stack: Vec<std::slice::Iter<'a, TreeNode<F>>>,
}

impl<'a, F> Iterator for Leaves<'a, F> {
    type Item = &'a F;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(TreeNode::Leaf(file)) => return Some(file),
                Some(TreeNode::Directory { children, .. }) => self.stack.push(children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
