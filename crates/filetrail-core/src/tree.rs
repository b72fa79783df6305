//! Summary statistics over a scanned forest.

use serde::{Deserialize, Serialize};

use crate::file::TypedFile;
use crate::node::TreeNode;

/// Summary statistics for a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total number of files.
    pub total_files: u64,
    /// Total number of directories below the root.
    pub total_dirs: u64,
    /// Deepest file, counting direct children of the root as depth 1.
    pub max_depth: u32,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute stats for the top-level nodes of a tree.
    pub fn from_nodes<F: TypedFile>(nodes: &[TreeNode<F>]) -> Self {
        let mut stats = Self::new();
        for node in nodes {
            stats.record(node, 1);
        }
        stats
    }

    fn record<F: TypedFile>(&mut self, node: &TreeNode<F>, depth: u32) {
        match node {
            TreeNode::Leaf(_) => {
                self.total_files += 1;
                self.max_depth = self.max_depth.max(depth);
            }
            TreeNode::Directory { children, .. } => {
                self.total_dirs += 1;
                for child in children {
                    self.record(child, depth + 1);
                }
            }
        }
    }

    /// Check if the tree holds no files.
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_stats_default() {
        let stats = TreeStats::default();
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_dirs, 0);
        assert!(stats.is_empty());
    }
}
