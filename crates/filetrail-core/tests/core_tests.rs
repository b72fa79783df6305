use filetrail_core::{
    FileError, FileKind, FileOptions, TreeNode, TreeStats, TypedFile, leaves,
    require_regular_file,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Minimal file variant for exercising the tree types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Plain {
    path: PathBuf,
}

impl TypedFile for Plain {
    const KIND: FileKind = FileKind::Raw;
    type Options = FileOptions;
    type View = Vec<u8>;

    fn open(path: impl Into<PathBuf>, _options: &FileOptions) -> Result<Self, FileError> {
        let path = path.into();
        require_regular_file(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn validate(_path: &Path) -> bool {
        true
    }

    fn access<R, E>(&self, f: impl FnOnce(&mut Vec<u8>) -> Result<R, E>) -> Result<R, E>
    where
        E: From<FileError>,
    {
        let mut bytes = fs::read(&self.path).map_err(|e| FileError::io(&self.path, e))?;
        f(&mut bytes)
    }

    fn create(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        fs::write(&path, b"").map_err(|e| FileError::io(&path, e))?;
        Ok(Self { path })
    }
}

fn leaf(path: &str) -> TreeNode<Plain> {
    TreeNode::Leaf(Plain {
        path: PathBuf::from(path),
    })
}

fn sample_tree() -> Vec<TreeNode<Plain>> {
    vec![
        leaf("/r/a.txt"),
        TreeNode::directory(
            "/r/d",
            vec![
                leaf("/r/d/b.txt"),
                TreeNode::directory("/r/d/e", vec![leaf("/r/d/e/c.txt")]),
            ],
        ),
        leaf("/r/z.txt"),
    ]
}

#[test]
fn test_derived_attributes() {
    let file = Plain {
        path: PathBuf::from("/data/set/archive.tar.gz"),
    };

    assert_eq!(file.name(), "archive.tar.gz");
    assert_eq!(file.basename(), "archive.tar");
    assert_eq!(file.extension().as_deref(), Some("gz"));
    assert_eq!(file.folder(), Path::new("/data/set"));

    let bare = Plain {
        path: PathBuf::from("/data/README"),
    };
    assert_eq!(bare.basename(), "README");
    assert!(bare.extension().is_none());
}

#[test]
fn test_dotfile_has_no_extension() {
    let dotfile = Plain {
        path: PathBuf::from("/srv/app/.env"),
    };

    assert_eq!(dotfile.name(), ".env");
    assert_eq!(dotfile.basename(), ".env");
    assert!(dotfile.extension().is_none());

    let hidden = Plain {
        path: PathBuf::from("/srv/app/.config.json"),
    };
    assert_eq!(hidden.basename(), ".config");
    assert_eq!(hidden.extension().as_deref(), Some("json"));
}

#[test]
fn test_equality_by_path() {
    let a = Plain {
        path: PathBuf::from("/x/a"),
    };
    let b = Plain {
        path: PathBuf::from("/x/a"),
    };
    let c = Plain {
        path: PathBuf::from("/x/c"),
    };
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_open_rejects_missing_and_directories() {
    let temp = TempDir::new().unwrap();

    let missing = Plain::open(temp.path().join("nope"), &FileOptions::default());
    assert!(matches!(missing, Err(FileError::NotFound { .. })));

    let dir = Plain::open(temp.path(), &FileOptions::default());
    assert!(matches!(dir, Err(FileError::NotAFile { .. })));
}

#[test]
fn test_save_to_creates_destination_folder() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.txt");
    fs::write(&src, "payload").unwrap();
    let file = Plain::open(&src, &FileOptions::default()).unwrap();

    let dest = temp.path().join("nested/deeper/copy.txt");
    file.save_to(&dest).unwrap();

    assert_eq!(fs::read_to_string(dest).unwrap(), "payload");
}

#[test]
fn test_leaves_depth_first_order() {
    let tree = sample_tree();
    let paths: Vec<_> = leaves(&tree).map(|f| f.path.clone()).collect();

    assert_eq!(
        paths,
        vec![
            PathBuf::from("/r/a.txt"),
            PathBuf::from("/r/d/b.txt"),
            PathBuf::from("/r/d/e/c.txt"),
            PathBuf::from("/r/z.txt"),
        ]
    );
}

#[test]
fn test_node_counts() {
    let tree = sample_tree();
    let dir = &tree[1];

    assert!(dir.is_dir());
    assert!(!dir.is_leaf());
    assert_eq!(dir.file_count(), 2);
    assert_eq!(dir.dir_count(), 2);
    assert_eq!(dir.children().len(), 2);
    assert!(tree[0].as_leaf().is_some());
    assert_eq!(tree[0].file_count(), 1);
}

#[test]
fn test_tree_stats() {
    let stats = TreeStats::from_nodes(&sample_tree());

    assert_eq!(stats.total_files, 4);
    assert_eq!(stats.total_dirs, 2);
    assert_eq!(stats.max_depth, 3);
}

#[test]
fn test_find_empty_directory() {
    let tree = sample_tree();
    assert!(tree.iter().all(|n| n.find_empty_directory().is_none()));

    let broken = TreeNode::directory(
        "/r/d",
        vec![leaf("/r/d/a"), TreeNode::directory("/r/d/hollow", Vec::new())],
    );
    assert_eq!(broken.find_empty_directory(), Some(Path::new("/r/d/hollow")));
}

#[test]
fn test_tree_serde_preserves_shape() {
    let tree = sample_tree();
    let json = serde_json::to_string(&tree).unwrap();
    let back: Vec<TreeNode<Plain>> = serde_json::from_str(&json).unwrap();
    assert_eq!(tree, back);
}
