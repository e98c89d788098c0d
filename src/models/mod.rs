//! Data models.

pub mod file_tree;

pub use file_tree::{FileTree, FileTreeError, FileTreeRow, LoadState, NodeId, NodeKind};
