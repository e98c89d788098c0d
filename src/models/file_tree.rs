//! Remote file tree model.
//!
//! Nodes live in a slotmap arena; parents are referenced by id and every node
//! is also reachable through its "/"-joined path. The root path is `""`.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::kernel::services::ports::{EntryKind, RemoteEntry};

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

impl From<EntryKind> for NodeKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Directory => NodeKind::Dir,
            EntryKind::File => NodeKind::File,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileTreeError {
    #[error("invalid node id")]
    InvalidNodeId,
    #[error("node is not a directory")]
    NotADirectory,
    #[error("children of `{0}` are already loaded")]
    AlreadyLoaded(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    name: CompactString,
    path: String,
    parent: Option<NodeId>,
    children: Option<Vec<NodeId>>,
    load_state: LoadState,
    expanded: bool,
}

impl Node {
    fn new_file(name: CompactString, path: String, parent: NodeId) -> Self {
        Self {
            kind: NodeKind::File,
            name,
            path,
            parent: Some(parent),
            children: None,
            load_state: LoadState::Loaded,
            expanded: false,
        }
    }

    fn new_dir(name: CompactString, path: String, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Dir,
            name,
            path,
            parent,
            children: Some(Vec::new()),
            load_state: LoadState::NotLoaded,
            expanded: false,
        }
    }
}

pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    id_by_path: FxHashMap<String, NodeId>,
}

impl std::fmt::Debug for FileTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTree")
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl FileTree {
    pub fn new(root_name: impl Into<CompactString>) -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node::new_dir(root_name.into(), String::new(), None));
        let mut id_by_path = FxHashMap::default();
        id_by_path.insert(String::new(), root);

        Self {
            arena,
            root,
            id_by_path,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.id_by_path.get(normalize(path)).copied()
    }

    pub fn path(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|n| n.path.as_str())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|n| n.name.as_str())
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.arena.get(id).map(|n| n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn is_dir(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Dir)
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|n| n.expanded)
    }

    pub fn load_state(&self, id: NodeId) -> Option<LoadState> {
        self.arena.get(id).map(|n| n.load_state)
    }

    pub fn is_loaded(&self, id: NodeId) -> bool {
        self.load_state(id) == Some(LoadState::Loaded)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.arena
            .get(id)
            .and_then(|n| n.children.as_deref())
    }

    /// Marks an unloaded directory as having a listing request in flight.
    /// Returns `false` when the node is not an unloaded directory.
    pub fn begin_load(&mut self, id: NodeId) -> bool {
        match self.arena.get_mut(id) {
            Some(node) if node.kind == NodeKind::Dir && node.load_state == LoadState::NotLoaded => {
                node.load_state = LoadState::Loading;
                true
            }
            _ => false,
        }
    }

    /// Resets a directory whose listing failed. Loaded directories are left alone.
    pub fn fail_load(&mut self, id: NodeId) -> bool {
        match self.arena.get_mut(id) {
            Some(node) if node.kind == NodeKind::Dir && node.load_state != LoadState::Loaded => {
                node.load_state = LoadState::NotLoaded;
                node.expanded = false;
                true
            }
            _ => false,
        }
    }

    /// Populates a directory from a listing: directories first, then files, each
    /// group in the order the store returned them. Entries whose path is already
    /// present are skipped. The directory ends up loaded and expanded.
    pub fn populate(
        &mut self,
        id: NodeId,
        entries: Vec<RemoteEntry>,
    ) -> Result<usize, FileTreeError> {
        let parent = self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?;
        if parent.kind != NodeKind::Dir {
            return Err(FileTreeError::NotADirectory);
        }
        if parent.load_state == LoadState::Loaded {
            return Err(FileTreeError::AlreadyLoaded(parent.path.clone()));
        }
        let parent_path = parent.path.clone();

        let (dirs, files): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| entry.kind == EntryKind::Directory);

        let mut children = Vec::with_capacity(dirs.len() + files.len());
        for entry in dirs.into_iter().chain(files) {
            if entry.name.is_empty() || entry.name.contains('/') {
                tracing::warn!(parent = %parent_path, name = %entry.name, "skipping invalid entry name");
                continue;
            }
            let path = join(&parent_path, &entry.name);
            if self.id_by_path.contains_key(&path) {
                tracing::warn!(path = %path, "skipping duplicate tree entry");
                continue;
            }
            if entry.path != path {
                tracing::debug!(store_path = %entry.path, path = %path, "store path differs from joined path");
            }

            let name = CompactString::from(entry.name.as_str());
            let node = match NodeKind::from(entry.kind) {
                NodeKind::Dir => Node::new_dir(name, path.clone(), Some(id)),
                NodeKind::File => Node::new_file(name, path.clone(), id),
            };
            let child = self.arena.insert(node);
            self.id_by_path.insert(path, child);
            children.push(child);
        }

        let count = children.len();
        let node = self.arena.get_mut(id).ok_or(FileTreeError::InvalidNodeId)?;
        node.children = Some(children);
        node.load_state = LoadState::Loaded;
        node.expanded = true;
        Ok(count)
    }

    /// Flips `expanded` on a loaded directory. Returns the new state.
    pub fn toggle_expand(&mut self, id: NodeId) -> Option<bool> {
        let node = self.arena.get_mut(id)?;
        if node.kind != NodeKind::Dir || node.load_state != LoadState::Loaded {
            return None;
        }
        node.expanded = !node.expanded;
        Some(node.expanded)
    }

    pub fn collapse_all(&mut self) -> bool {
        let root = self.root;
        let mut changed = false;
        for (id, node) in self.arena.iter_mut() {
            if id != root && node.expanded {
                node.expanded = false;
                changed = true;
            }
        }
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub name: CompactString,
    pub path: String,
    pub is_dir: bool,
    pub is_expanded: bool,
    pub load_state: LoadState,
}

impl FileTree {
    /// Depth-first rows for the visible part of the tree. The root itself is
    /// not a row; its children are listed whenever it is expanded.
    pub fn flatten_for_view(&self) -> Vec<FileTreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };

            if id != self.root {
                result.push(FileTreeRow {
                    id,
                    depth,
                    name: node.name.clone(),
                    path: node.path.clone(),
                    is_dir: node.kind == NodeKind::Dir,
                    is_expanded: node.expanded,
                    load_state: node.load_state,
                });
            }

            if node.expanded {
                if let Some(children) = &node.children {
                    let child_depth = if id == self.root { 0 } else { depth + 1 };
                    for &child in children.iter().rev() {
                        stack.push((child, child_depth));
                    }
                }
            }
        }

        result
    }
}

pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

pub fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
