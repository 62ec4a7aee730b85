//! Directory Tree Model
//!
//! File and directory nodes produced by a scan. File contents are never
//! loaded eagerly: each file node carries a [`ContentAccessor`] that reads
//! the bytes on demand.

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::Result;

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

// =============================================================================
// Content Accessor
// =============================================================================

/// Deferred reader for a file's content
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn read(&self) -> Result<Vec<u8>>;
}

/// Cloneable, lazily-invoked handle to a file's content
#[derive(Clone)]
pub struct ContentAccessor(Arc<dyn ContentSource>);

impl ContentAccessor {
    pub fn new(source: impl ContentSource + 'static) -> Self {
        Self(Arc::new(source))
    }

    /// Accessor reading a file from the local filesystem
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(PathSource(path.into()))
    }

    /// Accessor over an in-memory buffer
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self::new(MemorySource(Arc::from(bytes)))
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        self.0.read().await
    }

    /// Read and decode as UTF-8 (lossy)
    pub async fn read_text(&self) -> Result<String> {
        let bytes = self.read().await?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

impl std::fmt::Debug for ContentAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentAccessor")
    }
}

struct PathSource(PathBuf);

#[async_trait]
impl ContentSource for PathSource {
    async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.0).await?)
    }
}

struct MemorySource(Arc<[u8]>);

#[async_trait]
impl ContentSource for MemorySource {
    async fn read(&self) -> Result<Vec<u8>> {
        Ok(self.0.to_vec())
    }
}

// =============================================================================
// Directory Node
// =============================================================================

/// One entry of a scanned tree.
///
/// `path` is posix-style and unique within a tree; a directory's children all
/// start with `path + "/"`. Children are ordered directories first, then files,
/// each group by case-sensitive name.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub children: Vec<DirectoryNode>,
    #[serde(skip)]
    pub content: Option<ContentAccessor>,
}

impl DirectoryNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>, content: ContentAccessor) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            content: Some(content),
        }
    }

    pub fn directory(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<DirectoryNode>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            children,
            content: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// All descendant file paths (transitive), in tree order
    pub fn descendant_files(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_files(std::slice::from_ref(self), &mut out);
        out
    }

    /// Sort children recursively: directories first, then by name
    pub fn sort_recursive(&mut self) {
        sort_nodes(&mut self.children);
    }
}

/// Order nodes directories-first, then by case-sensitive name, recursively
pub fn sort_nodes(nodes: &mut [DirectoryNode]) {
    nodes.sort_by(compare_nodes);
    for node in nodes.iter_mut() {
        if node.is_dir() {
            sort_nodes(&mut node.children);
        }
    }
}

/// Sibling ordering used by every scan
pub fn compare_nodes(a: &DirectoryNode, b: &DirectoryNode) -> std::cmp::Ordering {
    match (a.kind, b.kind) {
        (NodeKind::Directory, NodeKind::File) => std::cmp::Ordering::Less,
        (NodeKind::File, NodeKind::Directory) => std::cmp::Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

fn collect_files(nodes: &[DirectoryNode], out: &mut Vec<String>) {
    for node in nodes {
        match node.kind {
            NodeKind::File => out.push(node.path.clone()),
            NodeKind::Directory => collect_files(&node.children, out),
        }
    }
}

/// All file paths in a forest, in tree order
pub fn all_files(nodes: &[DirectoryNode]) -> Vec<String> {
    let mut out = Vec::new();
    collect_files(nodes, &mut out);
    out
}

/// Depth-first lookup by path
pub fn find_node<'a>(nodes: &'a [DirectoryNode], path: &str) -> Option<&'a DirectoryNode> {
    for node in nodes {
        if node.path == path {
            return Some(node);
        }
        if node.is_dir() && path.starts_with(&format!("{}/", node.path)) {
            if let Some(found) = find_node(&node.children, path) {
                return Some(found);
            }
        }
    }
    None
}

/// Visit every node in pre-order
pub fn walk<'a>(nodes: &'a [DirectoryNode], visit: &mut impl FnMut(&'a DirectoryNode)) {
    for node in nodes {
        visit(node);
        walk(&node.children, visit);
    }
}
