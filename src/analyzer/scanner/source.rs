//! Ingestion Sources
//!
//! A scan consumes either an enumerable directory capability (handles that
//! resolve to sub-directories or file content accessors) or a flat list of
//! `(relativePath, contentAccessor)` pairs.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::{ContentAccessor, DocError, Result};

/// One immediate child of a directory handle
pub enum DirectoryEntry {
    Directory(Box<dyn DirectoryHandle>),
    File {
        name: String,
        content: ContentAccessor,
    },
}

impl DirectoryEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(handle) => handle.name(),
            Self::File { name, .. } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

/// Enumerable directory capability
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    /// Segment name of this directory
    fn name(&self) -> &str;

    /// Immediate entries, in any order
    async fn entries(&self) -> Result<Vec<DirectoryEntry>>;
}

/// Flat-list ingestion entry
#[derive(Debug, Clone)]
pub struct FlatEntry {
    pub relative_path: String,
    pub content: ContentAccessor,
}

impl FlatEntry {
    pub fn new(relative_path: impl Into<String>, content: ContentAccessor) -> Self {
        Self {
            relative_path: relative_path.into(),
            content,
        }
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Root ingestion source handed to the scanner
pub enum IngestionSource {
    Directory(Box<dyn DirectoryHandle>),
    Flat(Vec<FlatEntry>),
}

impl IngestionSource {
    /// Local filesystem directory
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::Directory(Box::new(LocalDirectory::new(root)))
    }
}

/// Supplies an ingestion source, or reports that the user cancelled.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// `Err(DocError::IngestionCancelled)` when the user aborts
    async fn pick(&self) -> Result<IngestionSource>;
}

// =============================================================================
// Local Filesystem
// =============================================================================

/// Directory handle backed by `tokio::fs`. Symlinks are not followed.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    path: PathBuf,
    name: String,
}

impl LocalDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn entries(&self) -> Result<Vec<DirectoryEntry>> {
        let mut reader = tokio::fs::read_dir(&self.path).await.map_err(|e| {
            DocError::scan_failed(format!("{}: {}", self.path.display(), e))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| DocError::scan_failed(format!("{}: {}", self.path.display(), e)))?
        {
            let file_type = entry.file_type().await?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if file_type.is_symlink() {
                debug!("Skipping symlink: {}", path.display());
                continue;
            }

            if file_type.is_dir() {
                entries.push(DirectoryEntry::Directory(Box::new(LocalDirectory {
                    path,
                    name,
                })));
            } else if file_type.is_file() {
                entries.push(DirectoryEntry::File {
                    name,
                    content: ContentAccessor::from_path(path),
                });
            }
        }
        Ok(entries)
    }
}

/// Picker over a fixed path; a missing path is a scan failure
pub struct PathPicker {
    root: Option<PathBuf>,
}

impl PathPicker {
    /// `None` behaves like a cancelled picker
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

#[async_trait]
impl DirectoryPicker for PathPicker {
    async fn pick(&self) -> Result<IngestionSource> {
        let root = self.root.as_ref().ok_or(DocError::IngestionCancelled)?;
        let metadata = tokio::fs::metadata(root)
            .await
            .map_err(|e| DocError::scan_failed(format!("{}: {}", root.display(), e)))?;
        if !metadata.is_dir() {
            return Err(DocError::scan_failed(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(IngestionSource::local(root.clone()))
    }
}
