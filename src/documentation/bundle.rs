//! Multi-File Bundle
//!
//! Files are concatenated as
//!
//! ```text
//! === FILE: <path> ===
//! <text>
//! === END FILE ===
//! ```
//!
//! Content lines that would read as a marker are prefixed with `\`, so the
//! only marker lines in a bundle are real file boundaries.

use std::borrow::Cow;
use tracing::warn;

use crate::constants::bundle::{END_MARKER, FILE_MARKER_PREFIX, FILE_MARKER_SUFFIX, MARKER_ESCAPE};
use crate::types::{DirectoryNode, DocError, Result, find_node};

/// One file's contribution to a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub path: String,
    pub text: String,
}

impl BundleEntry {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

fn open_marker(path: &str) -> String {
    format!("{}{}{}", FILE_MARKER_PREFIX, path, FILE_MARKER_SUFFIX)
}

/// A line that, once escapes are stripped, reads as a marker
fn looks_like_marker(line: &str) -> bool {
    let bare = line.trim_start_matches(MARKER_ESCAPE);
    bare.starts_with(FILE_MARKER_PREFIX) || bare.trim_end() == END_MARKER
}

/// Escape marker-like lines in file content
pub fn escape_markers(text: &str) -> Cow<'_, str> {
    if !text.lines().any(looks_like_marker) {
        return Cow::Borrowed(text);
    }
    let escaped: Vec<Cow<'_, str>> = text
        .split('\n')
        .map(|line| {
            if looks_like_marker(line) {
                Cow::Owned(format!("{}{}", MARKER_ESCAPE, line))
            } else {
                Cow::Borrowed(line)
            }
        })
        .collect();
    Cow::Owned(escaped.join("\n"))
}

fn unescape_line(line: &str) -> &str {
    match line.strip_prefix(MARKER_ESCAPE) {
        Some(rest) if looks_like_marker(rest) => rest,
        _ => line,
    }
}

/// Concatenate entries into a marker-delimited bundle
pub fn concatenate(entries: &[BundleEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "\n{}\n{}\n{}\n",
                open_marker(&entry.path),
                escape_markers(&entry.text),
                END_MARKER
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Paths named by the opening markers of a bundle, in order
pub fn file_paths(bundle: &str) -> Vec<String> {
    bundle
        .lines()
        .filter_map(|line| {
            line.strip_prefix(FILE_MARKER_PREFIX)?
                .strip_suffix(FILE_MARKER_SUFFIX)
                .map(str::to_string)
        })
        .collect()
}

/// Split a bundle back into its entries
pub fn split(bundle: &str) -> Vec<BundleEntry> {
    let mut entries = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in bundle.split('\n') {
        match current.as_mut() {
            None => {
                if let Some(path) = line
                    .strip_prefix(FILE_MARKER_PREFIX)
                    .and_then(|rest| rest.strip_suffix(FILE_MARKER_SUFFIX))
                {
                    current = Some((path.to_string(), Vec::new()));
                }
            }
            Some((_, body)) if line != END_MARKER => body.push(unescape_line(line)),
            Some(_) => {
                if let Some((path, body)) = current.take() {
                    entries.push(BundleEntry::new(path, body.join("\n")));
                }
            }
        }
    }
    entries
}

/// `fileStructure` field: newline-joined selected paths
pub fn file_structure<'a>(paths: impl IntoIterator<Item = &'a str>) -> String {
    paths.into_iter().collect::<Vec<_>>().join("\n")
}

/// Read one selected file from the tree
pub async fn read_file(tree: &[DirectoryNode], path: &str) -> Result<String> {
    let node = find_node(tree, path)
        .filter(|n| n.is_file())
        .ok_or_else(|| DocError::FileNotFound(path.to_string()))?;
    let content = node
        .content
        .as_ref()
        .ok_or_else(|| DocError::FileNotFound(path.to_string()))?;
    content.read_text().await
}

/// Read every selected file, in selection order.
///
/// Files that cannot be read are left out of the entries and reported
/// separately.
pub async fn read_entries<'a>(
    tree: &[DirectoryNode],
    paths: impl IntoIterator<Item = &'a str>,
) -> (Vec<BundleEntry>, Vec<(String, DocError)>) {
    let mut entries = Vec::new();
    let mut failures = Vec::new();
    for path in paths {
        match read_file(tree, path).await {
            Ok(text) => entries.push(BundleEntry::new(path, text)),
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", path, e);
                failures.push((path.to_string(), e));
            }
        }
    }
    (entries, failures)
}
