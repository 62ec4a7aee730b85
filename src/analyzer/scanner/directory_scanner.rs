use futures::future::{BoxFuture, FutureExt, try_join_all};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::exclusion::ExclusionRules;
use super::source::{DirectoryEntry, DirectoryHandle, FlatEntry, IngestionSource};
use crate::constants::scan::GITIGNORE_FILE;
use crate::types::{DirectoryNode, DocError, Result, sort_nodes};

/// Builds a filtered, ordered forest of [`DirectoryNode`] from an ingestion source
pub struct DirectoryScanner {
    rules: ExclusionRules,
    respect_gitignore: bool,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(ExclusionRules::builtin())
    }
}

impl DirectoryScanner {
    pub fn new(rules: ExclusionRules) -> Self {
        Self {
            rules,
            respect_gitignore: true,
        }
    }

    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Scan a source into a forest.
    ///
    /// Any enumeration error is reported as `IngestionFailed`.
    pub async fn scan(&self, source: IngestionSource) -> Result<Vec<DirectoryNode>> {
        let nodes = match source {
            IngestionSource::Directory(root) => self.scan_directory(root.as_ref()).await,
            IngestionSource::Flat(entries) => self.scan_flat(entries).await,
        }
        .map_err(|e| match e {
            DocError::IngestionFailed(_) | DocError::IngestionCancelled => e,
            other => DocError::scan_failed(other.to_string()),
        })?;

        info!("Scanned {} top-level entries", nodes.len());
        Ok(nodes)
    }

    async fn scan_directory(&self, root: &dyn DirectoryHandle) -> Result<Vec<DirectoryNode>> {
        let entries = root.entries().await?;
        let rules = self.root_rules(&entries).await;
        scan_entries(&rules, entries, String::new()).await
    }

    /// Root `.gitignore` patterns unioned with the configured rules
    async fn root_rules(&self, entries: &[DirectoryEntry]) -> ExclusionRules {
        if !self.respect_gitignore {
            return self.rules.clone();
        }
        let gitignore = entries.iter().find_map(|entry| match entry {
            DirectoryEntry::File { name, content } if name == GITIGNORE_FILE => Some(content),
            _ => None,
        });
        match gitignore {
            Some(content) => match content.read_text().await {
                Ok(text) => self.rules.clone().with_gitignore(&text),
                Err(e) => {
                    warn!("Failed to read .gitignore file: {}", e);
                    self.rules.clone()
                }
            },
            None => self.rules.clone(),
        }
    }

    async fn scan_flat(&self, entries: Vec<FlatEntry>) -> Result<Vec<DirectoryNode>> {
        let rules = if self.respect_gitignore {
            match shallowest_gitignore(&entries) {
                Some(entry) => match entry.content.read_text().await {
                    Ok(text) => self.rules.clone().with_gitignore(&text),
                    Err(e) => {
                        warn!("Failed to read .gitignore file: {}", e);
                        self.rules.clone()
                    }
                },
                None => self.rules.clone(),
            }
        } else {
            self.rules.clone()
        };

        let mut nodes = build_flat_tree(&rules, entries);
        sort_nodes(&mut nodes);
        Ok(nodes)
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Filter, sort and recurse one directory level.
///
/// Sibling subdirectories are enumerated concurrently; result order is
/// the sorted entry order.
fn scan_entries<'a>(
    rules: &'a ExclusionRules,
    entries: Vec<DirectoryEntry>,
    parent: String,
) -> BoxFuture<'a, Result<Vec<DirectoryNode>>> {
    async move {
        let mut kept: Vec<DirectoryEntry> = entries
            .into_iter()
            .filter(|entry| {
                let path = join_path(&parent, entry.name());
                let excluded = if entry.is_dir() {
                    rules.is_dir_excluded(&path)
                } else {
                    rules.is_excluded(&path)
                };
                if excluded {
                    debug!("Excluded: {}", path);
                }
                !excluded
            })
            .collect();

        kept.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.name().cmp(b.name()),
        });

        let tasks = kept.into_iter().map(|entry| {
            let path = join_path(&parent, entry.name());
            async move {
                match entry {
                    DirectoryEntry::Directory(handle) => {
                        let children = handle.entries().await?;
                        let children = scan_entries(rules, children, path.clone()).await?;
                        Ok(DirectoryNode::directory(handle.name(), path, children))
                    }
                    DirectoryEntry::File { name, content } => {
                        Ok(DirectoryNode::file(name, path, content))
                    }
                }
            }
        });

        try_join_all(tasks).await
    }
    .boxed()
}

/// `.gitignore` entry with the fewest path segments
fn shallowest_gitignore(entries: &[FlatEntry]) -> Option<&FlatEntry> {
    entries
        .iter()
        .filter(|e| e.name() == GITIGNORE_FILE)
        .min_by_key(|e| e.relative_path.matches('/').count())
}

/// Assemble a forest from flat relative paths.
///
/// Intermediate directories are created on demand; an entry is dropped when
/// its own path or any ancestor directory is excluded. The first entry to
/// claim a path wins: a file may not share a path with a directory.
fn build_flat_tree(rules: &ExclusionRules, entries: Vec<FlatEntry>) -> Vec<DirectoryNode> {
    #[derive(Default)]
    struct Dir {
        dirs: HashMap<String, Dir>,
        files: Vec<DirectoryNode>,
    }

    fn into_nodes(dir: Dir, parent: &str) -> Vec<DirectoryNode> {
        let mut nodes: Vec<DirectoryNode> = dir
            .dirs
            .into_iter()
            .map(|(name, sub)| {
                let path = join_path(parent, &name);
                let children = into_nodes(sub, &path);
                DirectoryNode::directory(name, path, children)
            })
            .collect();
        nodes.extend(dir.files);
        nodes
    }

    let mut root = Dir::default();
    let mut files: HashSet<String> = HashSet::new();
    let mut dir_paths: HashSet<String> = HashSet::new();

    'entries: for entry in entries {
        let relative = entry.relative_path.trim_matches('/').to_string();
        if relative.is_empty() || rules.is_excluded(&relative) {
            continue;
        }

        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file_name, dirs)) = segments.split_last() else {
            continue;
        };

        let mut prefixes = Vec::with_capacity(dirs.len());
        let mut prefix = String::new();
        for dir in dirs {
            prefix = join_path(&prefix, dir);
            if rules.is_dir_excluded(&prefix) {
                continue 'entries;
            }
            if files.contains(&prefix) {
                warn!(
                    "Skipping {}: ancestor {} is already a file",
                    relative, prefix
                );
                continue 'entries;
            }
            prefixes.push(prefix.clone());
        }

        let path = segments.join("/");
        if dir_paths.contains(&path) {
            warn!("Skipping {}: path is already a directory", path);
            continue;
        }
        if !files.insert(path.clone()) {
            warn!("Duplicate path in flat ingestion: {}", path);
            continue;
        }
        dir_paths.extend(prefixes);

        let mut cursor = &mut root;
        for dir in dirs {
            cursor = cursor.dirs.entry((*dir).to_string()).or_default();
        }
        cursor
            .files
            .push(DirectoryNode::file(*file_name, path, entry.content));
    }

    into_nodes(root, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentAccessor, walk};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn names(nodes: &[DirectoryNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    fn flat(paths: &[&str]) -> IngestionSource {
        IngestionSource::Flat(
            paths
                .iter()
                .map(|p| FlatEntry::new(*p, ContentAccessor::from_bytes(format!("// {}", p))))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_scan_local_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/util")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::write(root.join("src/b.ts"), "b").unwrap();
        std::fs::write(root.join("src/a.ts"), "a").unwrap();
        std::fs::write(root.join("src/util/fmt.ts"), "fmt").unwrap();
        std::fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        std::fs::write(root.join("README.md"), "# hi").unwrap();
        std::fs::write(root.join(".env"), "SECRET=1").unwrap();

        let nodes = DirectoryScanner::default()
            .scan(IngestionSource::local(root))
            .await
            .unwrap();

        assert_eq!(names(&nodes), vec!["src", "README.md"]);
        let src = &nodes[0];
        assert_eq!(names(&src.children), vec!["util", "a.ts", "b.ts"]);
        assert_eq!(src.children[0].children[0].path, "src/util/fmt.ts");
    }

    #[tokio::test]
    async fn test_root_gitignore_applies_to_directory_scan() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join(".gitignore"), "*.tmp\n# comment\n").unwrap();
        std::fs::write(root.join("keep.ts"), "k").unwrap();
        std::fs::write(root.join("drop.tmp"), "d").unwrap();

        let nodes = DirectoryScanner::default()
            .scan(IngestionSource::local(root))
            .await
            .unwrap();
        assert_eq!(names(&nodes), vec![".gitignore", "keep.ts"]);

        let nodes = DirectoryScanner::default()
            .with_gitignore(false)
            .scan(IngestionSource::local(root))
            .await
            .unwrap();
        assert_eq!(names(&nodes), vec![".gitignore", "drop.tmp", "keep.ts"]);
    }

    #[tokio::test]
    async fn test_scan_flat_builds_sorted_tree() {
        let nodes = DirectoryScanner::default()
            .scan(flat(&[
                "proj/src/z.ts",
                "proj/README.md",
                "proj/src/a.ts",
                "proj/lib/x.ts",
                "proj/node_modules/dep/index.js",
                "proj/yarn-error.log",
            ]))
            .await
            .unwrap();

        assert_eq!(names(&nodes), vec!["proj"]);
        let proj = &nodes[0];
        assert_eq!(names(&proj.children), vec!["lib", "src", "README.md"]);
        assert_eq!(names(&proj.children[1].children), vec!["a.ts", "z.ts"]);
        assert_eq!(proj.children[1].children[0].path, "proj/src/a.ts");
    }

    #[tokio::test]
    async fn test_scan_flat_uses_gitignore() {
        let mut entries = vec![FlatEntry::new(
            "proj/.gitignore",
            ContentAccessor::from_bytes("secret*\n"),
        )];
        entries.push(FlatEntry::new("proj/secret.txt", ContentAccessor::from_bytes("s")));
        entries.push(FlatEntry::new("proj/main.rs", ContentAccessor::from_bytes("m")));

        let nodes = DirectoryScanner::default()
            .scan(IngestionSource::Flat(entries))
            .await
            .unwrap();
        let files = crate::types::all_files(&nodes);
        assert_eq!(files, vec!["proj/.gitignore", "proj/main.rs"]);
    }

    #[tokio::test]
    async fn test_scan_flat_file_and_directory_never_share_a_path() {
        let nodes = DirectoryScanner::default()
            .scan(flat(&["a", "a/b.ts", "c/d.ts", "c", "c/d.ts"]))
            .await
            .unwrap();

        let mut paths = Vec::new();
        walk(&nodes, &mut |node| paths.push((node.path.clone(), node.is_dir())));
        assert_eq!(
            paths,
            vec![
                ("c".to_string(), true),
                ("c/d.ts".to_string(), false),
                ("a".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_scan_failed() {
        struct Broken;

        #[async_trait::async_trait]
        impl DirectoryHandle for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            async fn entries(&self) -> Result<Vec<DirectoryEntry>> {
                Err(DocError::Io(std::io::Error::other("denied")))
            }
        }

        let result = DirectoryScanner::default()
            .scan(IngestionSource::Directory(Box::new(Broken)))
            .await;
        assert!(matches!(result, Err(DocError::IngestionFailed(_))));
    }

    proptest! {
        #[test]
        fn prop_no_scanned_path_matches_exclusions(
            paths in proptest::collection::vec(
                proptest::collection::vec(
                    prop_oneof![
                        Just("src".to_string()),
                        Just("node_modules".to_string()),
                        Just("build".to_string()),
                        Just(".env".to_string()),
                        Just("app.ts".to_string()),
                        Just("logo.ico".to_string()),
                        "[a-z]{1,6}",
                    ],
                    1..4,
                ),
                0..20,
            )
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let source = IngestionSource::Flat(
                paths
                    .iter()
                    .map(|segs| FlatEntry::new(segs.join("/"), ContentAccessor::from_bytes("")))
                    .collect(),
            );
            let rules = ExclusionRules::builtin();
            let nodes = rt.block_on(DirectoryScanner::new(rules.clone()).scan(source)).unwrap();

            let mut violations = Vec::new();
            let mut seen = HashSet::new();
            let mut duplicates = Vec::new();
            walk(&nodes, &mut |node| {
                if !seen.insert(node.path.clone()) {
                    duplicates.push(node.path.clone());
                }
                let excluded = if node.is_dir() {
                    rules.is_dir_excluded(&node.path)
                } else {
                    rules.is_excluded(&node.path)
                };
                if excluded {
                    violations.push(node.path.clone());
                }
            });
            prop_assert!(violations.is_empty(), "excluded nodes kept: {:?}", violations);
            prop_assert!(duplicates.is_empty(), "duplicate paths: {:?}", duplicates);
        }
    }
}
