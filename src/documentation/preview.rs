//! Selected-Files Export
//!
//! Plain-text bundle of the selection: the filtered structure, the path
//! list, then every file's content.

use crate::constants::preview::{
    CONTENT_PREVIEW_CHARS, CONTENTS_HEADER, MISSING_CONTENT, SELECTED_HEADER, STRUCTURE_HEADER,
};
use crate::selection::SelectionSet;
use crate::types::{DirectoryNode, DocError, Result};

use super::bundle::read_file;

/// Keep selected files and directories with at least one kept descendant
pub fn filter_structure(nodes: &[DirectoryNode], selected: &SelectionSet) -> Vec<DirectoryNode> {
    nodes
        .iter()
        .filter_map(|node| {
            if node.is_file() {
                selected.contains(&node.path).then(|| node.clone())
            } else {
                let children = filter_structure(&node.children, selected);
                (!children.is_empty()).then(|| DirectoryNode {
                    children,
                    ..node.clone()
                })
            }
        })
        .collect()
}

/// `[D] path` / `[F] path`, two spaces of indent per level
pub fn print_structure(nodes: &[DirectoryNode]) -> String {
    let mut lines = Vec::new();
    push_structure(nodes, 0, &mut lines);
    lines.join("\n")
}

fn push_structure(nodes: &[DirectoryNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        let tag = if node.is_dir() { "[D]" } else { "[F]" };
        lines.push(format!("{}{} {}", "  ".repeat(depth), tag, node.path));
        if node.is_dir() {
            push_structure(&node.children, depth + 1, lines);
        }
    }
}

/// Build the export text for a selection
pub async fn build_preview(tree: &[DirectoryNode], selected: &SelectionSet) -> Result<String> {
    if selected.is_empty() {
        return Err(DocError::NoSelection);
    }

    let mut blocks = Vec::with_capacity(selected.len());
    for path in selected.iter() {
        let text = match read_file(tree, path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("No content for {}: {}", path, e);
                MISSING_CONTENT.to_string()
            }
        };
        blocks.push(format!("FILE: {}\n{}\n", path, text));
    }

    let structure = print_structure(&filter_structure(tree, selected));
    let paths = selected.iter().collect::<Vec<_>>().join("\n");

    Ok(format!(
        "{}\n{}\n\n{}\n{}\n\n{}\n\n{}",
        STRUCTURE_HEADER,
        structure,
        SELECTED_HEADER,
        paths,
        CONTENTS_HEADER,
        blocks.join("\n----\n\n")
    ))
}

/// First `max` characters, with `...` when truncated
pub fn content_preview(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// [`content_preview`] at the default length
pub fn short_preview(content: &str) -> String {
    content_preview(content, CONTENT_PREVIEW_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentAccessor;

    fn tree() -> Vec<DirectoryNode> {
        vec![
            DirectoryNode::directory(
                "src",
                "src",
                vec![
                    DirectoryNode::directory(
                        "util",
                        "src/util",
                        vec![DirectoryNode::file(
                            "fmt.ts",
                            "src/util/fmt.ts",
                            ContentAccessor::from_bytes("fmt"),
                        )],
                    ),
                    DirectoryNode::file("a.ts", "src/a.ts", ContentAccessor::from_bytes("A")),
                ],
            ),
            DirectoryNode::file("README.md", "README.md", ContentAccessor::from_bytes("hi")),
        ]
    }

    #[test]
    fn test_filter_and_print_structure() {
        let selected: SelectionSet = ["src/a.ts"].into_iter().collect();
        let filtered = filter_structure(&tree(), &selected);
        assert_eq!(print_structure(&filtered), "[D] src\n  [F] src/a.ts");
    }

    #[tokio::test]
    async fn test_build_preview() {
        let selected: SelectionSet = ["src/a.ts", "missing.ts"].into_iter().collect();
        let preview = build_preview(&tree(), &selected).await.unwrap();
        assert_eq!(
            preview,
            "---- PROJECT FILE STRUCTURE (SELECTED ONLY) ----\n\
             [D] src\n  [F] src/a.ts\n\n\
             ---- SELECTED FILES ----\n\
             src/a.ts\nmissing.ts\n\n\
             ---- BEGIN FILE CONTENTS ----\n\n\
             FILE: src/a.ts\nA\n\n----\n\n\
             FILE: missing.ts\n(No content found)\n"
        );
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let result = build_preview(&tree(), &SelectionSet::new()).await;
        assert!(matches!(result, Err(DocError::NoSelection)));
    }

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("abcdef", 3), "abc...");
        assert_eq!(content_preview("abc", 3), "abc");
        assert_eq!(content_preview("ééé", 2), "éé...");
    }
}
