//! Scan Command
//!
//! Prints the filtered tree of a folder, optionally with the tri-state
//! selection markers of a `--select` set.

use std::collections::HashMap;

use super::{TargetArgs, open_offline};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::selection::SelectionState;
use crate::types::{DirectoryNode, Result, all_files};

pub fn run(ctx: &CommandContext, target: TargetArgs, format: &str) -> Result<()> {
    let out = Output::new();
    let rt = runtime()?;
    let Some(session) = rt.block_on(open_offline(ctx, &target, None, &out))? else {
        return Ok(());
    };

    let tree = session.tree();
    let states = target.has_selection().then(|| session.selection_states());

    if format == "json" {
        let json = serde_json::json!({
            "tree": &*tree,
            "selected": &*session.selection(),
            "states": states,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", render_tree(&tree, states.as_ref()));
        out.info(&format!(
            "{} file(s), {} selected",
            all_files(&tree).len(),
            session.selection().len()
        ));
    }
    Ok(())
}

/// Indented tree; directories end with `/`, markers when states are given
pub fn render_tree(nodes: &[DirectoryNode], states: Option<&HashMap<String, SelectionState>>) -> String {
    let mut text = String::new();
    push_nodes(nodes, states, 0, &mut text);
    text
}

fn push_nodes(
    nodes: &[DirectoryNode],
    states: Option<&HashMap<String, SelectionState>>,
    depth: usize,
    text: &mut String,
) {
    for node in nodes {
        text.push_str(&"  ".repeat(depth));
        if let Some(states) = states {
            let state = states
                .get(&node.path)
                .copied()
                .unwrap_or(SelectionState::Unchecked);
            text.push_str(state.marker());
            text.push(' ');
        }
        text.push_str(&node.name);
        if node.is_dir() {
            text.push('/');
        }
        text.push('\n');
        push_nodes(&node.children, states, depth + 1, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{SelectionSet, annotate};
    use crate::types::ContentAccessor;

    fn tree() -> Vec<DirectoryNode> {
        let file = |name: &str, path: &str| DirectoryNode::file(name, path, ContentAccessor::from_bytes(""));
        vec![
            DirectoryNode::directory(
                "src",
                "src",
                vec![file("a.ts", "src/a.ts"), file("b.ts", "src/b.ts")],
            ),
            file("README.md", "README.md"),
        ]
    }

    #[test]
    fn test_render_plain_tree() {
        assert_eq!(
            render_tree(&tree(), None),
            "src/\n  a.ts\n  b.ts\nREADME.md\n"
        );
    }

    #[test]
    fn test_render_with_markers() {
        let tree = tree();
        let selected: SelectionSet = ["src/a.ts"].into_iter().collect();
        let states = annotate(&tree, &selected);
        assert_eq!(
            render_tree(&tree, Some(&states)),
            "[-] src/\n  [x] a.ts\n  [ ] b.ts\n[ ] README.md\n"
        );
    }
}
