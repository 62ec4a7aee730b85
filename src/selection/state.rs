//! Tri-State Selection
//!
//! Folder selection is never stored: a directory's state is derived from its
//! descendant files. [`annotate`] computes every node's state in one
//! bottom-up pass; [`apply_toggle`] is the pure transition over a
//! [`SelectionSet`].

use serde::Serialize;
use std::collections::HashMap;

use super::set::SelectionSet;
use crate::types::DirectoryNode;

/// Derived per-node selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    Checked,
    Indeterminate,
    Unchecked,
}

impl SelectionState {
    pub fn is_checked(self) -> bool {
        self == Self::Checked
    }

    pub fn is_indeterminate(self) -> bool {
        self == Self::Indeterminate
    }

    /// Checkbox glyph for console output
    pub fn marker(self) -> &'static str {
        match self {
            Self::Checked => "[x]",
            Self::Indeterminate => "[-]",
            Self::Unchecked => "[ ]",
        }
    }
}

/// A selection change request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub path: String,
    pub checked: bool,
    pub is_folder: bool,
    /// Descendant file paths; only read for folders
    pub affected: Vec<String>,
}

impl Toggle {
    pub fn file(path: impl Into<String>, checked: bool) -> Self {
        Self {
            path: path.into(),
            checked,
            is_folder: false,
            affected: Vec::new(),
        }
    }

    /// Toggle for a tree node, collecting descendant files for directories
    pub fn for_node(node: &DirectoryNode, checked: bool) -> Self {
        if node.is_dir() {
            Self {
                path: node.path.clone(),
                checked,
                is_folder: true,
                affected: node.descendant_files(),
            }
        } else {
            Self::file(node.path.clone(), checked)
        }
    }
}

/// Next selection after a toggle
pub fn apply_toggle(current: &SelectionSet, toggle: &Toggle) -> SelectionSet {
    let mut next = current.clone();
    match (toggle.is_folder, toggle.checked) {
        (true, true) => {
            for path in &toggle.affected {
                next.insert(path.clone());
            }
        }
        (true, false) => next.remove_all(toggle.affected.iter().map(String::as_str)),
        (false, true) => {
            next.insert(toggle.path.clone());
        }
        (false, false) => {
            next.remove(&toggle.path);
        }
    }
    next
}

/// State of a single node against a selection
pub fn node_state(node: &DirectoryNode, selected: &SelectionSet) -> SelectionState {
    fold(node, selected, &mut |_, _| {}).state()
}

/// Selection state for every node in a forest, keyed by path
pub fn annotate(nodes: &[DirectoryNode], selected: &SelectionSet) -> HashMap<String, SelectionState> {
    let mut states = HashMap::new();
    for node in nodes {
        fold(node, selected, &mut |path, state| {
            states.insert(path.to_string(), state);
        });
    }
    states
}

/// Descendant-file tally for one subtree
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    files: usize,
    selected: usize,
}

impl Tally {
    fn state(self) -> SelectionState {
        if self.files == 0 || self.selected == 0 {
            SelectionState::Unchecked
        } else if self.selected == self.files {
            SelectionState::Checked
        } else {
            SelectionState::Indeterminate
        }
    }
}

fn fold(
    node: &DirectoryNode,
    selected: &SelectionSet,
    emit: &mut impl FnMut(&str, SelectionState),
) -> Tally {
    let tally = if node.is_file() {
        Tally {
            files: 1,
            selected: usize::from(selected.contains(&node.path)),
        }
    } else {
        node.children.iter().fold(Tally::default(), |acc, child| {
            let sub = fold(child, selected, emit);
            Tally {
                files: acc.files + sub.files,
                selected: acc.selected + sub.selected,
            }
        })
    };
    emit(&node.path, tally.state());
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentAccessor, find_node, walk};
    use proptest::prelude::*;

    fn file(path: &str) -> DirectoryNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        DirectoryNode::file(name, path, ContentAccessor::from_bytes(""))
    }

    fn tree() -> Vec<DirectoryNode> {
        vec![DirectoryNode::directory(
            "src",
            "src",
            vec![
                DirectoryNode::directory(
                    "lib",
                    "src/lib",
                    vec![file("src/lib/a.ts"), file("src/lib/b.ts"), file("src/lib/c.ts")],
                ),
                DirectoryNode::directory("empty", "src/empty", vec![]),
                file("src/main.ts"),
            ],
        )]
    }

    #[test]
    fn test_file_state() {
        let nodes = tree();
        let selected: SelectionSet = ["src/main.ts"].into_iter().collect();
        let main = find_node(&nodes, "src/main.ts").unwrap();
        assert_eq!(node_state(main, &selected), SelectionState::Checked);
        let a = find_node(&nodes, "src/lib/a.ts").unwrap();
        assert_eq!(node_state(a, &selected), SelectionState::Unchecked);
    }

    #[test]
    fn test_directory_states() {
        let nodes = tree();
        let selected: SelectionSet = ["src/lib/a.ts"].into_iter().collect();
        let states = annotate(&nodes, &selected);
        assert_eq!(states["src"], SelectionState::Indeterminate);
        assert_eq!(states["src/lib"], SelectionState::Indeterminate);
        assert_eq!(states["src/empty"], SelectionState::Unchecked);

        let all: SelectionSet = nodes[0].descendant_files().into_iter().collect();
        let states = annotate(&nodes, &all);
        assert_eq!(states["src"], SelectionState::Checked);
        // no descendant files is never checked
        assert_eq!(states["src/empty"], SelectionState::Unchecked);
    }

    #[test]
    fn test_folder_toggle_closure() {
        let nodes = tree();
        let lib = find_node(&nodes, "src/lib").unwrap();
        let initial: SelectionSet = ["src/main.ts"].into_iter().collect();

        let on = apply_toggle(&initial, &Toggle::for_node(lib, true));
        for path in ["src/lib/a.ts", "src/lib/b.ts", "src/lib/c.ts", "src/main.ts"] {
            assert!(on.contains(path));
        }

        let off = apply_toggle(&on, &Toggle::for_node(lib, false));
        assert_eq!(off, initial);
    }

    #[test]
    fn test_file_toggle() {
        let selected = apply_toggle(&SelectionSet::new(), &Toggle::file("x.ts", true));
        assert!(selected.contains("x.ts"));
        let selected = apply_toggle(&selected, &Toggle::file("x.ts", false));
        assert!(selected.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Shape {
        File,
        Dir(Vec<Shape>),
    }

    /// Random forests with nested and empty directories
    fn forest() -> impl Strategy<Value = Vec<Shape>> {
        let leaf = prop_oneof![Just(Shape::File), Just(Shape::Dir(Vec::new()))];
        let node = leaf.prop_recursive(4, 48, 5, |inner| {
            prop_oneof![
                Just(Shape::File),
                proptest::collection::vec(inner, 0..5).prop_map(Shape::Dir),
            ]
        });
        proptest::collection::vec(node, 1..5)
    }

    fn build(shapes: &[Shape], parent: &str) -> Vec<DirectoryNode> {
        shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                let name = match shape {
                    Shape::File => format!("f{}.ts", i),
                    Shape::Dir(_) => format!("d{}", i),
                };
                let path = if parent.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", parent, name)
                };
                match shape {
                    Shape::File => DirectoryNode::file(name, path, ContentAccessor::from_bytes("")),
                    Shape::Dir(children) => {
                        let children = build(children, &path);
                        DirectoryNode::directory(name, path, children)
                    }
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_tri_state_invariant(
            shapes in forest(),
            mask in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let nodes = build(&shapes, "");
            let files = crate::types::all_files(&nodes);
            let selected: SelectionSet = files
                .iter()
                .enumerate()
                .filter(|(i, _)| mask.get(*i).copied().unwrap_or(false))
                .map(|(_, p)| p.clone())
                .collect();
            let states = annotate(&nodes, &selected);

            let mut dirs = Vec::new();
            walk(&nodes, &mut |n| if n.is_dir() { dirs.push(n) });
            for dir in dirs {
                let desc = dir.descendant_files();
                let all = !desc.is_empty() && desc.iter().all(|p| selected.contains(p));
                let any = desc.iter().any(|p| selected.contains(p));
                let state = states[&dir.path];
                prop_assert_eq!(state.is_checked(), all);
                prop_assert_eq!(state.is_indeterminate(), any && !all);
                prop_assert_eq!(node_state(dir, &selected), state);
            }
        }

        #[test]
        fn prop_folder_toggle_adds_and_removes_exactly_descendants(
            shapes in forest(),
            mask in proptest::collection::vec(any::<bool>(), 0..64),
            pick in any::<proptest::sample::Index>(),
        ) {
            let nodes = build(&shapes, "");
            let mut dirs = Vec::new();
            walk(&nodes, &mut |n| if n.is_dir() { dirs.push(n) });
            prop_assume!(!dirs.is_empty());
            let dir = dirs[pick.index(dirs.len())];

            let files = crate::types::all_files(&nodes);
            let initial: SelectionSet = files
                .iter()
                .enumerate()
                .filter(|(i, _)| mask.get(*i).copied().unwrap_or(false))
                .map(|(_, p)| p.clone())
                .collect();
            let desc = dir.descendant_files();

            let on = apply_toggle(&initial, &Toggle::for_node(dir, true));
            prop_assert!(desc.iter().all(|p| on.contains(p)));
            prop_assert!(initial.iter().all(|p| on.contains(p)));

            let off = apply_toggle(&on, &Toggle::for_node(dir, false));
            prop_assert!(desc.iter().all(|p| !off.contains(p)));
            for path in initial.iter().filter(|p| !desc.iter().any(|d| d.as_str() == *p)) {
                prop_assert!(off.contains(path));
            }
        }
    }
}
