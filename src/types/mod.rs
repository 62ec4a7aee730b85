pub mod error;
pub mod node;
pub mod state;

pub use error::{DocError, ErrorKind, Result};
pub use node::{
    ContentAccessor, ContentSource, DirectoryNode, NodeKind, all_files, find_node, sort_nodes,
    walk,
};
pub use state::StateCell;
