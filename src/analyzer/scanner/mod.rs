pub mod directory_scanner;
pub mod exclusion;
pub mod source;

pub use directory_scanner::DirectoryScanner;
pub use exclusion::{ExclusionRules, parse_gitignore};
pub use source::{
    DirectoryEntry, DirectoryHandle, DirectoryPicker, FlatEntry, IngestionSource, LocalDirectory,
    PathPicker,
};
