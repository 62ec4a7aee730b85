//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Directory scanning constants
pub mod scan {
    /// Built-in exclusion patterns (regular expressions searched anywhere in the path).
    ///
    /// Matched against a node's relative path; directories are also matched
    /// with a trailing `/` so directory patterns prune the whole subtree.
    pub const BUILTIN_EXCLUDES: &[&str] = &[
        // Version control and tool metadata
        r"(^|/)\.git/",
        r"\.DS_Store",
        r"\.pnp\.",
        r"(^|/)\.yarn/",
        r"(^|/)\.vercel/",
        // Dependencies and build output
        r"(^|/)node_modules/",
        r"(^|/)\.next/",
        r"(^|/)coverage/",
        r"(^|/)out/",
        r"(^|/)build/",
        r"(^|/)target/",
        r"\.tsbuildinfo$",
        r"next-env\.d\.ts$",
        // Lockfiles and logs
        r"package-lock\.json$",
        r"yarn\.lock$",
        r"pnpm-lock\.yaml$",
        r"Cargo\.lock$",
        r"npm-debug\.log",
        r"yarn-debug\.log",
        r"yarn-error\.log",
        // Environment files
        r"(^|/)\.env",
        // Icons and fonts
        r"\.ico$",
        r"\.(woff|woff2|ttf|eot|otf)$",
    ];

    /// Name of the ignore file read from the ingestion source
    pub const GITIGNORE_FILE: &str = ".gitignore";
}

/// Event stream constants
pub mod stream {
    /// Coalescing delay for content updates (milliseconds)
    pub const DEBOUNCE_MS: u64 = 100;

    /// Record prefix of every event line
    pub const DATA_PREFIX: &str = "data:";

    /// Legacy end-of-stream sentinel, skipped if present
    pub const DONE_SENTINEL: &str = "[DONE]";
}

/// Multi-file bundle constants
pub mod bundle {
    /// Opening marker prefix (`=== FILE: <path> ===`)
    pub const FILE_MARKER_PREFIX: &str = "=== FILE: ";

    /// Opening marker suffix
    pub const FILE_MARKER_SUFFIX: &str = " ===";

    /// Closing marker
    pub const END_MARKER: &str = "=== END FILE ===";

    /// Escape prefix for content lines that look like markers
    pub const MARKER_ESCAPE: char = '\\';

    /// Unit id of the combined README unit
    pub const COMBINED_UNIT_ID: &str = "combined";
}

/// Preview export constants
pub mod preview {
    /// Characters shown by `content_preview`
    pub const CONTENT_PREVIEW_CHARS: usize = 150;

    pub const STRUCTURE_HEADER: &str = "---- PROJECT FILE STRUCTURE (SELECTED ONLY) ----";
    pub const SELECTED_HEADER: &str = "---- SELECTED FILES ----";
    pub const CONTENTS_HEADER: &str = "---- BEGIN FILE CONTENTS ----";
    pub const MISSING_CONTENT: &str = "(No content found)";
}

/// Model defaults
pub mod models {
    /// Default model selection
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

    /// Higher capability model
    pub const PREMIUM_MODEL: &str = "gpt-4o-2024-11-20";

    /// Context window used when a model is not listed
    pub const FALLBACK_MAX_TOKENS: usize = 4096;
}

/// HTTP/Network constants
pub mod network {
    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;

    /// Default OpenAI-compatible API base
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

    /// Default remote generation route
    pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/openai";
}
