use regex::Regex;
use tracing::{debug, warn};

use crate::constants::scan::BUILTIN_EXCLUDES;
use crate::types::{DocError, Result};

/// Path filter built from the built-in exclusion list, extra configured
/// patterns, and a translated `.gitignore`.
///
/// Gitignore translation is a best-effort heuristic: no negation, no
/// directory-only anchors, no `**` semantics.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    patterns: Vec<Regex>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExclusionRules {
    /// Built-in rules only
    pub fn builtin() -> Self {
        let patterns = BUILTIN_EXCLUDES
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { patterns }
    }

    /// Rules with no patterns at all
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Add raw regex patterns (e.g. from configuration)
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let regex = Regex::new(pattern.as_ref()).map_err(|e| {
                DocError::Config(format!("Invalid exclude pattern '{}': {}", pattern.as_ref(), e))
            })?;
            self.patterns.push(regex);
        }
        Ok(self)
    }

    /// Union with patterns translated from `.gitignore` content
    pub fn with_gitignore(mut self, content: &str) -> Self {
        let translated = parse_gitignore(content);
        debug!("Loaded {} gitignore patterns", translated.len());
        self.patterns.extend(translated);
        self
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a relative file path is excluded
    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }

    /// Whether a relative directory path is excluded.
    ///
    /// Also tested with a trailing slash so `name/` patterns prune the directory itself.
    pub fn is_dir_excluded(&self, path: &str) -> bool {
        self.is_excluded(path) || self.is_excluded(&format!("{}/", path))
    }
}

/// Translate gitignore lines into regular expressions.
///
/// Comments and blank lines are dropped, literal dots escaped, `*` becomes
/// `.*` and `?` becomes `.`; lines not starting with `/` get an implicit
/// `.*` prefix.
pub fn parse_gitignore(content: &str) -> Vec<Regex> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let translated = translate_gitignore_line(line);
            match Regex::new(&translated) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!("Skipping gitignore pattern '{}': {}", line, e);
                    None
                }
            }
        })
        .collect()
}

fn translate_gitignore_line(line: &str) -> String {
    let pattern = line
        .replace('.', "\\.")
        .replace('*', ".*")
        .replace('?', ".");
    if pattern.starts_with('/') {
        pattern
    } else {
        format!(".*{}", pattern)
    }
}
