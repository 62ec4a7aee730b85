//! Token Estimation
//!
//! Heuristic prompt-size estimate used for previews and completion limits.
//! Counts words, punctuation and digit runs, scaled by 1.3. Results are
//! memoized per (leading 100 chars, length).

use regex::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};
use tracing::debug;

use crate::constants::models::FALLBACK_MAX_TOKENS;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.,!?;:'"()\[\]{}]"#).expect("valid punctuation regex"));

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// Per-model context window
const MODEL_CONTEXT_LIMITS: &[(&str, usize)] = &[
    ("gpt-4o-2024-11-20", 128_000),
    ("gpt-4o-mini", 32_000),
    ("gpt-4", 8_192),
    ("gpt-3.5-turbo", 4_096),
];

/// Overhead per chat message
const TOKENS_PER_MESSAGE: usize = 4;
/// Reply priming overhead
const TOKENS_PRIMING: usize = 2;

const CACHE_KEY_CHARS: usize = 100;

/// A chat message as sent to the completion endpoint
#[derive(Debug, Clone)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Memoizing token counter
#[derive(Debug, Default)]
pub struct TokenCounter {
    cache: RwLock<HashMap<(String, usize), usize>>,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimated token count for text
    pub fn count(&self, text: &str) -> usize {
        let key = (text.chars().take(CACHE_KEY_CHARS).collect::<String>(), text.len());

        if let Some(&count) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return count;
        }

        let count = estimate_tokens(text);
        self.cache
            .write()
            .unwrap_or_else(|poisoned| {
                tracing::error!("Token cache RwLock poisoned, recovering");
                poisoned.into_inner()
            })
            .insert(key, count);
        count
    }

    /// Remaining completion budget for a model after the prompt messages
    pub fn max_completion_tokens(&self, model: &str, messages: &[ChatMessage<'_>]) -> usize {
        let limit = context_limit(model);
        let used: usize = messages
            .iter()
            .map(|m| estimate_tokens(m.content) + TOKENS_PER_MESSAGE)
            .sum::<usize>()
            + TOKENS_PRIMING;
        debug!("Prompt uses ~{} of {} tokens for {}", used, limit, model);
        limit.saturating_sub(used)
    }
}

/// Context window for a model id, falling back for unknown models
pub fn context_limit(model: &str) -> usize {
    MODEL_CONTEXT_LIMITS
        .iter()
        .find(|(id, _)| *id == model)
        .map(|(_, limit)| *limit)
        .unwrap_or(FALLBACK_MAX_TOKENS)
}

/// Uncached heuristic
pub fn estimate_tokens(text: &str) -> usize {
    // An empty or blank text still counts as one word.
    let words = text.split_whitespace().count().max(1);
    let punctuation = PUNCTUATION.find_iter(text).count();
    let digits = DIGIT_RUN.find_iter(text).count();
    ((words + punctuation + digits) as f64 * 1.3).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        // 2 words + 1 punctuation => ceil(3 * 1.3) = 4
        assert_eq!(estimate_tokens("hello world."), 4);
        // 4 words + 2 digit runs => ceil(6 * 1.3) = 8
        assert_eq!(estimate_tokens("port 8080 or 443"), 8);
        assert_eq!(estimate_tokens(""), 2);
    }

    #[test]
    fn test_count_is_memoized() {
        let counter = TokenCounter::new();
        let first = counter.count("fn main() {}");
        assert_eq!(counter.count("fn main() {}"), first);
        assert_eq!(counter.cache.read().unwrap().len(), 1);
    }

    #[test]
    fn test_max_completion_tokens() {
        let counter = TokenCounter::new();
        let messages = [ChatMessage {
            role: "user",
            content: "hello world.",
        }];
        // 4 tokens + 4 per message + 2 priming
        assert_eq!(counter.max_completion_tokens("gpt-4", &messages), 8_192 - 10);
        assert_eq!(
            counter.max_completion_tokens("unknown-model", &messages),
            FALLBACK_MAX_TOKENS - 10
        );
    }

    #[test]
    fn test_max_completion_tokens_floors_at_zero() {
        let counter = TokenCounter::new();
        let huge = "word ".repeat(10_000);
        let messages = [ChatMessage {
            role: "user",
            content: &huge,
        }];
        assert_eq!(counter.max_completion_tokens("gpt-3.5-turbo", &messages), 0);
    }
}
