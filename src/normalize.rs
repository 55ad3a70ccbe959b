//! Deterministic cleanup of source and diff text before embedding.
//!
//! The transform is intentionally lossy: punctuation, digits, markup, and
//! bracketed asides carry little signal for similarity search, so they are
//! stripped and the remaining words are rejoined with single spaces. The
//! stored copy produced here is used only for embedding; retrieval always
//! re-reads the original file from disk.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:http|ftp)s?://\S+").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Canonicalize arbitrary text into a lowercase stream of words separated by
/// single spaces.
///
/// Pure and deterministic: identical input yields identical output across
/// runs, and applying it twice changes nothing beyond the first pass.
pub fn normalize(raw: &str) -> String {
    let text = WHITESPACE.replace_all(raw, " ");
    let text = MARKUP.replace_all(&text, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = PARENTHETICAL.replace_all(&text, "");
    let text = URL.replace_all(&text, "");
    let text = NON_WORD.replace_all(&text, " ");
    let text = DIGITS.replace_all(&text, "");
    let text = text.to_lowercase();

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hard prefix cut at `budget` characters, respecting embedding-provider
/// input limits. No semantic boundary awareness.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    text.chars().take(budget).collect()
}
