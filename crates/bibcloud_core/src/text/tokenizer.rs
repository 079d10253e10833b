//! Word tokenizer and noise filter.
//!
//! # Invariants
//! - Tokens are lower-case runs of 3+ word characters (letters, digits,
//!   underscore, apostrophe, hyphen) on word boundaries.
//! - Purely numeric tokens and stopwords never survive.
//! - Output depends only on input text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[\w'-]{3,}\b").expect("valid word regex"));

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Nd}+$").expect("valid decimal regex"));

/// Connective and structural words common to research abstracts.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "using", "use", "research", "study",
    "method", "results", "analysis", "based", "data", "paper", "also", "can", "will", "these",
    "such", "which", "our", "their", "between", "than",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

/// `true` when every character is a decimal digit in any script (`2020`,
/// `١٢٣`). Fractions and other numeric symbols such as `½` do not count.
pub fn is_numeric_token(token: &str) -> bool {
    DECIMAL_RE.is_match(token)
}

/// Lower-cases `text` and returns every token that survives filtering.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|found| found.as_str())
        .filter(|token| !is_numeric_token(token) && !is_stopword(token))
        .map(str::to_string)
        .collect()
}
