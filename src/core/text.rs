//! Text helpers shared by the debate pipeline
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RUNS: OnceLock<Regex> = OnceLock::new();

fn whitespace_runs() -> &'static Regex {
    WHITESPACE_RUNS.get_or_init(|| Regex::new(r"\s+").expect("invalid whitespace regex"))
}

/// Normalize free-form user input (topics, descriptions)
///
/// Trims the ends and collapses every whitespace run (newlines, tabs,
/// repeated spaces) into a single space.
pub fn normalize_input(text: &str, lower_case: bool) -> String {
    let trimmed = text.trim();
    let collapsed = whitespace_runs().replace_all(trimmed, " ").into_owned();
    if lower_case {
        collapsed.to_lowercase()
    } else {
        collapsed
    }
}

/// First `max_chars` characters of `text` for log lines (UTF-8 safe)
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
