//! Text helpers for query preparation and display.

use regex::Regex;
use std::sync::OnceLock;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("static regex is valid"))
}

/// Collapse runs of whitespace to a single space and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    whitespace_re().replace_all(s, " ").trim().to_string()
}

/// Keep the first `max_chars` characters of `s`, appending `"..."` when anything was cut.
///
/// Counts Unicode scalar values, not bytes, so multi-byte text is never split.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((byte_offset, _)) => format!("{}...", &s[..byte_offset]),
    }
}

/// Escape Lucene special characters for safe use in Neo4j full-text index queries.
///
/// Escapes: `+ - ! ( ) { } [ ] ^ " ~ * ? : \ /` and the two-char operators `&&` and `||`.
pub fn lucene_sanitize(s: &str) -> String {
    const SPECIAL: &[char] = &[
        '+', '-', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '/',
    ];

    let mut result = String::with_capacity(s.len() * 2);
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if (c == '&' || c == '|') && chars.peek() == Some(&c) {
            chars.next();
            result.push('\\');
            result.push(c);
            result.push(c);
            continue;
        }
        if SPECIAL.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Lucene reads these bare uppercase words as boolean operators.
const BOOLEAN_KEYWORDS: &[&str] = &["AND", "OR", "NOT"];

/// Turn free user text into a full-text query string: whitespace collapsed, operators escaped.
///
/// Standalone `AND`/`OR`/`NOT` are lowercased so they match as ordinary terms.
pub fn fulltext_query(s: &str) -> String {
    let words: Vec<String> = normalize_whitespace(s)
        .split(' ')
        .map(|word| {
            if BOOLEAN_KEYWORDS.contains(&word) {
                word.to_lowercase()
            } else {
                word.to_string()
            }
        })
        .collect();
    lucene_sanitize(&words.join(" "))
}
