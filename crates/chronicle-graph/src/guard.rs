//! Lexical read-only check for user-supplied Cypher.
//!
//! The guard rejects any query containing a mutating keyword as a whole
//! word, case-insensitively, anywhere in the text. It never parses the
//! query, so keywords inside string literals or property names reject too.
//!
//! This is a filter, not a security boundary. Keyword synonyms, procedure
//! invocations that avoid `CALL`, and other constructs missing from
//! [`FORBIDDEN`] pass through. Deployments that need a hard guarantee must
//! also run explored queries under a read-only database credential.

use once_cell::sync::Lazy;
use regex::Regex;

/// Mutating keywords. Multi-word entries match across any whitespace run.
pub const FORBIDDEN: &[&str] = &[
    "CREATE", "MERGE", "DELETE", "SET", "REMOVE", "DROP", "CALL", "LOAD CSV", "UNWIND",
];

static FORBIDDEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = FORBIDDEN
        .iter()
        .map(|keyword| keyword.split_whitespace().collect::<Vec<_>>().join(r"\s+"))
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("forbidden keyword pattern is a valid regex")
});

/// `true` when the query contains none of the [`FORBIDDEN`] keywords.
pub fn is_safe(query: &str) -> bool {
    !FORBIDDEN_PATTERN.is_match(query)
}

/// The first forbidden keyword in `query`, uppercased, with internal
/// whitespace collapsed (`load\n csv` → `LOAD CSV`).
pub fn forbidden_keyword(query: &str) -> Option<String> {
    FORBIDDEN_PATTERN.find(query).map(|m| {
        m.as_str()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    })
}
