//! Dotted key paths (`a.b.c`).
//!
//! Keys are unique across the whole forest, so a lookup only needs the final
//! segment of a path. Paths are written by producers for readability but are
//! never routed through on reads.

use crate::domain::error::{TreeError, TreeResult};

pub const SEPARATOR: char = '.';
pub const WILDCARD: char = '*';

/// Final addressable segment of a path. A plain key is returned unchanged.
pub fn end_key(path: &str) -> &str {
    path.split(SEPARATOR)
        .map(|s| s.trim_matches(WILDCARD))
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or(path)
}

/// Keys must be non-empty and must not contain path or ingestion syntax.
pub fn validate_key(key: &str) -> TreeResult<()> {
    let forbidden = |c: char| c == SEPARATOR || c == WILDCARD || c == '=' || c == '"';
    if key.is_empty() || key.chars().any(|c| c.is_whitespace() || forbidden(c)) {
        return Err(TreeError::InvalidKey(key.to_string()));
    }
    Ok(())
}
