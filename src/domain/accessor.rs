//! Typed reads over single-mode lookups.
//!
//! Two flavours exist side by side. The sentinel accessors (`get_int`,
//! `get_string`, `get_value`) log a failure and return 0 / `None`, so a stored
//! 0 cannot be told apart from a missing key through the return value. The
//! `try_*` accessors report the failure as a [`TreeError`] instead.

use tracing::{debug, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::forest::Forest;
use crate::domain::key_path;
use crate::domain::node::{Node, NodeKind, Value};
use crate::domain::traversal::SearchMode;

/// Language searched when a translation is missing.
pub const DEFAULT_LANGUAGE: &str = "en";

impl Forest {
    pub fn get_type(&self, key_or_path: &str) -> TreeResult<NodeKind> {
        Ok(self.require_node(key_or_path)?.kind())
    }

    pub fn try_get_int(&self, key_or_path: &str) -> TreeResult<u64> {
        let node = self.require_kind(key_or_path, NodeKind::Integer)?;
        Ok(node.integer())
    }

    pub fn try_get_string(&self, key_or_path: &str) -> TreeResult<&str> {
        let node = self.require_kind(key_or_path, NodeKind::String)?;
        match &node.payload {
            Some(Value::Str(s)) => Ok(s.as_str()),
            _ => Err(TreeError::TypeMismatch {
                key: node.key.clone(),
                expected: NodeKind::String,
                found: node.kind(),
            }),
        }
    }

    /// Integer held by a leaf, or 0 if the key is missing or not integer-typed.
    pub fn get_int(&self, key_or_path: &str) -> u64 {
        self.try_get_int(key_or_path).unwrap_or_else(|e| {
            warn!(key = key_or_path, error = %e, "get int failed");
            0
        })
    }

    /// String held by a leaf, or `None` if the key is missing or not string-typed.
    pub fn get_string(&self, key_or_path: &str) -> Option<&str> {
        self.try_get_string(key_or_path)
            .map_err(|e| warn!(key = key_or_path, error = %e, "get string failed"))
            .ok()
    }

    /// Raw scalar of a leaf of either kind. Parents have no value.
    pub fn get_value(&self, key_or_path: &str) -> Option<&Value> {
        match self.require_node(key_or_path) {
            Ok(node) if node.is_leaf() => node.payload(),
            Ok(_) => None,
            Err(e) => {
                warn!(key = key_or_path, error = %e, "get value failed");
                None
            }
        }
    }

    /// Translation of `key` in `language`, falling back to [`DEFAULT_LANGUAGE`].
    pub fn get_text(&self, key: &str, language: &str) -> Option<&str> {
        self.get_text_with_fallback(key, language, DEFAULT_LANGUAGE)
    }

    /// Translation lookup in two levels.
    ///
    /// Translations are stored under composite keys (`no` + `greeting` is
    /// `nogreeting`) because keys are unique across the forest. The composite
    /// key is searched inside the `language` node; if it is absent or not a
    /// string, the bare key is searched inside the `fallback` node.
    pub fn get_text_with_fallback(&self, key: &str, language: &str, fallback: &str) -> Option<&str> {
        let key = key_path::end_key(key);
        let composite = format!("{}{}", language, key);
        if let Some(text) = self.string_within(language, &composite) {
            return Some(text);
        }

        debug!(key, language, fallback, "translation missing, using fallback language");
        let text = self.string_within(fallback, key);
        if text.is_none() {
            warn!(key, language, fallback, "get text failed");
        }
        text
    }

    /// String leaf `key` searched only inside the subtree of `scope`.
    fn string_within(&self, scope: &str, key: &str) -> Option<&str> {
        let scope_idx = self.find(scope).ok().flatten()?;
        let idx = self
            .traverse(scope_idx, key, SearchMode::Single)
            .ok()?
            .target()?;
        let node = self.arena.get(idx)?;
        match (&node.payload, node.kind()) {
            (Some(Value::Str(s)), NodeKind::String) => Some(s.as_str()),
            _ => None,
        }
    }

    fn require_node(&self, key_or_path: &str) -> TreeResult<&Node> {
        let idx = self.require(key_or_path)?;
        self.arena.get(idx).ok_or(TreeError::NullRoot)
    }

    fn require_kind(&self, key_or_path: &str, expected: NodeKind) -> TreeResult<&Node> {
        let node = self.require_node(key_or_path)?;
        match node.kind() {
            kind if kind == expected => Ok(node),
            NodeKind::Parent => Err(TreeError::WrongNodeKind {
                key: node.key.clone(),
                kind: NodeKind::Parent,
            }),
            found => Err(TreeError::TypeMismatch {
                key: node.key.clone(),
                expected,
                found,
            }),
        }
    }
}
