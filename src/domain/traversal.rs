//! Iterative preorder depth-first search.
//!
//! Every read and write on the forest is routed through [`Forest::traverse`].
//! The walk keeps an explicit LIFO worklist instead of recursing, so stack usage
//! does not depend on tree depth.

use generational_arena::Index;
use tracing::{instrument, trace, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::forest::Forest;
use crate::domain::key_path;

/// Initial worklist capacity.
const WORKLIST_RESERVE: usize = 10;

/// What a traversal records and when it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Stop at the first node whose key matches; record nothing but the target.
    Single,
    /// Stop at the first match; record every node visited on the way, in
    /// visitation order, ending with the target when found.
    PathToTarget,
    /// Ignore the key and record the whole subtree, start node included.
    WholeSubtree,
}

/// Outcome of one traversal. Request-scoped: never keep it across a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    target: Option<Index>,
    nodes: Vec<Index>,
}

impl SearchResult {
    /// Matched node, if any. Always `None` for [`SearchMode::WholeSubtree`].
    pub fn target(&self) -> Option<Index> {
        self.target
    }

    /// Recorded node sequence. Empty for [`SearchMode::Single`].
    pub fn nodes(&self) -> &[Index] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Index> {
        self.nodes
    }

    pub fn found(&self) -> bool {
        self.target.is_some()
    }
}

impl Forest {
    /// Walk the subtree under `start` in preorder, children in ascending key order.
    ///
    /// Fails with [`TreeError::NullRoot`] if `start` is not a live node and with
    /// [`TreeError::AllocationFailure`] if the worklist or the result cannot grow.
    #[instrument(level = "trace", skip(self))]
    pub fn traverse(
        &self,
        start: Index,
        target_key: &str,
        mode: SearchMode,
    ) -> TreeResult<SearchResult> {
        if !self.arena.contains(start) {
            return Err(TreeError::NullRoot);
        }

        let mut result = SearchResult::default();
        let mut stack: Vec<Index> = Vec::new();
        stack.try_reserve(WORKLIST_RESERVE)?;
        stack.push(start);

        while let Some(idx) = stack.pop() {
            let Some(node) = self.arena.get(idx) else {
                warn!(?idx, "skipping dangling child index");
                continue;
            };

            if mode != SearchMode::Single {
                result.nodes.try_reserve(1)?;
                result.nodes.push(idx);
            }

            if mode != SearchMode::WholeSubtree && node.key == target_key {
                result.target = Some(idx);
                break;
            }

            // Reversed so the smallest key is popped first
            stack.try_reserve(node.children.len())?;
            stack.extend(node.children.iter().rev().copied());
        }

        trace!(
            ?mode,
            visited = result.nodes.len(),
            found = result.target.is_some(),
            "traversal complete"
        );
        Ok(result)
    }

    /// Traverse from the forest root. A dotted path is reduced to its final segment.
    pub fn search(&self, key_or_path: &str, mode: SearchMode) -> TreeResult<SearchResult> {
        self.traverse(self.root, key_path::end_key(key_or_path), mode)
    }

    /// Single-mode lookup from the root.
    pub fn find(&self, key_or_path: &str) -> TreeResult<Option<Index>> {
        Ok(self.search(key_or_path, SearchMode::Single)?.target())
    }

    /// Single-mode lookup that treats absence as [`TreeError::NoSuchTarget`].
    pub(crate) fn require(&self, key_or_path: &str) -> TreeResult<Index> {
        self.find(key_or_path)?
            .ok_or_else(|| TreeError::NoSuchTarget(key_or_path.to_string()))
    }

    /// Whole-subtree walk starting at the node addressed by `key_or_path`.
    pub fn subtree(&self, key_or_path: &str) -> TreeResult<SearchResult> {
        let start = self.require(key_or_path)?;
        self.traverse(start, "", SearchMode::WholeSubtree)
    }

    /// Keys of the given indices, for logging and assertions.
    pub fn keys_of<'a>(&'a self, nodes: &[Index]) -> Vec<&'a str> {
        nodes
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|node| node.key.as_str())
            .collect()
    }
}
