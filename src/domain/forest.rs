use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::node::Node;

/// Key of the distinguished forest root.
pub const ROOT_KEY: &str = "root";

/// Arena-backed key-value tree with a permanent root.
///
/// Node storage lives in a generational arena, so an index taken from a search
/// result and kept across a mutation resolves to `None` instead of to a reused
/// slot. Callers still must not retain search results across mutations.
#[derive(Debug, Clone)]
pub struct Forest {
    pub(crate) arena: Arena<Node>,
    pub(crate) root: Index,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(Node::new(ROOT_KEY));
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn node(&self, idx: Index) -> Option<&Node> {
        self.arena.get(idx)
    }

    pub(crate) fn node_mut(&mut self, idx: Index) -> Option<&mut Node> {
        self.arena.get_mut(idx)
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.arena
            .get(self.root)
            .map(|root| root.children.is_empty())
            .unwrap_or(true)
    }

    /// Maximum depth below and including the root.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];

        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().map(|&child| (child, depth + 1)));
            }
        }
        max_depth
    }
}
