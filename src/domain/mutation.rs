//! Insert, value assignment and delete-with-pruning.
//!
//! Every operation performs all of its lookups and allocations before the
//! first write, so a returned error leaves the forest exactly as it was.

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::forest::Forest;
use crate::domain::key_path;
use crate::domain::node::{Node, NodeKind, Value};
use crate::domain::traversal::SearchMode;

impl Forest {
    /// Attach a new leaf `key` (integer 0) under `parent`.
    ///
    /// Keys are unique across the whole forest. If `parent` held a scalar value
    /// it is discarded: a node cannot be a parent and a leaf at once, and the
    /// new child wins over the stale value.
    #[instrument(level = "debug", skip(self))]
    pub fn insert(&mut self, parent: &str, key: &str) -> TreeResult<Index> {
        key_path::validate_key(key)?;
        if self.find(key)?.is_some() {
            return Err(TreeError::DuplicateKey(key.to_string()));
        }
        let parent_idx = self.require(parent)?;

        let position = {
            let parent_node = self.arena.get(parent_idx).ok_or(TreeError::NullRoot)?;
            match parent_node
                .children
                .binary_search_by(|&child| self.child_key(child).cmp(key))
            {
                Ok(pos) | Err(pos) => pos,
            }
        };
        self.node_mut(parent_idx)
            .ok_or(TreeError::NullRoot)?
            .children
            .try_reserve(1)?;

        let child = self.arena.insert(Node::new(key));
        let Some(parent_node) = self.arena.get_mut(parent_idx) else {
            self.arena.remove(child);
            return Err(TreeError::NullRoot);
        };
        if let Some(discarded) = parent_node.payload.take() {
            debug!(parent = %parent_node.key, %discarded, "parent payload discarded");
        }
        parent_node.children.insert(position, child);

        debug!(parent = %parent_node.key, key, "inserted");
        Ok(child)
    }

    pub fn set_int(&mut self, key_or_path: &str, value: u64) -> TreeResult<()> {
        self.set_value(key_or_path, Value::Int(value))
    }

    pub fn set_string(&mut self, key_or_path: &str, value: impl Into<String>) -> TreeResult<()> {
        self.set_value(key_or_path, Value::Str(value.into()))
    }

    /// Replace the scalar held by a leaf.
    ///
    /// A string may overwrite an integer leaf only while that integer is 0 (the
    /// never-assigned default); an integer never overwrites a string.
    #[instrument(level = "debug", skip(self))]
    pub fn set_value(&mut self, key_or_path: &str, value: Value) -> TreeResult<()> {
        let idx = self.require(key_or_path)?;
        let node = self.node_mut(idx).ok_or(TreeError::NullRoot)?;

        match (node.kind(), value.kind()) {
            (NodeKind::Parent, _) => Err(TreeError::WrongNodeKind {
                key: node.key.clone(),
                kind: NodeKind::Parent,
            }),
            (NodeKind::String, NodeKind::Integer) => Err(TreeError::TypeMismatch {
                key: node.key.clone(),
                expected: NodeKind::Integer,
                found: NodeKind::String,
            }),
            (NodeKind::Integer, NodeKind::String) if node.integer() != 0 => {
                Err(TreeError::TypeMismatch {
                    key: node.key.clone(),
                    expected: NodeKind::String,
                    found: NodeKind::Integer,
                })
            }
            _ => {
                node.payload = Some(value);
                Ok(())
            }
        }
    }

    /// Remove `key_or_path` with its whole subtree, then prune every ancestor
    /// left childless, up to but excluding the forest root.
    ///
    /// Deleting the root key releases everything below the root and keeps the
    /// root itself. Returns the number of released nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, key_or_path: &str) -> TreeResult<usize> {
        let key = key_path::end_key(key_or_path);
        let visited = self
            .traverse(self.root, key, SearchMode::PathToTarget)?
            .into_nodes();

        let target = match visited.last() {
            Some(&last) if self.arena.get(last).is_some_and(|n| n.key == key) => last,
            _ => return Err(TreeError::NoSuchTarget(key_or_path.to_string())),
        };
        if target == self.root {
            return self.release_below_root();
        }

        // Plan: find the highest node to remove and the ancestor to patch.
        let ancestors = self.ancestor_chain(&visited)?;
        let mut doomed_top = target;
        let mut patched = None;
        for &ancestor in &ancestors {
            let node = self.arena.get(ancestor).ok_or(TreeError::NullRoot)?;
            if ancestor != self.root && node.children.len() <= 1 {
                doomed_top = ancestor;
                continue;
            }
            patched = Some(ancestor);
            break;
        }
        // The root is always on the chain and never pruned.
        let patched = patched.ok_or(TreeError::NullRoot)?;
        let doomed = self
            .traverse(doomed_top, "", SearchMode::WholeSubtree)?
            .into_nodes();

        // Commit
        let root = self.root;
        if let Some(node) = self.arena.get_mut(patched) {
            node.children.retain(|&child| child != doomed_top);
            // a childless root is a leaf again and holds the default integer
            if patched == root && node.children.is_empty() {
                node.payload = Some(Value::Int(0));
            }
        }
        for &idx in &doomed {
            self.arena.remove(idx);
        }

        debug!(
            key,
            released = doomed.len(),
            pruned_ancestors = doomed.len().saturating_sub(1),
            "deleted"
        );
        Ok(doomed.len())
    }

    /// Release every node, root included, exactly once.
    #[instrument(level = "debug", skip(self))]
    pub fn teardown(mut self) -> TreeResult<usize> {
        let all = self
            .traverse(self.root, "", SearchMode::WholeSubtree)?
            .into_nodes();

        let released = all
            .into_iter()
            .filter(|&idx| self.arena.remove(idx).is_some())
            .count();
        if self.arena.len() > 0 {
            warn!(unreachable = self.arena.len(), "teardown left unreachable nodes");
        }

        debug!(released, "forest torn down");
        Ok(released)
    }

    fn release_below_root(&mut self) -> TreeResult<usize> {
        let doomed = self
            .traverse(self.root, "", SearchMode::WholeSubtree)?
            .into_nodes();

        if let Some(root) = self.arena.get_mut(self.root) {
            root.children.clear();
            root.payload = Some(Value::Int(0));
        }
        let released = doomed
            .iter()
            .skip(1)
            .filter(|&&idx| self.arena.remove(idx).is_some())
            .count();

        debug!(released, "cleared forest root");
        Ok(released)
    }

    /// Ancestors of the last visited node, nearest first, recovered from the
    /// preorder visit sequence: walking it backwards, the first node that owns
    /// the current node is its parent.
    fn ancestor_chain(&self, visited: &[Index]) -> TreeResult<Vec<Index>> {
        let mut chain = Vec::new();
        let Some((&target, earlier)) = visited.split_last() else {
            return Ok(chain);
        };
        chain.try_reserve(earlier.len())?;

        let mut current = target;
        for &idx in earlier.iter().rev() {
            if self
                .arena
                .get(idx)
                .is_some_and(|node| node.children.contains(&current))
            {
                chain.push(idx);
                current = idx;
            }
        }
        Ok(chain)
    }

    fn child_key(&self, idx: Index) -> &str {
        self.arena.get(idx).map(|n| n.key.as_str()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forest::ROOT_KEY;

    fn child_keys<'a>(forest: &'a Forest, key: &str) -> Vec<&'a str> {
        let idx = forest.find(key).unwrap().unwrap();
        forest.keys_of(forest.node(idx).unwrap().children())
    }

    #[test]
    fn given_unsorted_inserts_then_children_sorted() {
        let mut forest = Forest::new();
        for key in ["delta", "alpha", "charlie", "bravo"] {
            forest.insert(ROOT_KEY, key).unwrap();
        }
        assert_eq!(
            child_keys(&forest, ROOT_KEY),
            vec!["alpha", "bravo", "charlie", "delta"]
        );
    }

    #[test]
    fn given_existing_key_anywhere_when_inserting_then_duplicate_and_unchanged() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "a").unwrap();
        forest.insert("a", "b").unwrap();
        forest.set_int("b", 3).unwrap();
        let before = format!("{:?}", forest);

        let result = forest.insert(ROOT_KEY, "b");

        assert!(matches!(result, Err(TreeError::DuplicateKey(k)) if k == "b"));
        assert_eq!(format!("{:?}", forest), before);
    }

    #[test]
    fn given_missing_parent_when_inserting_then_no_such_target() {
        let mut forest = Forest::new();
        let result = forest.insert("nowhere", "a");
        assert!(matches!(result, Err(TreeError::NoSuchTarget(_))));
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn given_leaf_with_value_when_child_inserted_then_value_discarded() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "config").unwrap();
        forest.set_int("config", 9).unwrap();

        forest.insert("config", "loglevel").unwrap();

        let config = forest.node(forest.find("config").unwrap().unwrap()).unwrap();
        assert_eq!(config.kind(), NodeKind::Parent);
        assert!(config.payload().is_none());
    }

    #[test]
    fn given_zero_integer_leaf_when_setting_string_then_becomes_string() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "title").unwrap();

        forest.set_string("title", "hello").unwrap();

        assert_eq!(forest.get_type("title").unwrap(), NodeKind::String);
    }

    #[test]
    fn given_nonzero_integer_leaf_when_setting_string_then_type_mismatch() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "count").unwrap();
        forest.set_int("count", 5).unwrap();

        let result = forest.set_string("count", "five");

        assert!(matches!(
            result,
            Err(TreeError::TypeMismatch { found: NodeKind::Integer, .. })
        ));
        assert_eq!(forest.get_int("count"), 5);
    }

    #[test]
    fn given_string_leaf_when_setting_int_then_type_mismatch() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "title").unwrap();
        forest.set_string("title", "").unwrap();

        let result = forest.set_int("title", 0);

        assert!(matches!(
            result,
            Err(TreeError::TypeMismatch { found: NodeKind::String, .. })
        ));
    }

    #[test]
    fn given_parent_when_setting_value_then_wrong_node_kind() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "a").unwrap();
        forest.insert("a", "b").unwrap();

        assert!(matches!(
            forest.set_value("a", Value::Int(1)),
            Err(TreeError::WrongNodeKind { kind: NodeKind::Parent, .. })
        ));
        assert!(matches!(
            forest.set_string("a", "x"),
            Err(TreeError::WrongNodeKind { .. })
        ));
    }

    #[test]
    fn given_only_child_chain_when_deleting_leaf_then_prunes_up_to_root() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "keep").unwrap();
        forest.insert(ROOT_KEY, "a").unwrap();
        forest.insert("a", "b").unwrap();
        forest.insert("b", "c").unwrap();

        let released = forest.delete("a.b.c").unwrap();

        assert_eq!(released, 3);
        for key in ["a", "b", "c"] {
            assert!(forest.find(key).unwrap().is_none(), "{key} should be gone");
        }
        assert_eq!(child_keys(&forest, ROOT_KEY), vec!["keep"]);
    }

    #[test]
    fn given_sibling_remains_when_deleting_then_patches_parent_in_order() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "p").unwrap();
        for key in ["a", "b", "c", "d"] {
            forest.insert("p", key).unwrap();
        }

        forest.delete("b").unwrap();

        assert_eq!(child_keys(&forest, "p"), vec!["a", "c", "d"]);
        assert_eq!(forest.len(), 5);
    }

    #[test]
    fn given_subtree_when_deleting_then_descendants_unreachable() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "config").unwrap();
        forest.insert(ROOT_KEY, "strings").unwrap();
        forest.insert("config", "update").unwrap();
        forest.insert("update", "interval").unwrap();
        forest.insert("update", "url").unwrap();

        let released = forest.delete("config").unwrap();

        assert_eq!(released, 4);
        for key in ["config", "update", "interval", "url"] {
            assert!(forest.find(key).unwrap().is_none());
        }
        assert!(forest.find("strings").unwrap().is_some());
    }

    #[test]
    fn given_last_root_child_when_deleting_then_root_survives() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "only").unwrap();

        forest.delete("only").unwrap();

        assert_eq!(forest.len(), 1);
        assert!(forest.is_empty());
        assert!(forest.find(ROOT_KEY).unwrap().is_some());
    }

    #[test]
    fn given_root_key_when_deleting_then_clears_but_keeps_root() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "a").unwrap();
        forest.insert("a", "b").unwrap();
        forest.insert(ROOT_KEY, "c").unwrap();

        let released = forest.delete(ROOT_KEY).unwrap();

        assert_eq!(released, 3);
        assert_eq!(forest.len(), 1);
        assert!(forest.is_empty());
    }

    #[test]
    fn given_missing_key_when_deleting_then_no_such_target_and_unchanged() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "a").unwrap();

        let result = forest.delete("missing");

        assert!(matches!(result, Err(TreeError::NoSuchTarget(_))));
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn given_populated_forest_when_tearing_down_then_releases_every_node_once() {
        let mut forest = Forest::new();
        forest.insert(ROOT_KEY, "a").unwrap();
        forest.insert("a", "b").unwrap();
        forest.insert(ROOT_KEY, "c").unwrap();

        assert_eq!(forest.teardown().unwrap(), 4);
    }
}
