//! Read-only views of a forest: value listings and tree rendering.

use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;

use crate::domain::{Forest, TreeError, TreeResult, Value};

/// A value-holding node found below an enumerated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub key: &'a str,
    pub value: &'a Value,
}

/// Every leaf strictly below `key`, in preorder.
pub fn enumerate<'a>(forest: &'a Forest, key: &str) -> TreeResult<Vec<Entry<'a>>> {
    let walk = forest.subtree(key)?;
    let entries = walk
        .nodes()
        .iter()
        .skip(1)
        .filter_map(|&idx| forest.node(idx))
        .filter(|node| node.is_leaf())
        .filter_map(|node| {
            node.payload().map(|value| Entry {
                key: node.key(),
                value,
            })
        })
        .collect();
    Ok(entries)
}

pub fn describe_value(value: &Value) -> String {
    match value {
        Value::Int(i) => format!("integer value '{}'", i),
        Value::Str(s) => format!("string value \"{}\"", s),
    }
}

/// Subtree under `key` as a printable tree.
///
/// Built from the preorder walk in reverse, so every child tree is complete
/// before its parent is assembled and no recursion is needed.
pub fn render_tree(forest: &Forest, key: &str) -> TreeResult<Tree<String>> {
    let walk = forest.subtree(key)?;
    let mut built: HashMap<Index, Tree<String>> = HashMap::new();

    for &idx in walk.nodes().iter().rev() {
        let node = forest.node(idx).ok_or(TreeError::NullRoot)?;
        let leaves = node
            .children()
            .iter()
            .filter_map(|child| built.remove(child))
            .collect::<Vec<_>>();
        built.insert(idx, Tree::new(node.to_string()).with_leaves(leaves));
    }

    let start = walk.nodes().first().ok_or(TreeError::NullRoot)?;
    built.remove(start).ok_or(TreeError::NullRoot)
}
