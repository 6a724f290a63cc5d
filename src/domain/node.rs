//! Node model: the data unit of the forest.

use std::fmt;

use generational_arena::Index;

/// Scalar payload a leaf may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u64),
    Str(String),
}

impl Value {
    /// Kind of node a leaf holding this value classifies as.
    pub fn kind(&self) -> NodeKind {
        match self {
            Value::Int(_) => NodeKind::Integer,
            Value::Str(_) => NodeKind::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// Logical type of a node, derived from its current shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Parent,
    String,
    Integer,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Parent => "parent",
            NodeKind::String => "string",
            NodeKind::Integer => "integer",
        };
        f.write_str(name)
    }
}

/// Tree node stored in the forest arena.
///
/// Ownership is strictly downward: a node knows its children, never its parent.
/// Children are kept in ascending key order.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) key: String,
    pub(crate) children: Vec<Index>,
    /// `None` for parents; leaves always hold a value.
    pub(crate) payload: Option<Value>,
}

impl Node {
    /// Fresh leaf with integer payload 0, the only valid initial state.
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            children: Vec::new(),
            payload: Some(Value::Int(0)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Classify the node: parent if it has children, else string if it holds a
    /// string, else integer.
    pub fn kind(&self) -> NodeKind {
        if !self.children.is_empty() {
            NodeKind::Parent
        } else if let Some(Value::Str(_)) = self.payload {
            NodeKind::String
        } else {
            NodeKind::Integer
        }
    }

    /// Integer payload of an integer-kind node (0 when no payload is held).
    pub(crate) fn integer(&self) -> u64 {
        match self.payload {
            Some(Value::Int(i)) => i,
            _ => 0,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.payload, self.is_leaf()) {
            (Some(value), true) => write!(f, "{} = {}", self.key, value),
            _ => write!(f, "{}", self.key),
        }
    }
}
