//! Domain layer: the key-value forest and its invariants
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod accessor;
pub mod error;
pub mod forest;
pub mod key_path;
pub mod mutation;
pub mod node;
pub mod traversal;

pub use accessor::DEFAULT_LANGUAGE;
pub use error::{TreeError, TreeResult};
pub use forest::{Forest, ROOT_KEY};
pub use node::{Node, NodeKind, Value};
pub use traversal::{SearchMode, SearchResult};
