//! kvtree: an in-memory hierarchical key-value store
//!
//! Keys form a forest under a permanent `root` node. Leaves hold an unsigned
//! integer or a string, parents hold children kept in ascending key order.
//! Data is loaded from `path.key = value` text files.
//!
//! Architecture:
//! - `domain`: forest, traversal, mutation, typed accessors
//! - `application`: ingestion and read-only display
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, IngestService};
pub use config::Settings;
pub use domain::{Forest, Node, NodeKind, SearchMode, SearchResult, TreeError, TreeResult, Value, ROOT_KEY};
