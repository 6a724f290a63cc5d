//! Application layer: producers and consumers of the forest
//!
//! Ingestion turns text into mutation calls; display reads the forest back out.
//! Both depend only on the domain API and on I/O boundary traits.

pub mod display;
pub mod error;
pub mod error_ext;
pub mod ingest;

pub use display::{describe_value, enumerate, render_tree, Entry};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use ingest::{Assignment, IngestService, LineParser};
