//! chunklens: CLI tool for inspecting conversation-export record logs.
//!
//! This crate provides decoding, indexing, aggregation, and visualization
//! for the append-only record log written by a conversation-export tool,
//! along with its companion offset index.
//!
//! # The record log
//!
//! The log is newline-delimited JSON. Each line is one self-describing
//! record tagged by an integer `type` — a message batch, a thread-reply
//! batch, or a file-metadata batch — carrying a declared item count and a
//! type-specific payload. The companion index maps logical keys (channel,
//! thread, file) to the byte offsets where a key's records begin, enabling
//! targeted re-reads without a full scan. The log is the single source of
//! truth; the index is derived and can always be rebuilt.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use chunklens::analytics::LogStats;
//! use chunklens::parser::RecordReader;
//!
//! fn main() -> chunklens::Result<()> {
//!     let mut reader = RecordReader::open("record.jsonl")?;
//!     let stats = LogStats::collect(&mut reader)?;
//!     println!("{} records, {} messages", stats.records, stats.messages);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`model`]: Typed record structures decoded from log lines
//! - [`parser`]: Offset-tracking record log reader
//! - [`index`]: Offset index construction, persistence, and queries
//! - [`analytics`]: Single-pass per-type aggregation
//! - [`graph`]: Graphviz digraph export
//! - [`rewrite`]: URL rewriting over exported JSON documents
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types and exit codes

#![doc(html_root_url = "https://docs.rs/chunklens/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod cli;
pub mod error;
pub mod graph;
pub mod index;
pub mod model;
pub mod parser;
pub mod rewrite;

// Re-export commonly used types at the crate root
pub use error::{LensError, Result};
pub use model::Record;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
