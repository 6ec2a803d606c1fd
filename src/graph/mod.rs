//! Graphviz export for record logs.
//!
//! Translates a record log into a directed-graph description: one node per
//! message or reply, one node per file, with edges thread-parent → reply
//! and message → attached file. Nodes are colored by kind. Output is
//! deterministic: records are visited in log order and node/edge lines are
//! emitted in encounter order.
//!
//! The exporter performs no deduplication — repeated `ts`/`id` values
//! across records collapse under Graphviz's node-identity semantics, not
//! here. Unrecognized record types are silently skipped.

use std::io::Write;

use crate::error::{LensError, Result};
use crate::model::{FileMeta, Message, Record};
use crate::parser::RecordReader;

/// Node classification driving the fixed color assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A plain channel message.
    Message,
    /// A reply inside a thread.
    Reply,
    /// A file attached to a message or reply.
    Attachment,
    /// A file carried by a file-metadata record proper.
    FileRecord,
}

impl NodeKind {
    /// Graphviz fill color for this node kind.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Message => "lightblue",
            Self::Reply => "palegreen",
            Self::Attachment => "khaki",
            Self::FileRecord => "lightsalmon",
        }
    }
}

/// Graphviz exporter over a record log.
#[derive(Debug, Clone)]
pub struct DotExporter {
    /// Graph name emitted in the opening delimiter.
    graph_name: String,
}

impl Default for DotExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DotExporter {
    /// Create a new exporter with the default graph name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph_name: "records".to_string(),
        }
    }

    /// Set the graph name.
    #[must_use]
    pub fn with_graph_name(mut self, name: impl Into<String>) -> Self {
        self.graph_name = name.into();
        self
    }

    /// Consume the reader once and write a complete digraph document.
    ///
    /// The opening and closing delimiters are always emitted, even when the
    /// body is empty. Stops at the first decode error.
    pub fn write_dot<R, W>(&self, reader: &mut RecordReader<R>, writer: &mut W) -> Result<()>
    where
        R: std::io::BufRead,
        W: Write,
    {
        writeln!(writer, "digraph {} {{", self.graph_name).map_err(io_err)?;
        while let Some(record) = reader.next_record()? {
            self.write_record(&record, writer)?;
        }
        writeln!(writer, "}}").map_err(io_err)?;
        Ok(())
    }

    /// Emit the node and edge lines for one record.
    fn write_record<W: Write>(&self, record: &Record, writer: &mut W) -> Result<()> {
        match record {
            Record::Messages(chunk) => {
                for message in &chunk.messages {
                    write_message(writer, message, NodeKind::Message)?;
                }
            }
            Record::ThreadMessages(chunk) => {
                for reply in &chunk.replies {
                    write_message(writer, reply, NodeKind::Reply)?;
                    write_edge(writer, &chunk.parent.ts, &reply.ts)?;
                }
            }
            Record::Files(chunk) => {
                for file in &chunk.files {
                    write_file(writer, file, NodeKind::FileRecord)?;
                    write_edge(writer, &chunk.parent.ts, &file.id)?;
                }
            }
            Record::Unknown(_) => {}
        }
        Ok(())
    }
}

/// Emit a message node plus nodes and edges for its attachments.
fn write_message<W: Write>(writer: &mut W, message: &Message, kind: NodeKind) -> Result<()> {
    write_node(writer, &message.ts, kind)?;
    if let Some(files) = &message.files {
        for file in files {
            write_file(writer, file, NodeKind::Attachment)?;
            write_edge(writer, &message.ts, &file.id)?;
        }
    }
    Ok(())
}

/// Emit a file node.
fn write_file<W: Write>(writer: &mut W, file: &FileMeta, kind: NodeKind) -> Result<()> {
    write_node(writer, &file.id, kind)
}

fn write_node<W: Write>(writer: &mut W, id: &str, kind: NodeKind) -> Result<()> {
    writeln!(
        writer,
        "  {} [style=filled fillcolor={}]",
        quote(id),
        kind.color()
    )
    .map_err(io_err)
}

fn write_edge<W: Write>(writer: &mut W, from: &str, to: &str) -> Result<()> {
    writeln!(writer, "  {} -> {}", quote(from), quote(to)).map_err(io_err)
}

/// Quote a node id for the dot language, escaping embedded quotes.
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

fn io_err(e: std::io::Error) -> LensError {
    LensError::io("Failed to write graph output", e)
}
