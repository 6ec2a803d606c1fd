//! Record log decoding.
//!
//! The record log is newline-delimited JSON: line `i` is record `i`, each
//! line a complete, independently parseable object. [`RecordReader`]
//! decodes it into typed [`Record`] values in arrival order, tracking the
//! byte offset where each record starts so that an offset index can address
//! records for targeted re-reads.
//!
//! A reader is forward-only and non-restartable: one pass per open stream.
//! Restarting requires reopening the source or seeking to a previously
//! recorded offset.
//!
//! # Example
//!
//! ```rust,no_run
//! use chunklens::parser::RecordReader;
//!
//! let mut reader = RecordReader::open("record.jsonl")?;
//! while let Some(record) = reader.next_record()? {
//!     println!("{} at offset {}", record.type_name(), reader.last_offset());
//! }
//! # Ok::<(), chunklens::LensError>(())
//! ```
//!
//! # Errors
//!
//! Malformed JSON on a line is a fatal decode error for that call — there
//! is no silent skip. The caller decides whether to abort the pass or skip
//! and continue. An unrecognized `type` tag is not an error; it decodes to
//! [`Record::Unknown`].

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{LensError, Result};
use crate::model::Record;

/// Streaming reader over a newline-delimited record log.
#[derive(Debug)]
pub struct RecordReader<R: BufRead> {
    reader: R,
    /// Byte offset of the next unread byte.
    offset: u64,
    /// Byte offset of the start of the most recently returned record.
    last_offset: u64,
    /// Lines consumed so far (1-based in error reports).
    line: usize,
    buf: String,
}

impl RecordReader<BufReader<File>> {
    /// Open a record log file for a single forward pass.
    ///
    /// A missing file maps to [`LensError::FileNotFound`] so callers can
    /// report it without a crash trace.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LensError::open(path, e))?;
        debug!(path = %path.display(), "opened record log");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<'a> RecordReader<Cursor<&'a [u8]>> {
    /// Create a reader over an in-memory log, mainly for tests.
    #[must_use]
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Create a reader positioned at a record boundary.
    ///
    /// The stream must start at offset 0 of the log, or at an offset taken
    /// from a previously built index; reported offsets are relative to the
    /// stream start.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            last_offset: 0,
            line: 0,
            buf: String::new(),
        }
    }

    /// Decode the next record, or `Ok(None)` at end of stream.
    ///
    /// Empty lines are skipped. Advancing the stream position is the only
    /// side effect.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            let start = self.offset;
            self.buf.clear();
            let n = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|e| LensError::io(format!("Failed to read line {}", self.line + 1), e))?;
            if n == 0 {
                return Ok(None);
            }
            self.offset += n as u64;
            self.line += 1;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: Record = serde_json::from_str(trimmed)
                .map_err(|e| LensError::parse_with_source(self.line, e.to_string(), e))?;

            // The declared size is trusted downstream; a mismatch with the
            // payload is a data-quality signal, not a validation failure.
            if !matches!(record, Record::Unknown(_))
                && record.declared_size() != record.item_len() as u64
            {
                warn!(
                    line = self.line,
                    declared = record.declared_size(),
                    actual = record.item_len(),
                    "record size field disagrees with payload length"
                );
            }

            self.last_offset = start;
            return Ok(Some(record));
        }
    }

    /// Byte offset of the start of the most recently returned record.
    #[must_use]
    pub fn last_offset(&self) -> u64 {
        self.last_offset
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
