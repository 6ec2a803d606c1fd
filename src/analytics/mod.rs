//! Aggregate statistics over record logs.
//!
//! This module provides single-pass aggregation producing per-type record
//! counts and item totals. Counters are simple associative sums, so the
//! same log always yields the same aggregate regardless of record order;
//! records are nonetheless processed strictly in arrival order, one pass
//! per reader.

use serde::Serialize;

use crate::error::Result;
use crate::model::Record;
use crate::parser::RecordReader;

/// Running counters over a record log.
///
/// A record of an unrecognized type counts toward [`records`](Self::records)
/// and [`unknown_records`](Self::unknown_records) but no typed bucket, so
/// the four per-type buckets always partition the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogStats {
    /// Total records seen.
    pub records: u64,
    /// Message-batch records.
    pub message_records: u64,
    /// Messages carried by message records (sum of declared sizes).
    pub messages: u64,
    /// Thread-reply records.
    pub thread_records: u64,
    /// Replies carried by thread records (sum of declared sizes).
    pub thread_replies: u64,
    /// File-metadata records.
    pub file_records: u64,
    /// Files carried by file records (sum of declared sizes).
    pub files: u64,
    /// Records with an unrecognized type tag.
    pub unknown_records: u64,
}

impl LogStats {
    /// Aggregate a record log by consuming the reader exactly once.
    ///
    /// Stops at the first decode error without producing a summary; there
    /// is no partial-success mode within a single pass.
    pub fn collect<R: std::io::BufRead>(reader: &mut RecordReader<R>) -> Result<Self> {
        let mut stats = Self::default();
        while let Some(record) = reader.next_record()? {
            stats.record(&record);
        }
        Ok(stats)
    }

    /// Fold one record into the counters.
    pub fn record(&mut self, record: &Record) {
        self.records += 1;
        match record {
            Record::Messages(c) => {
                self.message_records += 1;
                self.messages += c.size;
            }
            Record::ThreadMessages(c) => {
                self.thread_records += 1;
                self.thread_replies += c.size;
            }
            Record::Files(c) => {
                self.file_records += 1;
                self.files += c.size;
            }
            Record::Unknown(_) => {
                self.unknown_records += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_end_to_end_example() {
        let log = concat!(
            r#"{"type":0,"size":1,"id":"C1","m":[{"ts":"1.0","user":"u","text":"hi"}]}"#,
            "\n",
            r#"{"type":1,"size":1,"id":"C1","p":{"ts":"1.0"},"m":[{"ts":"1.1","user":"u","text":"reply"}]}"#,
            "\n",
        );
        let mut reader = RecordReader::from_slice(log.as_bytes());
        let stats = LogStats::collect(&mut reader).unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(stats.message_records, 1);
        assert_eq!(stats.messages, 1);
        assert_eq!(stats.thread_records, 1);
        assert_eq!(stats.thread_replies, 1);
        assert_eq!(stats.file_records, 0);
        assert_eq!(stats.unknown_records, 0);
    }

    #[test]
    fn test_buckets_partition_total() {
        let log = concat!(
            r#"{"type":0,"size":2,"id":"C1"}"#,
            "\n",
            r#"{"type":2,"size":1,"id":"C1","_p":{"ts":"1.0"}}"#,
            "\n",
            r#"{"type":11,"size":4}"#,
            "\n",
        );
        let mut reader = RecordReader::from_slice(log.as_bytes());
        let stats = LogStats::collect(&mut reader).unwrap();

        assert_eq!(
            stats.records,
            stats.message_records + stats.thread_records + stats.file_records + stats.unknown_records
        );
        // Unknown size does not leak into any item bucket.
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.files, 1);
        assert_eq!(stats.thread_replies, 0);
    }

    #[test]
    fn test_malformed_line_yields_no_summary() {
        let log = concat!(
            r#"{"type":0,"size":1,"id":"C1"}"#,
            "\n",
            "{broken\n",
        );
        let mut reader = RecordReader::from_slice(log.as_bytes());
        assert!(LogStats::collect(&mut reader).is_err());
    }
}
