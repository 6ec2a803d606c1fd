//! Offset index over a record log.
//!
//! The index maps logical keys (channel, thread, file) to the byte offsets
//! of the records addressable by that key. It is a derived, disposable
//! artifact: the log is the single source of truth and the index can always
//! be rebuilt by rescanning it. Once built or loaded, an index is read-only
//! for the rest of the session.
//!
//! Keys are classified purely lexically by their first character — `t…` is
//! a thread key, `f…` a file key, anything else (including the empty key) a
//! channel key. The convention is shared with index files written by the
//! export tool, so [`KeyKind::classify`] is the one definition of it.

use std::io::{Read, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LensError, Result};
use crate::parser::RecordReader;

/// Logical key class, decided by the key's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A channel id key (no sentinel prefix).
    Channel,
    /// A thread key (`t` prefix).
    Thread,
    /// A file key (`f` prefix).
    File,
}

impl KeyKind {
    /// Classify a key by its first character.
    ///
    /// The empty key has no prefix to match and classifies as a channel.
    #[must_use]
    pub fn classify(key: &str) -> Self {
        match key.as_bytes().first() {
            Some(b't') => Self::Thread,
            Some(b'f') => Self::File,
            _ => Self::Channel,
        }
    }
}

/// Mapping from logical key to byte offsets into the record log.
///
/// Backed by an insertion-ordered map so that a loaded index preserves the
/// key order of the persisted document, and serialization round-trips
/// exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffsetIndex {
    entries: IndexMap<String, Vec<u64>>,
}

/// Aggregates over an index, computed without mutating it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Total number of keys.
    pub keys: usize,
    /// Total number of offsets across all keys.
    pub offsets: usize,
    /// Keys classified as channels.
    pub channels: usize,
    /// Keys classified as threads.
    pub threads: usize,
    /// Keys classified as files.
    pub files: usize,
}

impl OffsetIndex {
    /// Build an index by fully consuming a record log reader.
    ///
    /// Each addressable record contributes its start offset under its
    /// [`group_key`](crate::model::Record::group_key); unknown-type records
    /// contribute nothing. Offsets are appended in log order.
    pub fn build<R: std::io::BufRead>(reader: &mut RecordReader<R>) -> Result<Self> {
        let mut entries: IndexMap<String, Vec<u64>> = IndexMap::new();
        while let Some(record) = reader.next_record()? {
            if let Some(key) = record.group_key() {
                entries.entry(key).or_default().push(reader.last_offset());
            }
        }
        debug!(keys = entries.len(), "indexed record log");
        Ok(Self { entries })
    }

    /// Load a persisted index document.
    ///
    /// Fails with [`LensError::InvalidIndex`] if the top-level value is not
    /// a key → offset-list mapping.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| LensError::InvalidIndex {
            reason: "expected a top-level object mapping keys to offset lists".to_string(),
            source: Some(e),
        })
    }

    /// Load a persisted index from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::load(bytes)
    }

    /// Load a persisted index from a file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| LensError::open(path, e))?;
        Self::load(std::io::BufReader::new(file))
    }

    /// Serialize the index as a single JSON object.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self).map_err(|e| LensError::SerializationError {
            context: "Failed to serialize index".to_string(),
            source: e,
        })
    }

    /// Serialize the index to a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| LensError::SerializationError {
            context: "Failed to serialize index".to_string(),
            source: e,
        })
    }

    /// Get the offsets recorded for a key.
    #[must_use]
    pub fn offsets(&self, key: &str) -> Option<&[u64]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of keys in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys and their offset lists in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u64])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Compute aggregates over the index. Pure query, safe to repeat.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            keys: self.entries.len(),
            ..IndexStats::default()
        };
        for (key, offsets) in &self.entries {
            stats.offsets += offsets.len();
            match KeyKind::classify(key) {
                KeyKind::Channel => stats.channels += 1,
                KeyKind::Thread => stats.threads += 1,
                KeyKind::File => stats.files += 1,
            }
        }
        stats
    }
}

impl<'a> IntoIterator for &'a OffsetIndex {
    type Item = (&'a String, &'a Vec<u64>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<u64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_log() -> String {
        [
            r#"{"type":0,"size":1,"id":"C1","m":[{"ts":"1.0"}]}"#,
            r#"{"type":1,"size":1,"id":"C1","p":{"ts":"1.0"},"m":[{"ts":"1.1"}]}"#,
            r#"{"type":2,"size":1,"id":"C1","_p":{"ts":"1.0"},"f":[{"id":"F1"}]}"#,
            r#"{"type":0,"size":1,"id":"C1","m":[{"ts":"2.0"}]}"#,
            r#"{"type":9,"size":1}"#,
        ]
        .map(|l| format!("{l}\n"))
        .concat()
    }

    #[test]
    fn test_classify_is_first_character_only() {
        assert_eq!(KeyKind::classify("t123"), KeyKind::Thread);
        assert_eq!(KeyKind::classify("ttt"), KeyKind::Thread);
        assert_eq!(KeyKind::classify("f99"), KeyKind::File);
        assert_eq!(KeyKind::classify("C123"), KeyKind::Channel);
        // No prefix to match: channel.
        assert_eq!(KeyKind::classify(""), KeyKind::Channel);
    }

    #[test]
    fn test_build_keys_and_offsets() {
        let log = sample_log();
        let mut reader = RecordReader::from_slice(log.as_bytes());
        let index = OffsetIndex::build(&mut reader).unwrap();

        // Unknown record contributes no key.
        assert_eq!(index.len(), 3);

        // Both message records land under the channel key, in log order.
        let channel_offsets = index.offsets("C1").unwrap();
        assert_eq!(channel_offsets.len(), 2);
        assert_eq!(channel_offsets[0], 0);
        assert!(channel_offsets[0] < channel_offsets[1]);

        assert!(index.offsets("tC1:1.0").is_some());
        assert!(index.offsets("fC1:1.0").is_some());
    }

    #[test]
    fn test_offsets_address_record_starts() {
        let log = sample_log();
        let mut reader = RecordReader::from_slice(log.as_bytes());
        let index = OffsetIndex::build(&mut reader).unwrap();

        // Re-read every indexed record from its recorded offset.
        for (key, offsets) in index.iter() {
            for &offset in offsets {
                let mut sub = RecordReader::from_slice(&log.as_bytes()[offset as usize..]);
                let record = sub.next_record().unwrap().unwrap_or_else(|| {
                    panic!("offset {offset} for key {key} points past the log")
                });
                assert_eq!(record.group_key().as_deref(), Some(key));
            }
        }
    }

    #[test]
    fn test_roundtrip_preserves_keys_and_order() {
        let log = sample_log();
        let mut reader = RecordReader::from_slice(log.as_bytes());
        let built = OffsetIndex::build(&mut reader).unwrap();

        let serialized = built.to_json_string().unwrap();
        let loaded = OffsetIndex::from_slice(serialized.as_bytes()).unwrap();

        assert_eq!(built, loaded);
        let built_keys: Vec<_> = built.iter().map(|(k, _)| k.to_string()).collect();
        let loaded_keys: Vec<_> = loaded.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(built_keys, loaded_keys);
    }

    #[test]
    fn test_load_rejects_non_mapping() {
        let err = OffsetIndex::from_slice(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, LensError::InvalidIndex { .. }));

        let err = OffsetIndex::from_slice(b"42").unwrap_err();
        assert!(matches!(err, LensError::InvalidIndex { .. }));
    }

    #[test]
    fn test_stats() {
        let log = sample_log();
        let mut reader = RecordReader::from_slice(log.as_bytes());
        let index = OffsetIndex::build(&mut reader).unwrap();

        let stats = index.stats();
        assert_eq!(stats.keys, 3);
        assert_eq!(stats.offsets, 4);
        assert_eq!(stats.channels, 1);
        assert_eq!(stats.threads, 1);
        assert_eq!(stats.files, 1);
    }

    #[test]
    fn test_stats_on_loaded_index() {
        let doc = r#"{"C1":[0,100],"tC1:1.0":[50],"f1":[75],"":[3]}"#;
        let index = OffsetIndex::from_slice(doc.as_bytes()).unwrap();

        let stats = index.stats();
        assert_eq!(stats.keys, 4);
        assert_eq!(stats.offsets, 5);
        // "" classifies as channel alongside "C1".
        assert_eq!(stats.channels, 2);
        assert_eq!(stats.threads, 1);
        assert_eq!(stats.files, 1);
    }
}
