//! Data model for conversation-export record logs.
//!
//! This module provides strongly-typed structures for the three record
//! types written by the export tool (message batches, thread-reply batches,
//! file-metadata batches), with forward-compatible unknown field
//! preservation on the nested message and file objects.
//!
//! A record is one JSON object per log line, tagged by an integer `type`
//! field. Decoding dispatches on the tag once, immediately after parsing;
//! consumers receive a [`Record`] variant and never re-check shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record type tag for a message batch.
pub const TAG_MESSAGES: i64 = 0;
/// Record type tag for a thread-reply batch.
pub const TAG_THREAD_MESSAGES: i64 = 1;
/// Record type tag for a file-metadata batch.
pub const TAG_FILES: i64 = 2;

/// Raw JSON values preserving unknown fields for forward compatibility.
pub type UnknownFields = IndexMap<String, Value>;

/// One self-describing, typed entry in the append-only log.
///
/// An out-of-range `type` tag is not an error: it is preserved as
/// [`Record::Unknown`] so future consumers are not forced to guess, and
/// current consumers can skip it or count it toward totals as appropriate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawRecord", into = "RawRecord")]
pub enum Record {
    /// A batch of channel messages.
    Messages(MessageChunk),
    /// A batch of replies to a single thread parent.
    ThreadMessages(ThreadChunk),
    /// A batch of file metadata attached to a single owning message.
    Files(FileChunk),
    /// A record with a type tag outside the known set.
    Unknown(UnknownChunk),
}

impl Record {
    /// Get the record type as a display string.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Messages(_) => "messages",
            Self::ThreadMessages(_) => "thread-messages",
            Self::Files(_) => "files",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Get the declared item count (`size` field).
    ///
    /// Trusted for aggregation; the producer does not guarantee it equals
    /// the actual payload length.
    #[must_use]
    pub const fn declared_size(&self) -> u64 {
        match self {
            Self::Messages(c) => c.size,
            Self::ThreadMessages(c) => c.size,
            Self::Files(c) => c.size,
            Self::Unknown(c) => c.size,
        }
    }

    /// Get the actual payload cardinality.
    #[must_use]
    pub fn item_len(&self) -> usize {
        match self {
            Self::Messages(c) => c.messages.len(),
            Self::ThreadMessages(c) => c.replies.len(),
            Self::Files(c) => c.files.len(),
            Self::Unknown(_) => 0,
        }
    }

    /// Get the logical key this record is addressable by, if any.
    ///
    /// Message records are keyed by their owning channel id; thread records
    /// by `t<channel>:<parent ts>`; file records by `f<channel>:<parent ts>`.
    /// The `t`/`f` sentinel prefixes are the wire convention shared with
    /// existing index files (see [`crate::index::KeyKind`]). Unknown records
    /// are not addressable.
    #[must_use]
    pub fn group_key(&self) -> Option<String> {
        match self {
            Self::Messages(c) => Some(c.channel.clone().unwrap_or_default()),
            Self::ThreadMessages(c) => Some(format!(
                "t{}:{}",
                c.channel.as_deref().unwrap_or_default(),
                c.parent.ts
            )),
            Self::Files(c) => Some(format!(
                "f{}:{}",
                c.channel.as_deref().unwrap_or_default(),
                c.parent.ts
            )),
            Self::Unknown(_) => None,
        }
    }
}

/// Payload of a message-batch record (`type` = 0).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageChunk {
    /// Owning channel id.
    pub channel: Option<String>,
    /// Declared message count.
    pub size: u64,
    /// Ordered messages in arrival order.
    pub messages: Vec<Message>,
}

/// Payload of a thread-reply record (`type` = 1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadChunk {
    /// Owning channel id.
    pub channel: Option<String>,
    /// Declared reply count.
    pub size: u64,
    /// Parent message reference.
    pub parent: MessageRef,
    /// Ordered replies, same shape as channel messages.
    pub replies: Vec<Message>,
}

/// Payload of a file-metadata record (`type` = 2).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileChunk {
    /// Owning channel id.
    pub channel: Option<String>,
    /// Declared file count.
    pub size: u64,
    /// Owning message reference.
    pub parent: MessageRef,
    /// Ordered file objects.
    pub files: Vec<FileMeta>,
}

/// A record whose `type` tag is outside {0, 1, 2}.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownChunk {
    /// The unrecognized type tag, preserved verbatim.
    pub tag: i64,
    /// Declared item count.
    pub size: u64,
}

/// A single message or thread reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Timestamp string; unique within a channel and used as the node key.
    pub ts: String,

    /// Author user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Files attached to this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileMeta>>,

    /// Any unknown fields preserved for lossless round-trip.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// A reference to a message by timestamp (thread parent, file owner).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageRef {
    /// Timestamp of the referenced message.
    pub ts: String,

    /// Any unknown fields preserved for lossless round-trip.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// File metadata carried by messages and file records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileMeta {
    /// Unique file id; used as the node key in graph export.
    pub id: String,

    /// Original file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Any unknown fields preserved for lossless round-trip.
    #[serde(flatten)]
    pub extra: UnknownFields,
}

/// Wire representation of a record line.
///
/// The log format tags records with an integer, which serde's internal
/// tagging cannot dispatch on directly, so decoding goes through this
/// intermediate struct and [`Record`] converts to and from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct RawRecord {
    /// Integer record type tag.
    #[serde(rename = "type")]
    kind: i64,

    /// Declared item count.
    #[serde(default, skip_serializing_if = "is_zero")]
    size: u64,

    /// Owning channel id.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    channel: Option<String>,

    /// Messages or thread replies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    m: Vec<Message>,

    /// Thread parent reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    p: Option<MessageRef>,

    /// File-owner message reference.
    #[serde(rename = "_p", default, skip_serializing_if = "Option::is_none")]
    file_parent: Option<MessageRef>,

    /// File objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    f: Vec<FileMeta>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        match raw.kind {
            TAG_MESSAGES => Self::Messages(MessageChunk {
                channel: raw.channel,
                size: raw.size,
                messages: raw.m,
            }),
            TAG_THREAD_MESSAGES => Self::ThreadMessages(ThreadChunk {
                channel: raw.channel,
                size: raw.size,
                parent: raw.p.unwrap_or_default(),
                replies: raw.m,
            }),
            TAG_FILES => Self::Files(FileChunk {
                channel: raw.channel,
                size: raw.size,
                parent: raw.file_parent.unwrap_or_default(),
                files: raw.f,
            }),
            tag => Self::Unknown(UnknownChunk { tag, size: raw.size }),
        }
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        match record {
            Record::Messages(c) => Self {
                kind: TAG_MESSAGES,
                size: c.size,
                channel: c.channel,
                m: c.messages,
                ..Self::default()
            },
            Record::ThreadMessages(c) => Self {
                kind: TAG_THREAD_MESSAGES,
                size: c.size,
                channel: c.channel,
                m: c.replies,
                p: Some(c.parent),
                ..Self::default()
            },
            Record::Files(c) => Self {
                kind: TAG_FILES,
                size: c.size,
                channel: c.channel,
                f: c.files,
                file_parent: Some(c.parent),
                ..Self::default()
            },
            Record::Unknown(c) => Self {
                kind: c.tag,
                size: c.size,
                ..Self::default()
            },
        }
    }
}
