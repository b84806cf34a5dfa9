//! pgoutput messages
//!
//! Only what the adapter turns into change events is modelled in full.
//! Messages without a text record (origin, truncate, streaming markers) are
//! decoded to [`SkippedMessage`] and their bodies dropped.

use crate::postgres::ReplicaIdentity;
use bytes::Bytes;

/// Decoded pgoutput message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationMessage {
    /// Transaction begin
    Begin(BeginBody),
    /// Transaction commit
    Commit(CommitBody),
    /// Relation (table) definition
    Relation(RelationBody),
    /// Custom type definition
    Type(TypeBody),
    /// Row insert
    Insert(InsertBody),
    /// Row update
    Update(UpdateBody),
    /// Row delete
    Delete(DeleteBody),
    /// Message that produces no change event
    Skipped(SkippedMessage),
}

impl ReplicationMessage {
    /// Message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Begin(_) => "Begin",
            Self::Commit(_) => "Commit",
            Self::Relation(_) => "Relation",
            Self::Type(_) => "Type",
            Self::Insert(_) => "Insert",
            Self::Update(_) => "Update",
            Self::Delete(_) => "Delete",
            Self::Skipped(skipped) => skipped.name(),
        }
    }
}

/// Message kinds passed over without a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkippedMessage {
    Origin,
    Truncate,
    StreamStart,
    StreamStop,
    StreamCommit,
    StreamAbort,
}

impl SkippedMessage {
    /// Map a message type byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        let skipped = match tag {
            b'O' => Self::Origin,
            b'T' => Self::Truncate,
            b'S' => Self::StreamStart,
            b'E' => Self::StreamStop,
            b'c' => Self::StreamCommit,
            b'A' => Self::StreamAbort,
            _ => return None,
        };
        Some(skipped)
    }

    /// Smallest body the message can have.
    pub fn min_body_len(&self) -> usize {
        match self {
            // commit LSN, empty name
            Self::Origin => 9,
            // relation count, options
            Self::Truncate => 5,
            Self::StreamStart => 5,
            Self::StreamStop => 0,
            Self::StreamCommit => 29,
            Self::StreamAbort => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Origin => "Origin",
            Self::Truncate => "Truncate",
            Self::StreamStart => "StreamStart",
            Self::StreamStop => "StreamStop",
            Self::StreamCommit => "StreamCommit",
            Self::StreamAbort => "StreamAbort",
        }
    }
}

/// BEGIN message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginBody {
    pub xid: u32,
    /// Commit time, microseconds since 2000-01-01 UTC
    pub timestamp: i64,
}

/// COMMIT message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBody {
    pub commit_lsn: u64,
    /// Microseconds since 2000-01-01 UTC
    pub timestamp: i64,
}

/// RELATION message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationBody {
    pub id: u32,
    pub namespace: String,
    pub name: String,
    pub replica_identity: ReplicaIdentity,
    pub columns: Vec<RelationColumn>,
}

/// Column of a RELATION message, in attribute order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationColumn {
    pub name: String,
    pub type_id: u32,
    /// Part of the replica identity
    pub is_key: bool,
}

/// TYPE message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeBody {
    pub id: u32,
    pub namespace: String,
    pub name: String,
}

/// INSERT message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertBody {
    pub relation_id: u32,
    pub tuple: Tuple,
}

/// UPDATE message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBody {
    pub relation_id: u32,
    /// `K` (identity columns only) or `O` (full old row) tuple
    pub key_tuple: Option<Tuple>,
    pub new_tuple: Tuple,
}

/// DELETE message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteBody {
    pub relation_id: u32,
    pub key_tuple: Option<Tuple>,
}

/// Row tuple
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tuple(pub Vec<TupleData>);

/// Column data within a tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleData {
    /// NULL value
    Null,
    /// Unchanged TOAST value, not transmitted
    Toast,
    /// Text representation
    Text(Bytes),
}
