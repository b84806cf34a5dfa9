//! # REPLICA IDENTITY
//!
//! PostgreSQL tables have a REPLICA IDENTITY setting that determines what data
//! is included in the WAL for UPDATE and DELETE operations:
//!
//! - **DEFAULT**: Only primary key columns in before image
//! - **NOTHING**: No before image (DELETE/UPDATE won't have old row data)
//! - **FULL**: All columns in before image
//! - **INDEX**: Columns from specified unique index
//!
//! A RELATION message carries the setting as a single byte. Under NOTHING the
//! adapter leaves the relation without identity index, so its keys render
//! the degraded-mode sentinel.

/// PostgreSQL REPLICA IDENTITY setting of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicaIdentity {
    /// DEFAULT - Only primary key columns (most common)
    Default,
    /// NOTHING - No old row data at all
    Nothing,
    /// FULL - All columns included
    Full,
    /// INDEX - Columns from a specified unique index
    Index,
    /// Unknown identity value
    Unknown(u8),
}

impl ReplicaIdentity {
    /// Parse the RELATION message byte: `d`, `n`, `f` or `i`.
    pub fn from_byte(b: u8) -> Self {
        match b {
            b'd' => ReplicaIdentity::Default,
            b'n' => ReplicaIdentity::Nothing,
            b'f' => ReplicaIdentity::Full,
            b'i' => ReplicaIdentity::Index,
            _ => ReplicaIdentity::Unknown(b),
        }
    }

    /// Whether key-flagged columns identify rows of the relation.
    pub fn identifies_rows(&self) -> bool {
        !matches!(self, ReplicaIdentity::Nothing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicaIdentity::Default => "DEFAULT",
            ReplicaIdentity::Nothing => "NOTHING",
            ReplicaIdentity::Full => "FULL",
            ReplicaIdentity::Index => "INDEX",
            ReplicaIdentity::Unknown(_) => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ReplicaIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
