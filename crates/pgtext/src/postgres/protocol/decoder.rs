//! pgoutput decoder
//!
//! Decodes binary pgoutput messages from PostgreSQL logical replication.
//! Every read is bounds-checked: truncated input yields
//! [`DecodeError::NotEnoughData`] instead of a panic.

use super::message::*;
use crate::postgres::ReplicaIdentity;
use bytes::{Buf, Bytes};
use thiserror::Error;

/// Decoder errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Not enough data")]
    NotEnoughData,
    #[error("Invalid message type: {0}")]
    InvalidType(u8),
    #[error("UTF8 Error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Column flag marking a replica identity column.
const COLUMN_FLAG_KEY: u8 = 1;

/// pgoutput decoder
pub struct PgOutputDecoder;

impl PgOutputDecoder {
    /// Decode a pgoutput message
    pub fn decode(data: &mut Bytes) -> Result<ReplicationMessage, DecodeError> {
        need(data, 1)?;
        let msg_type = data.get_u8();

        match msg_type {
            b'B' => Self::decode_begin(data).map(ReplicationMessage::Begin),
            b'C' => Self::decode_commit(data).map(ReplicationMessage::Commit),
            b'R' => Self::decode_relation(data).map(ReplicationMessage::Relation),
            b'I' => Self::decode_insert(data).map(ReplicationMessage::Insert),
            b'U' => Self::decode_update(data).map(ReplicationMessage::Update),
            b'D' => Self::decode_delete(data).map(ReplicationMessage::Delete),
            b'Y' => Self::decode_type(data).map(ReplicationMessage::Type),
            t => match SkippedMessage::from_tag(t) {
                Some(skipped) => Self::skip_body(data, skipped).map(ReplicationMessage::Skipped),
                None => Err(DecodeError::InvalidType(t)),
            },
        }
    }

    fn decode_begin(buf: &mut Bytes) -> Result<BeginBody, DecodeError> {
        need(buf, 20)?;
        buf.advance(8); // final LSN
        let timestamp = buf.get_i64();
        let xid = buf.get_u32();
        Ok(BeginBody { xid, timestamp })
    }

    fn decode_commit(buf: &mut Bytes) -> Result<CommitBody, DecodeError> {
        need(buf, 25)?;
        buf.advance(1); // flags
        let commit_lsn = buf.get_u64();
        buf.advance(8); // end LSN
        let timestamp = buf.get_i64();
        Ok(CommitBody {
            commit_lsn,
            timestamp,
        })
    }

    fn decode_relation(buf: &mut Bytes) -> Result<RelationBody, DecodeError> {
        need(buf, 4)?;
        let id = buf.get_u32();
        let namespace = read_string(buf)?;
        let name = read_string(buf)?;
        need(buf, 3)?;
        let replica_identity = ReplicaIdentity::from_byte(buf.get_u8());
        let num_columns = buf.get_u16() as usize;

        let mut columns = Vec::with_capacity(num_columns.min(buf.remaining()));
        for _ in 0..num_columns {
            need(buf, 1)?;
            let flags = buf.get_u8();
            let col_name = read_string(buf)?;
            need(buf, 8)?;
            let type_id = buf.get_u32();
            buf.advance(4); // type modifier
            columns.push(RelationColumn {
                name: col_name,
                type_id,
                is_key: flags & COLUMN_FLAG_KEY != 0,
            });
        }

        Ok(RelationBody {
            id,
            namespace,
            name,
            replica_identity,
            columns,
        })
    }

    fn decode_type(buf: &mut Bytes) -> Result<TypeBody, DecodeError> {
        need(buf, 4)?;
        let id = buf.get_u32();
        let namespace = read_string(buf)?;
        let name = read_string(buf)?;
        Ok(TypeBody {
            id,
            namespace,
            name,
        })
    }

    fn decode_insert(buf: &mut Bytes) -> Result<InsertBody, DecodeError> {
        need(buf, 5)?;
        let relation_id = buf.get_u32();
        let char_n = buf.get_u8();
        if char_n != b'N' {
            return Err(DecodeError::Protocol("Expected N for new tuple".into()));
        }
        let tuple = decode_tuple(buf)?;
        Ok(InsertBody { relation_id, tuple })
    }

    fn decode_update(buf: &mut Bytes) -> Result<UpdateBody, DecodeError> {
        need(buf, 5)?;
        let relation_id = buf.get_u32();
        let msg_type = buf.get_u8();

        let (key_tuple, new_tuple) = match msg_type {
            b'K' | b'O' => {
                let old = decode_tuple(buf)?;
                need(buf, 1)?;
                let char_n = buf.get_u8();
                if char_n != b'N' {
                    return Err(DecodeError::Protocol(format!(
                        "Expected N after {}",
                        msg_type as char
                    )));
                }
                (Some(old), decode_tuple(buf)?)
            }
            b'N' => (None, decode_tuple(buf)?),
            t => return Err(DecodeError::InvalidType(t)),
        };

        Ok(UpdateBody {
            relation_id,
            key_tuple,
            new_tuple,
        })
    }

    fn decode_delete(buf: &mut Bytes) -> Result<DeleteBody, DecodeError> {
        need(buf, 5)?;
        let relation_id = buf.get_u32();
        let msg_type = buf.get_u8();

        let key_tuple = match msg_type {
            b'K' | b'O' => Some(decode_tuple(buf)?),
            t => return Err(DecodeError::InvalidType(t)),
        };

        Ok(DeleteBody {
            relation_id,
            key_tuple,
        })
    }

    fn skip_body(buf: &mut Bytes, skipped: SkippedMessage) -> Result<SkippedMessage, DecodeError> {
        need(buf, skipped.min_body_len())?;
        buf.advance(buf.remaining());
        Ok(skipped)
    }
}

#[inline]
fn need(buf: &Bytes, n: usize) -> Result<(), DecodeError> {
    if buf.remaining() < n {
        return Err(DecodeError::NotEnoughData);
    }
    Ok(())
}

fn read_string(buf: &mut Bytes) -> Result<String, DecodeError> {
    let n = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::NotEnoughData)?;
    let s_bytes = buf.copy_to_bytes(n);
    buf.advance(1); // skip null
    Ok(std::str::from_utf8(&s_bytes)?.to_string())
}

fn decode_tuple(buf: &mut Bytes) -> Result<Tuple, DecodeError> {
    need(buf, 2)?;
    let num_cols = buf.get_u16() as usize;
    let mut columns = Vec::with_capacity(num_cols.min(buf.remaining()));

    for _ in 0..num_cols {
        need(buf, 1)?;
        let type_code = buf.get_u8();
        let data = match type_code {
            b'n' => TupleData::Null,
            b'u' => TupleData::Toast,
            b't' => {
                need(buf, 4)?;
                let len = buf.get_u32() as usize;
                need(buf, len)?;
                TupleData::Text(buf.copy_to_bytes(len))
            }
            t => return Err(DecodeError::InvalidType(t)),
        };
        columns.push(data);
    }

    Ok(Tuple(columns))
}
