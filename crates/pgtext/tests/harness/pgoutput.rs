//! Byte-level pgoutput message builder

use bytes::{BufMut, Bytes, BytesMut};

/// Column of a RELATION message: (name, type oid, is key)
pub type RelationColumnSpec<'a> = (&'a str, u32, bool);

/// Cell of a tuple: `None` is NULL, `Some(None)` unchanged toast.
pub type Cell<'a> = Option<Option<&'a str>>;

pub struct PgOutputBuilder;

impl PgOutputBuilder {
    pub fn begin(xid: u32, pg_micros: i64) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'B');
        buf.put_u64(0x16B_3748);
        buf.put_i64(pg_micros);
        buf.put_u32(xid);
        buf.freeze()
    }

    pub fn commit(pg_micros: i64) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'C');
        buf.put_u8(0);
        buf.put_u64(0x16B_3748);
        buf.put_u64(0x16B_3778);
        buf.put_i64(pg_micros);
        buf.freeze()
    }

    pub fn relation(
        id: u32,
        namespace: &str,
        name: &str,
        replica_identity: u8,
        columns: &[RelationColumnSpec<'_>],
    ) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'R');
        buf.put_u32(id);
        put_cstr(&mut buf, namespace);
        put_cstr(&mut buf, name);
        buf.put_u8(replica_identity);
        buf.put_u16(columns.len() as u16);
        for (col, type_oid, key) in columns {
            buf.put_u8(u8::from(*key));
            put_cstr(&mut buf, col);
            buf.put_u32(*type_oid);
            buf.put_i32(-1);
        }
        buf.freeze()
    }

    pub fn type_message(id: u32, namespace: &str, name: &str) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'Y');
        buf.put_u32(id);
        put_cstr(&mut buf, namespace);
        put_cstr(&mut buf, name);
        buf.freeze()
    }

    pub fn insert(relation_id: u32, cells: &[Cell<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'I');
        buf.put_u32(relation_id);
        buf.put_u8(b'N');
        put_tuple(&mut buf, cells);
        buf.freeze()
    }

    /// UPDATE; `old` is sent as a `K` tuple when present.
    pub fn update(relation_id: u32, old: Option<&[Cell<'_>]>, new: &[Cell<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'U');
        buf.put_u32(relation_id);
        if let Some(old) = old {
            buf.put_u8(b'K');
            put_tuple(&mut buf, old);
        }
        buf.put_u8(b'N');
        put_tuple(&mut buf, new);
        buf.freeze()
    }

    pub fn delete(relation_id: u32, key: &[Cell<'_>]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'D');
        buf.put_u32(relation_id);
        buf.put_u8(b'K');
        put_tuple(&mut buf, key);
        buf.freeze()
    }

    pub fn truncate(relation_ids: &[u32]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(b'T');
        buf.put_u32(relation_ids.len() as u32);
        buf.put_u8(0);
        for id in relation_ids {
            buf.put_u32(*id);
        }
        buf.freeze()
    }
}

fn put_cstr(buf: &mut BytesMut, s: &str) {
    buf.put_slice(s.as_bytes());
    buf.put_u8(0);
}

fn put_tuple(buf: &mut BytesMut, cells: &[Cell<'_>]) {
    buf.put_u16(cells.len() as u16);
    for cell in cells {
        match cell {
            None => buf.put_u8(b'n'),
            Some(None) => buf.put_u8(b'u'),
            Some(Some(text)) => {
                buf.put_u8(b't');
                buf.put_u32(text.len() as u32);
                buf.put_slice(text.as_bytes());
            }
        }
    }
}
