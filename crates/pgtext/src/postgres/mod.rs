//! PostgreSQL pgoutput input
//!
//! Supports:
//! - pgoutput protocol v1 messages plus the v2 stream markers
//! - Relation and custom type caching
//! - Replica identity from the column key flags
//!
//! # Architecture
//!
//! ```text
//! pgoutput bytes → PgOutputDecoder → PgOutputAdapter → ChangeEvent
//! ```
//!
//! # Example
//!
//! ```rust
//! use pgtext::postgres::PgOutputAdapter;
//! use pgtext::{ChangeEvent, ChangeFormatter, FormatterConfig, VecSink};
//! use bytes::{BufMut, BytesMut};
//!
//! let mut adapter = PgOutputAdapter::new();
//! let mut formatter = ChangeFormatter::new(FormatterConfig::json());
//! let mut sink = VecSink::new();
//!
//! let mut begin = BytesMut::new();
//! begin.put_u8(b'B');
//! begin.put_u64(0x16B3748); // final LSN
//! begin.put_i64(0);         // commit time
//! begin.put_u32(741);       // xid
//!
//! if let Some(event) = adapter.decode_and_apply(&mut begin.freeze())? {
//!     formatter.handle(&event, &mut sink)?;
//! }
//! assert_eq!(
//!     sink.texts(),
//!     vec![r#"{"type":"transaction.begin","xid":"741","committed":"2000-01-01 00:00:00+00"}"#]
//! );
//! # Ok::<(), pgtext::DecodingError>(())
//! ```

mod adapter;
pub mod protocol;
mod replica_identity;
mod type_mapper;

pub use adapter::*;
pub use protocol::*;
pub use replica_identity::*;
pub use type_mapper::*;
