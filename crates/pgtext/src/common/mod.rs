//! # Common formatting types
//!
//! Everything needed to turn already-decoded change events into text
//! records, independent of where the events come from:
//!
//! - [`ChangeEvent`] - Transaction boundaries and row changes
//! - [`FormatterConfig`] - Dialect and BEGIN/COMMIT policy
//! - [`ChangeFormatter`] - Stateful event-to-record driver
//! - [`RecordSink`] - Destination of finished records
//! - [`FormatterStats`] - Counters of what was written and suppressed
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Common Module                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ChangeFormatter ←─── BEGIN / COMMIT policy, scratch buffer │
//! │  Row renderer    ←─── Visible columns, NULL, unchanged toast│
//! │  Key extractor   ←─── Identity index order, sentinels       │
//! │  Literal encoder ←─── Numeric, bit string, boolean, string  │
//! │  RecordSink      ←─── Vec, writer, tokio channel            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod event;
mod formatter;
pub mod key;
pub mod literal;
pub mod row;
mod scratch;
mod sink;
mod stats;
pub mod timestamp;
mod transaction;

pub use config::*;
pub use error::*;
pub use event::*;
pub use formatter::*;
pub use key::{extract_key, KeyOutcome, JSON_NO_IDENTITY, PLAIN_NO_TUPLE_DATA};
pub use literal::{encode_literal, literal, push_identifier, push_json_string, push_sql_string};
pub use row::{push_value, render_row, JSON_UNCHANGED_TOAST, PLAIN_UNCHANGED_TOAST};
pub use scratch::*;
pub use sink::*;
pub use stats::*;
pub use timestamp::{format_commit_time, from_pg_micros, PG_EPOCH_OFFSET_SECS};
pub use transaction::*;
