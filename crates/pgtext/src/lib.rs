//! # pgtext - Text serialization of logical replication changes
//!
//! Renders PostgreSQL row changes and transaction boundaries as
//! human-readable text records, one record per event.
//!
//! ## Features
//!
//! - `postgres` - pgoutput decoding and relation tracking (default)
//!
//! ## Dialects
//!
//! - **JSON**: one compact JSON object per record
//! - **Plain**: `test_decoding`-compatible `name[type]:value` lines
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐      ┌─────────────────┐      ┌──────────────┐
//! │ pgoutput  │─────▶│ PgOutputAdapter │─────▶│ ChangeEvent  │
//! │  bytes    │      │ (relation cache)│      │              │
//! └───────────┘      └─────────────────┘      └──────┬───────┘
//!                                                    │
//!                                                    ▼
//!                    ┌─────────────────┐      ┌──────────────┐
//!                    │   RecordSink    │◀─────│ChangeFormatter│
//!                    └─────────────────┘      └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use pgtext::{ChangeEvent, ChangeFormatter, FormatterConfig, TransactionInfo, VecSink};
//! use chrono::Utc;
//!
//! let mut formatter = ChangeFormatter::new(FormatterConfig::plain());
//! let mut sink = VecSink::new();
//!
//! let txn = TransactionInfo::new(741, Utc::now());
//! formatter.handle(&ChangeEvent::Begin(txn), &mut sink)?;
//! formatter.handle(&ChangeEvent::Commit(txn), &mut sink)?;
//!
//! // no row changes: BEGIN was never written, COMMIT still is
//! assert_eq!(sink.texts(), vec!["COMMIT"]);
//! # Ok::<(), pgtext::DecodingError>(())
//! ```
//!
//! ## Public API Organization
//!
//! ### Tier 1: Core Types (crate root)
//! Events, the formatter, its configuration and sinks.
//!
//! ### Tier 2: Advanced Types (`common` module)
//! Individual renderers (row, key, literal) and timestamp helpers.

pub mod common;

// =============================================================================
// TIER 1: Core Types
// =============================================================================

pub use common::{
    // Configuration
    BeginPolicy,
    // Events
    ChangeEvent,
    // Formatting
    ChangeFormatter,
    ChangeKind,
    ChannelSink,
    Column,
    ColumnValue,
    Datum,
    // Error handling
    DecodingError,
    Dialect,
    ErrorCategory,
    FormatterConfig,
    FormatterConfigBuilder,
    FormatterStats,
    // Sinks
    OutputRecord,
    RecordSink,
    RelationIdentity,
    Result,
    RowChange,
    RowTuple,
    TransactionInfo,
    TypeCategory,
    VecSink,
    WriterSink,
};

// =============================================================================
// TIER 2: Advanced Types - Available via `common::` module
// =============================================================================
//   - common::render_row, common::extract_key, common::encode_literal
//   - common::render_begin, common::render_commit, common::render_change
//   - common::ScratchBuffer, common::TransactionState
//   - common::from_pg_micros, common::format_commit_time

// pgoutput decoding - feature-gated
#[cfg(feature = "postgres")]
pub mod postgres;
