//! Test harness for pgtext integration tests
//!
//! Features:
//! - Relation and row fixtures for the formatter
//! - A byte-level pgoutput message builder
//! - Idempotent test logging

#![allow(dead_code)]

pub mod pgoutput;

pub use pgoutput::PgOutputBuilder;

use chrono::{DateTime, TimeZone, Utc};
use pgtext::{
    ChangeEvent, ChangeFormatter, Column, ColumnValue, FormatterConfig, RelationIdentity,
    RowTuple, TransactionInfo, TypeCategory, VecSink,
};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize test logging (idempotent)
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("pgtext=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// 2024-01-11 19:06:40 UTC
pub fn commit_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_705_000_000, 0).unwrap()
}

pub fn txn(xid: u32) -> TransactionInfo {
    TransactionInfo::new(xid, commit_time())
}

/// `public.users (id integer, name text)`, optionally keyed on `id`.
pub fn users(keyed: bool) -> Arc<RelationIdentity> {
    let rel = RelationIdentity::new(
        "public",
        "users",
        vec![Column::new("id", 1, "integer"), Column::new("name", 2, "text")],
    );
    Arc::new(if keyed { rel.with_identity_index(vec![1]) } else { rel })
}

pub fn user_row(id: &str, name: &str) -> RowTuple {
    RowTuple::new(vec![
        ColumnValue::text(TypeCategory::Numeric, id),
        ColumnValue::text(TypeCategory::Other, name),
    ])
}

/// Identity tuple of `users`: only `id` is transmitted.
pub fn user_key(id: &str) -> RowTuple {
    RowTuple::new(vec![
        ColumnValue::text(TypeCategory::Numeric, id),
        ColumnValue::null(TypeCategory::Other),
    ])
}

/// Run `events` through a fresh formatter and return the records.
pub fn format(config: FormatterConfig, events: &[ChangeEvent]) -> VecSink {
    let mut formatter = ChangeFormatter::new(config);
    let mut sink = VecSink::new();
    formatter
        .handle_all(events, &mut sink)
        .expect("formatting into a VecSink cannot fail");
    sink
}
