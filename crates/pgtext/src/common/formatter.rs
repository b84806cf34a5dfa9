//! # Change record formatter
//!
//! Turns [`ChangeEvent`]s into finished text records and hands them to a
//! [`RecordSink`], one record per call, in delivery order.
//!
//! ## Records
//!
//! ```text
//! JSON:
//! {"type":"transaction.begin","xid":"741","committed":"2024-01-11 19:06:40+00"}
//! {"type":"table","schema":"public","name":"users","change":"UPDATE","key":{"id":1},"data":{"id":1,"name":"Bob"}}
//! {"type":"transaction.commit","xid":"741","committed":"2024-01-11 19:06:40+00"}
//!
//! plain:
//! BEGIN (testing)
//! table public.users: UPDATE: id[integer]:1 name[text]:'Bob'
//! COMMIT
//! ```
//!
//! ## BEGIN policies
//!
//! - **Eager** writes BEGIN as soon as the transaction starts.
//! - **Lazy** holds BEGIN back until the first row change; a transaction
//!   without row changes never gets one. COMMIT is still written unless
//!   `skip_empty_commit` is set.
//!
//! ## Usage
//!
//! ```rust
//! use pgtext::common::{ChangeFormatter, FormatterConfig, VecSink};
//!
//! let mut formatter = ChangeFormatter::new(FormatterConfig::plain());
//! let mut sink = VecSink::new();
//! # let events: Vec<pgtext::ChangeEvent> = Vec::new();
//! for event in &events {
//!     formatter.handle(event, &mut sink)?;
//! }
//! # Ok::<(), pgtext::DecodingError>(())
//! ```

use crate::common::literal::{push_identifier, push_json_string};
use crate::common::key::{extract_key, KeyOutcome, PLAIN_NO_TUPLE_DATA};
use crate::common::row::render_row;
use crate::common::scratch::ScratchBuffer;
use crate::common::timestamp::format_commit_time;
use crate::common::{
    BeginPolicy, ChangeEvent, ChangeKind, Column, Dialect, FormatterConfig, FormatterStats,
    KeySource, RecordSink, Result, RowChange, RowTuple, TransactionInfo, TransactionState,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Plain dialect BEGIN line when xids are not printed.
pub const PLAIN_BEGIN: &str = "BEGIN (testing)";

/// What rendering a row change produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeSummary {
    /// Outcome of the key section, when one was written
    pub key: Option<KeyOutcome>,
    /// Unchanged-toast placeholders in the data section
    pub unchanged_toast: u64,
}

/// Stateful driver turning change events into records.
pub struct ChangeFormatter {
    config: FormatterConfig,
    state: TransactionState,
    scratch: ScratchBuffer,
    stats: Arc<FormatterStats>,
}

impl ChangeFormatter {
    /// Create a formatter. The configuration is expected to be validated.
    pub fn new(config: FormatterConfig) -> Self {
        Self {
            config,
            state: TransactionState::new(),
            scratch: ScratchBuffer::new(),
            stats: Arc::new(FormatterStats::new()),
        }
    }

    /// Get configuration.
    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Get statistics.
    pub fn stats(&self) -> &Arc<FormatterStats> {
        &self.stats
    }

    /// State of the transaction being formatted.
    pub fn transaction(&self) -> &TransactionState {
        &self.state
    }

    /// Format one event, writing zero, one or two records to `sink`.
    pub fn handle<S: RecordSink + ?Sized>(&mut self, event: &ChangeEvent, sink: &mut S) -> Result<()> {
        debug!("Formatting {} event", event.label());
        match event {
            ChangeEvent::Begin(txn) => self.on_begin(txn, sink),
            ChangeEvent::Commit(txn) => self.on_commit(txn, sink),
            ChangeEvent::RowChange(change) => self.on_change(change, sink),
        }
    }

    /// Format a sequence of events.
    pub fn handle_all<'a, S: RecordSink + ?Sized>(
        &mut self,
        events: impl IntoIterator<Item = &'a ChangeEvent>,
        sink: &mut S,
    ) -> Result<()> {
        for event in events {
            self.handle(event, sink)?;
        }
        Ok(())
    }

    fn on_begin<S: RecordSink + ?Sized>(&mut self, txn: &TransactionInfo, sink: &mut S) -> Result<()> {
        self.state.begin(*txn);
        if self.config.begin_policy == BeginPolicy::Eager {
            self.write_begin(txn, true, sink)?;
        }
        Ok(())
    }

    fn write_begin<S: RecordSink + ?Sized>(
        &mut self,
        txn: &TransactionInfo,
        last_write: bool,
        sink: &mut S,
    ) -> Result<()> {
        let mut record = self.scratch.scope();
        render_begin(&mut record, txn, &self.config);
        sink.write_record(&record, last_write)?;
        self.stats.record_bytes(record.len());
        self.stats.record_begin();
        self.state.mark_begin_emitted();
        Ok(())
    }

    fn on_change<S: RecordSink + ?Sized>(&mut self, change: &RowChange, sink: &mut S) -> Result<()> {
        if !self.state.is_open() {
            warn!(
                "{} on {} outside of a transaction",
                change.kind,
                change.relation.qualified_name()
            );
        }
        self.state.mark_change();

        if self.state.begin_pending() {
            if let Some(txn) = self.state.current().copied() {
                self.write_begin(&txn, false, sink)?;
            }
        }

        let mut record = self.scratch.scope();
        let summary = render_change(&mut record, change, self.config.dialect);
        sink.write_record(&record, true)?;

        self.stats.record_bytes(record.len());
        self.stats.record_change(change.kind);
        self.stats.record_unchanged_toast(summary.unchanged_toast);
        if summary.key == Some(KeyOutcome::NoIdentity) {
            self.stats.record_degraded_key();
        }
        Ok(())
    }

    fn on_commit<S: RecordSink + ?Sized>(&mut self, txn: &TransactionInfo, sink: &mut S) -> Result<()> {
        let had_changes = self.state.commit(txn.xid);
        if !had_changes && self.config.begin_policy == BeginPolicy::Lazy {
            self.stats.record_suppressed_begin();
            if self.config.skip_empty_commit {
                debug!("Skipping empty transaction {}", txn.xid);
                self.stats.record_suppressed_commit();
                return Ok(());
            }
        }

        let mut record = self.scratch.scope();
        render_commit(&mut record, txn, &self.config);
        sink.write_record(&record, true)?;
        self.stats.record_bytes(record.len());
        self.stats.record_commit();
        Ok(())
    }
}

impl std::fmt::Debug for ChangeFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFormatter")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

/// Append the BEGIN record of `txn`.
pub fn render_begin(out: &mut String, txn: &TransactionInfo, config: &FormatterConfig) {
    match config.dialect {
        Dialect::Json => push_json_boundary(out, "transaction.begin", txn),
        Dialect::Plain if config.include_xids => {
            out.push_str("BEGIN ");
            out.push_str(&txn.xid.to_string());
        }
        Dialect::Plain => out.push_str(PLAIN_BEGIN),
    }
}

/// Append the COMMIT record of `txn`.
pub fn render_commit(out: &mut String, txn: &TransactionInfo, config: &FormatterConfig) {
    match config.dialect {
        Dialect::Json => push_json_boundary(out, "transaction.commit", txn),
        Dialect::Plain => {
            out.push_str("COMMIT");
            if config.include_xids {
                out.push(' ');
                out.push_str(&txn.xid.to_string());
            }
            if config.include_timestamp {
                out.push_str(" (at ");
                out.push_str(&format_commit_time(&txn.commit_time));
                out.push(')');
            }
        }
    }
}

fn push_json_boundary(out: &mut String, kind: &str, txn: &TransactionInfo) {
    out.push_str("{\"type\":\"");
    out.push_str(kind);
    out.push_str("\",\"xid\":\"");
    out.push_str(&txn.xid.to_string());
    out.push_str("\",\"committed\":\"");
    out.push_str(&format_commit_time(&txn.commit_time));
    out.push_str("\"}");
}

/// Append the record of one row change.
pub fn render_change(out: &mut String, change: &RowChange, dialect: Dialect) -> ChangeSummary {
    match dialect {
        Dialect::Json => render_json_change(out, change),
        Dialect::Plain => render_plain_change(out, change),
    }
}

fn render_json_change(out: &mut String, change: &RowChange) -> ChangeSummary {
    let relation = change.relation.as_ref();
    let mut summary = ChangeSummary::default();

    out.push_str("{\"type\":\"table\",\"schema\":");
    push_json_string(out, &relation.schema_name);
    out.push_str(",\"name\":");
    push_json_string(out, &relation.table_name);
    out.push_str(",\"change\":\"");
    out.push_str(change.kind.as_str());
    out.push('"');

    if change.kind.has_key() {
        out.push_str(",\"key\":");
        summary.key = Some(extract_key(out, relation, change.key_tuple(), Dialect::Json));
    }

    if change.kind.has_data() {
        out.push_str(",\"data\":");
        summary.unchanged_toast = push_row_or_marker(out, change, Dialect::Json);
    }

    out.push('}');
    summary
}

fn render_plain_change(out: &mut String, change: &RowChange) -> ChangeSummary {
    let relation = change.relation.as_ref();
    let mut summary = ChangeSummary::default();

    out.push_str("table ");
    push_identifier(out, &relation.schema_name);
    out.push('.');
    push_identifier(out, &relation.table_name);
    out.push_str(": ");
    out.push_str(change.kind.as_str());
    out.push_str(": ");

    match change.kind {
        ChangeKind::Insert => {
            summary.unchanged_toast = push_row_or_marker(out, change, Dialect::Plain);
        }
        ChangeKind::Update => {
            if let Some(old_row) = &change.old_row {
                out.push_str("old-key: ");
                summary.key = Some(extract_key(
                    out,
                    relation,
                    Some((old_row, KeySource::OldRow)),
                    Dialect::Plain,
                ));
                out.push_str(" new-tuple: ");
            }
            summary.unchanged_toast = push_row_or_marker(out, change, Dialect::Plain);
        }
        ChangeKind::Delete => {
            summary.key = Some(extract_key(out, relation, change.key_tuple(), Dialect::Plain));
        }
    }
    summary
}

/// Render `new_row`, or the missing-data marker when it was not captured.
fn push_row_or_marker(out: &mut String, change: &RowChange, dialect: Dialect) -> u64 {
    match &change.new_row {
        Some(row) => {
            render_row(out, &change.relation.columns, row, false, dialect);
            count_unchanged_toast(&change.relation.columns, row)
        }
        None => {
            out.push_str(match dialect {
                Dialect::Json => "null",
                Dialect::Plain => PLAIN_NO_TUPLE_DATA,
            });
            0
        }
    }
}

/// Unchanged-toast placeholders `render_row` writes for `row`.
fn count_unchanged_toast(columns: &[Column], row: &RowTuple) -> u64 {
    columns
        .iter()
        .zip(row.values.iter())
        .filter(|(column, value)| column.is_visible() && value.is_unchanged_toast())
        .count() as u64
}
