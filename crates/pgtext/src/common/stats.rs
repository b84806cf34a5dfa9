//! Formatter statistics
//!
//! Lock-free counters updated while records are rendered.

use crate::common::ChangeKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of the change record formatter.
#[derive(Debug, Default)]
pub struct FormatterStats {
    begins: AtomicU64,
    commits: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    /// BEGIN records never written (lazy policy, empty transaction)
    suppressed_begins: AtomicU64,
    /// COMMIT records dropped by `skip_empty_commit`
    suppressed_commits: AtomicU64,
    /// Keys rendered as the no-identity sentinel
    degraded_keys: AtomicU64,
    /// Values rendered as the unchanged-toast placeholder
    unchanged_toast_values: AtomicU64,
    /// Total bytes handed to the sink
    bytes_written: AtomicU64,
}

impl FormatterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_begin(&self) {
        self.begins.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_change(&self, kind: ChangeKind) {
        let counter = match kind {
            ChangeKind::Insert => &self.inserts,
            ChangeKind::Update => &self.updates,
            ChangeKind::Delete => &self.deletes,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed_begin(&self) {
        self.suppressed_begins.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed_commit(&self) {
        self.suppressed_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_degraded_key(&self) {
        self.degraded_keys.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unchanged_toast(&self, count: u64) {
        if count > 0 {
            self.unchanged_toast_values
                .fetch_add(count, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_bytes(&self, bytes: usize) {
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// BEGIN records written.
    pub fn begins(&self) -> u64 {
        self.begins.load(Ordering::Relaxed)
    }

    /// COMMIT records written.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Row change records written for `kind`.
    pub fn changes(&self, kind: ChangeKind) -> u64 {
        match kind {
            ChangeKind::Insert => self.inserts.load(Ordering::Relaxed),
            ChangeKind::Update => self.updates.load(Ordering::Relaxed),
            ChangeKind::Delete => self.deletes.load(Ordering::Relaxed),
        }
    }

    /// Row change records written.
    pub fn total_changes(&self) -> u64 {
        self.changes(ChangeKind::Insert)
            + self.changes(ChangeKind::Update)
            + self.changes(ChangeKind::Delete)
    }

    pub fn suppressed_begins(&self) -> u64 {
        self.suppressed_begins.load(Ordering::Relaxed)
    }

    pub fn suppressed_commits(&self) -> u64 {
        self.suppressed_commits.load(Ordering::Relaxed)
    }

    pub fn degraded_keys(&self) -> u64 {
        self.degraded_keys.load(Ordering::Relaxed)
    }

    pub fn unchanged_toast_values(&self) -> u64 {
        self.unchanged_toast_values.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Get summary string.
    pub fn summary(&self) -> String {
        format!(
            "BEGIN: {}, COMMIT: {}, INSERT: {}, UPDATE: {}, DELETE: {}, suppressed begins: {}, \
             suppressed commits: {}, degraded keys: {}, unchanged toast: {}, bytes: {}",
            self.begins(),
            self.commits(),
            self.changes(ChangeKind::Insert),
            self.changes(ChangeKind::Update),
            self.changes(ChangeKind::Delete),
            self.suppressed_begins(),
            self.suppressed_commits(),
            self.degraded_keys(),
            self.unchanged_toast_values(),
            self.bytes_written(),
        )
    }
}
