//! # Per-transaction state
//!
//! Tracks the transaction currently being formatted:
//!
//! ```text
//! Idle ──BEGIN──▶ Open ──COMMIT──▶ Idle
//! ```
//!
//! The lazy BEGIN policy reads `changes_emitted` to decide whether the
//! deferred BEGIN record still has to be written before a row change.

use crate::common::TransactionInfo;
use tracing::warn;

/// State of the transaction being formatted.
#[derive(Debug, Default)]
pub struct TransactionState {
    current: Option<TransactionInfo>,
    changes_emitted: bool,
    begin_emitted: bool,
}

impl TransactionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction, discarding any transaction left open.
    pub fn begin(&mut self, txn: TransactionInfo) {
        if let Some(open) = &self.current {
            warn!(
                "BEGIN for xid {} while xid {} is still open; discarding it",
                txn.xid, open.xid
            );
        }
        self.current = Some(txn);
        self.changes_emitted = false;
        self.begin_emitted = false;
    }

    /// Record that the BEGIN record has been written.
    pub fn mark_begin_emitted(&mut self) {
        self.begin_emitted = true;
    }

    /// Record a row change; returns true for the first change of the
    /// transaction.
    pub fn mark_change(&mut self) -> bool {
        let first = !self.changes_emitted;
        self.changes_emitted = true;
        first
    }

    /// Close the transaction, returning whether it carried row changes.
    pub fn commit(&mut self, xid: u32) -> bool {
        match &self.current {
            Some(open) if open.xid != xid => {
                warn!("COMMIT for xid {} while xid {} is open", xid, open.xid);
            }
            None => warn!("COMMIT for xid {} without open transaction", xid),
            _ => {}
        }
        let had_changes = self.changes_emitted;
        self.reset();
        had_changes
    }

    /// Drop all state.
    pub fn reset(&mut self) {
        self.current = None;
        self.changes_emitted = false;
        self.begin_emitted = false;
    }

    /// Open transaction, if any.
    pub fn current(&self) -> Option<&TransactionInfo> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn changes_emitted(&self) -> bool {
        self.changes_emitted
    }

    pub fn begin_emitted(&self) -> bool {
        self.begin_emitted
    }

    /// The BEGIN of the open transaction has not been written yet.
    pub fn begin_pending(&self) -> bool {
        self.current.is_some() && !self.begin_emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn txn(xid: u32) -> TransactionInfo {
        TransactionInfo::new(xid, Utc::now())
    }

    #[test]
    fn test_lifecycle() {
        let mut state = TransactionState::new();
        assert!(!state.is_open());
        assert!(!state.begin_pending());

        state.begin(txn(7));
        assert!(state.is_open());
        assert!(state.begin_pending());
        assert!(!state.changes_emitted());

        assert!(state.mark_change());
        assert!(!state.mark_change());
        assert!(state.changes_emitted());

        state.mark_begin_emitted();
        assert!(!state.begin_pending());

        assert!(state.commit(7));
        assert!(!state.is_open());
        assert!(!state.changes_emitted());
    }

    #[test]
    fn test_empty_transaction() {
        let mut state = TransactionState::new();
        state.begin(txn(8));
        assert!(!state.commit(8));
    }

    #[test]
    fn test_begin_resets_previous() {
        let mut state = TransactionState::new();
        state.begin(txn(1));
        state.mark_change();
        state.mark_begin_emitted();

        state.begin(txn(2));
        assert_eq!(state.current().map(|t| t.xid), Some(2));
        assert!(!state.changes_emitted());
        assert!(!state.begin_emitted());
    }

    #[test]
    fn test_commit_while_idle() {
        let mut state = TransactionState::new();
        assert!(!state.commit(3));
        assert!(!state.is_open());
    }
}
