//! Per-event scratch buffer
//!
//! Every record is rendered into one reusable buffer. [`ScratchBuffer::scope`]
//! hands out a guard; dropping the guard clears the buffer, so nothing
//! rendered for one event survives into the next, whichever way the
//! rendering call returns.

use std::ops::{Deref, DerefMut};

/// Initial capacity of the record buffer.
const INITIAL_CAPACITY: usize = 1024;

/// Reusable record buffer.
#[derive(Debug)]
pub struct ScratchBuffer {
    buf: String,
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Acquire the buffer for one event.
    pub fn scope(&mut self) -> ScratchScope<'_> {
        self.buf.clear();
        ScratchScope { buf: &mut self.buf }
    }

    /// Whether the buffer currently holds text. Always false between events.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

/// Guard over the scratch buffer for the duration of one event.
#[derive(Debug)]
pub struct ScratchScope<'a> {
    buf: &'a mut String,
}

impl Deref for ScratchScope<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        self.buf
    }
}

impl DerefMut for ScratchScope<'_> {
    fn deref_mut(&mut self) -> &mut String {
        self.buf
    }
}

impl Drop for ScratchScope<'_> {
    fn drop(&mut self) {
        self.buf.clear();
    }
}
