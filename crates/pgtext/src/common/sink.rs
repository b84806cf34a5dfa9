//! Output sinks
//!
//! A sink receives one finished record per call together with a flag telling
//! whether the record closes a flush batch. A lazily written BEGIN is always
//! followed by the change that triggered it, so it is written with
//! `last_write = false`.

use crate::common::{DecodingError, Result};
use std::io::Write;
use tokio::sync::mpsc;

/// Receiver of finished records.
pub trait RecordSink {
    /// Append one record.
    fn write_record(&mut self, record: &str, last_write: bool) -> Result<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, record: &str, last_write: bool) -> Result<()> {
        (**self).write_record(record, last_write)
    }
}

/// A record handed to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub text: String,
    pub last_write: bool,
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct VecSink {
    records: Vec<OutputRecord>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record texts in write order.
    pub fn texts(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    /// Number of flush batches closed so far.
    pub fn flushes(&self) -> usize {
        self.records.iter().filter(|r| r.last_write).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take all records, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<OutputRecord> {
        std::mem::take(&mut self.records)
    }
}

impl RecordSink for VecSink {
    fn write_record(&mut self, record: &str, last_write: bool) -> Result<()> {
        self.records.push(OutputRecord {
            text: record.to_string(),
            last_write,
        });
        Ok(())
    }
}

/// Newline-delimited sink over any writer, flushed at the end of a batch.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for WriterSink<W> {
    fn write_record(&mut self, record: &str, last_write: bool) -> Result<()> {
        self.writer.write_all(record.as_bytes())?;
        self.writer.write_all(b"\n")?;
        if last_write {
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Sink forwarding records to a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<OutputRecord>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<OutputRecord>) -> Self {
        Self { tx }
    }

    /// Create a sink and the receiving half of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutputRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RecordSink for ChannelSink {
    fn write_record(&mut self, record: &str, last_write: bool) -> Result<()> {
        self.tx
            .send(OutputRecord {
                text: record.to_string(),
                last_write,
            })
            .map_err(|_| DecodingError::sink("Record receiver dropped"))
    }
}
