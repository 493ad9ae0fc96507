//! In-process sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;
use waypost_core::{Channel, Record};

use crate::error::SinkError;
use crate::sink::{AppendReceipt, MonotonicClock, Sink, StoredRecord};

/// Sink that keeps records in memory, grouped by channel.
#[derive(Debug, Default)]
pub struct MemorySink {
    initialized: AtomicBool,
    reject_with: Option<String>,
    records: RwLock<BTreeMap<Channel, Vec<StoredRecord>>>,
    append_calls: AtomicUsize,
    clock: MonotonicClock,
}

impl MemorySink {
    /// An initialized sink.
    pub fn new() -> Self {
        let sink = Self::uninitialized();
        sink.mark_initialized();
        sink
    }

    /// A sink that reports itself as not yet initialized.
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// An initialized sink that rejects every append with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        let sink = Self {
            reject_with: Some(reason.into()),
            ..Self::default()
        };
        sink.mark_initialized();
        sink
    }

    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Records stored on `channel`, in append order.
    pub fn records(&self, channel: Channel) -> Vec<StoredRecord> {
        self.records
            .read()
            .map(|r| r.get(&channel).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Number of `append` calls, including rejected ones.
    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn append(&self, channel: Channel, record: &Record) -> Result<AppendReceipt, SinkError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);

        if !self.is_initialized() {
            return Err(SinkError::NotInitialized);
        }
        if let Some(reason) = &self.reject_with {
            return Err(SinkError::Rejected(reason.clone()));
        }

        let id = Uuid::new_v4().to_string();
        let mut records = self
            .records
            .write()
            .map_err(|e| SinkError::Rejected(format!("Failed to acquire write lock: {}", e)))?;
        records.entry(channel).or_default().push(StoredRecord {
            id: id.clone(),
            channel,
            record: record.clone(),
        });

        Ok(AppendReceipt { id })
    }
}
