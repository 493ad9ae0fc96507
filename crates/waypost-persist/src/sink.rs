//! Sink interfaces.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::warn;
use waypost_core::{Channel, Record};

use crate::error::SinkError;

/// Identifier the sink assigned to an appended record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendReceipt {
    pub id: String,
}

/// A record as held by a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub channel: Channel,
    pub record: Record,
}

/// Append-only primary store.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Whether the sink finished initializing and accepts writes.
    fn is_initialized(&self) -> bool;

    /// Sink-assigned timestamp for a new record.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Append a record to `channel`.
    async fn append(&self, channel: Channel, record: &Record) -> Result<AppendReceipt, SinkError>;
}

/// Local acknowledgement used when the primary sink is unavailable.
///
/// Implementations must not fail; the signature has no error path.
#[async_trait]
pub trait FallbackSink: Send + Sync {
    async fn append(&self, record: &Record);
}

/// Fallback that only logs the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFallback;

#[async_trait]
impl FallbackSink for LogFallback {
    async fn append(&self, record: &Record) {
        match serde_json::to_string(record) {
            Ok(json) => warn!(
                kind = %record.kind(),
                session_id = %record.session_id(),
                record = %json,
                "Sink unavailable, record logged only"
            ),
            Err(e) => warn!(
                kind = %record.kind(),
                session_id = %record.session_id(),
                error = %e,
                "Sink unavailable, record could not be rendered"
            ),
        }
    }
}

/// Strictly increasing wall clock for sink timestamps.
#[derive(Debug, Default)]
pub(crate) struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub(crate) fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let Ok(mut last) = self.last.lock() else {
            return now;
        };
        let next = match *last {
            Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}
