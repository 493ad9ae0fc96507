//! Deferred, readiness-gated persistence.
//!
//! Every save runs its own instance of this state machine:
//!
//! ```text
//! WaitingReady -> Resolving -> Committing -> Done
//! WaitingReady -> TimedOutAbandoned
//! ```
//!
//! A readiness timeout drops the record. Nothing is queued or retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use waypost_core::{
    Channel, PersisterConfig, Readiness, Record, RecordKind, Submission, new_session_id,
};
use waypost_resolver::Resolver;

use crate::sink::{FallbackSink, Sink};

/// States of a single save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    WaitingReady,
    Resolving,
    Committing,
    Done,
    TimedOutAbandoned,
}

impl std::fmt::Display for SaveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingReady => write!(f, "WAITING_READY"),
            Self::Resolving => write!(f, "RESOLVING"),
            Self::Committing => write!(f, "COMMITTING"),
            Self::Done => write!(f, "DONE"),
            Self::TimedOutAbandoned => write!(f, "TIMED_OUT_ABANDONED"),
        }
    }
}

/// How a save ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// The primary sink accepted the record.
    Committed { channel: Channel, id: String },
    /// The primary sink refused the record. Not retried, not sent to the fallback.
    Rejected { channel: Channel, error: String },
    /// No usable primary sink; the fallback acknowledged the record.
    FellBack,
    /// The sink never became ready; the record was dropped.
    Abandoned,
}

/// A state entered during a save, with the time since the save started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub state: SaveState,
    pub at: Duration,
}

/// Summary of one finished save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub kind: RecordKind,
    /// The committed record; `None` when the save was abandoned.
    pub record: Option<Record>,
    pub outcome: SaveOutcome,
    pub transitions: Vec<Transition>,
}

impl SaveReport {
    /// When `state` was entered, if it was.
    pub fn entered(&self, state: SaveState) -> Option<Duration> {
        self.transitions
            .iter()
            .find(|t| t.state == state)
            .map(|t| t.at)
    }

    pub fn final_state(&self) -> Option<SaveState> {
        self.transitions.last().map(|t| t.state)
    }
}

/// Defers record writes until the sink is ready, then commits them.
///
/// Cloning is cheap; clones share the resolver client, sinks and readiness
/// signal but no per-save state.
#[derive(Clone)]
pub struct DeferredPersister {
    resolver: Resolver,
    readiness: Arc<dyn Readiness>,
    sink: Option<Arc<dyn Sink>>,
    fallback: Arc<dyn FallbackSink>,
    config: PersisterConfig,
    observer: Option<mpsc::UnboundedSender<SaveReport>>,
}

impl DeferredPersister {
    /// Create a persister with no primary sink handle. Until
    /// [`with_sink`](Self::with_sink) is used every record goes to `fallback`.
    pub fn new(
        resolver: Resolver,
        readiness: Arc<dyn Readiness>,
        fallback: Arc<dyn FallbackSink>,
    ) -> Self {
        Self {
            resolver,
            readiness,
            sink: None,
            fallback,
            config: PersisterConfig::default(),
            observer: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_config(mut self, config: PersisterConfig) -> Self {
        self.config = config;
        self
    }

    /// Receive a [`SaveReport`] for every [`save`](Self::save) that finishes.
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<SaveReport>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &PersisterConfig {
        &self.config
    }

    /// Persist a record for `kind` in the background.
    ///
    /// Returns immediately. The caller gets no completion signal; the
    /// observer, if set, receives the report.
    pub fn save(&self, kind: RecordKind, submission: Submission) {
        let this = self.clone();
        tokio::spawn(async move {
            let report = this.run(kind, submission).await;
            if let Some(observer) = &this.observer {
                let _ = observer.send(report);
            }
        });
    }

    /// Run a save to completion and return its report.
    pub async fn save_and_wait(&self, kind: RecordKind, submission: Submission) -> SaveReport {
        self.run(kind, submission).await
    }

    async fn run(&self, kind: RecordKind, submission: Submission) -> SaveReport {
        let started = Instant::now();
        let mut transitions = Vec::with_capacity(4);
        let mut enter = |state: SaveState| {
            debug!(kind = %kind, state = %state, "Save state");
            transitions.push(Transition {
                state,
                at: started.elapsed(),
            });
        };

        enter(SaveState::WaitingReady);
        if !self.wait_ready(started).await {
            warn!(
                kind = %kind,
                waited_ms = started.elapsed().as_millis() as u64,
                "Sink readiness timed out, record not saved"
            );
            enter(SaveState::TimedOutAbandoned);
            return SaveReport {
                kind,
                record: None,
                outcome: SaveOutcome::Abandoned,
                transitions,
            };
        }

        enter(SaveState::Resolving);
        let address = self.resolver.resolve().await;

        enter(SaveState::Committing);
        let timestamp = self.sink.as_ref().map_or_else(Utc::now, |sink| sink.now());
        let record = Record::assemble(kind, submission, &address, timestamp, new_session_id());
        let outcome = self.commit(&record).await;

        enter(SaveState::Done);
        SaveReport {
            kind,
            record: Some(record),
            outcome,
            transitions,
        }
    }

    /// Poll readiness until it settles or `max_wait` has elapsed since `started`.
    async fn wait_ready(&self, started: Instant) -> bool {
        loop {
            if self.readiness.state().is_settled() {
                return true;
            }
            if started.elapsed() >= self.config.max_wait() {
                return false;
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn commit(&self, record: &Record) -> SaveOutcome {
        let channel = record.channel();

        match &self.sink {
            Some(sink) if sink.is_initialized() => match sink.append(channel, record).await {
                Ok(receipt) => {
                    info!(
                        channel = %channel,
                        record_id = %receipt.id,
                        session_id = %record.session_id(),
                        "Record saved"
                    );
                    SaveOutcome::Committed {
                        channel,
                        id: receipt.id,
                    }
                }
                Err(e) => {
                    error!(
                        channel = %channel,
                        session_id = %record.session_id(),
                        error = %e,
                        "Sink rejected record"
                    );
                    SaveOutcome::Rejected {
                        channel,
                        error: e.to_string(),
                    }
                }
            },
            _ => {
                self.fallback.append(record).await;
                SaveOutcome::FellBack
            }
        }
    }
}
