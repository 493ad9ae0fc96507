//! Sink readiness signal.
//!
//! A sink raises the signal exactly once when its initialization finishes.
//! Readers only ever observe `Pending -> Ready` or `Pending -> Failed`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

const PENDING: u8 = 0;
const READY: u8 = 1;
const FAILED: u8 = 2;

/// Observed state of the readiness signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    /// Initialization has not finished.
    Pending,
    /// The sink finished initializing and accepts writes.
    Ready,
    /// Initialization finished without a usable sink.
    Failed,
}

impl ReadinessState {
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Read side of the readiness signal, injected into consumers.
pub trait Readiness: Send + Sync {
    fn state(&self) -> ReadinessState;
}

/// Write-once readiness flag shared between a sink and its consumers.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct ReadinessFlag {
    state: Arc<AtomicU8>,
}

impl ReadinessFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that is already settled as ready.
    pub fn ready() -> Self {
        let flag = Self::new();
        flag.mark_ready();
        flag
    }

    /// Settle as ready. Returns `false` if the flag was already settled.
    pub fn mark_ready(&self) -> bool {
        self.settle(READY)
    }

    /// Settle as failed. Returns `false` if the flag was already settled.
    pub fn mark_failed(&self) -> bool {
        self.settle(FAILED)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReadinessState::Ready
    }

    fn settle(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Readiness for ReadinessFlag {
    fn state(&self) -> ReadinessState {
        match self.state.load(Ordering::Acquire) {
            PENDING => ReadinessState::Pending,
            READY => ReadinessState::Ready,
            _ => ReadinessState::Failed,
        }
    }
}
