//! # waypost-persist
//!
//! Readiness-gated persistence of [`Record`](waypost_core::Record)s.
//!
//! A [`DeferredPersister`] waits for the sink's readiness signal (bounded
//! by a deadline), resolves the client address once, assembles the record
//! and commits it:
//!
//! | Sink state | Path | Outcome |
//! |------------|------|---------|
//! | never ready before the deadline | none | `Abandoned` |
//! | handle present and initialized | `Sink::append` on the kind's channel | `Committed` / `Rejected` |
//! | handle missing or not initialized | `FallbackSink::append` | `FellBack` |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use waypost_core::{ReadinessFlag, RecordKind, ResolverConfig, Submission};
//! use waypost_persist::{DeferredPersister, LogFallback, MemorySink};
//! use waypost_resolver::Resolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let readiness = ReadinessFlag::ready();
//! let persister = DeferredPersister::new(
//!     Resolver::new(&ResolverConfig::default())?,
//!     Arc::new(readiness),
//!     Arc::new(LogFallback),
//! )
//! .with_sink(Arc::new(MemorySink::new()));
//!
//! // Fire and forget.
//! persister.save(
//!     RecordKind::LoginAttempt,
//!     Submission::new("user@example.com").client_context("Mozilla/5.0"),
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file;
pub mod memory;
pub mod persister;
pub mod sink;

pub use error::SinkError;
pub use file::FileSink;
pub use memory::MemorySink;
pub use persister::{DeferredPersister, SaveOutcome, SaveReport, SaveState, Transition};
pub use sink::{AppendReceipt, FallbackSink, LogFallback, Sink, StoredRecord};
