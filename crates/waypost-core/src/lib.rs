//! # waypost-core
//!
//! Types shared by every waypost crate:
//!
//! - [`Record`] and [`Submission`]: the unit of persistence and the caller data it is built from
//! - [`ResolutionResult`]: outcome of a network address lookup, never absent
//! - [`ReadinessFlag`] / [`Readiness`]: the write-once signal a sink raises when it finishes initializing
//! - [`config`]: configuration loaded from YAML or TOML
//!
//! ## Channels
//!
//! | Record kind | Channel |
//! |-------------|---------|
//! | `LoginAttempt` | `logins` |
//! | `AccountCreationAttempt` | `user_actions` |

pub mod config;
pub mod readiness;
pub mod record;
pub mod resolution;

pub use config::{
    ClientConfig, ConfigError, PersisterConfig, ResolverConfig, SinkBackend, SinkConfig,
    WaypostConfig,
};
pub use readiness::{Readiness, ReadinessFlag, ReadinessState};
pub use record::{Channel, Record, RecordKind, SecretField, Submission, new_session_id};
pub use resolution::{
    EXHAUSTED_ADDRESS, INTERNAL_ERROR_ADDRESS, ResolutionResult, UnavailableReason,
};
