//! Error types for the resolver crate.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while building a resolver.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// An endpoint URI could not be parsed.
    #[error("invalid endpoint {uri}: {reason}")]
    InvalidEndpoint { uri: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Why a single resolution attempt failed. Never surfaced to callers;
/// the resolver logs it and moves to the next endpoint.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("response body is not JSON: {0}")]
    Body(#[source] reqwest::Error),

    #[error("response has no recognized address field")]
    MissingAddress,
}
