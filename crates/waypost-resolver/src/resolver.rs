//! Sequential, first-success-wins address resolution.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, warn};
use waypost_core::{ResolutionResult, ResolverConfig, UnavailableReason};

use crate::endpoint::ServiceEndpoint;
use crate::error::{AttemptError, ResolverError};

/// Response fields that may hold the address, checked in order.
pub const RECOGNIZED_FIELDS: &[&str] = &["ip", "address", "origin"];

/// Resolves the client's network address from an ordered list of endpoints.
///
/// Endpoints are tried one at a time. Each attempt has its own timeout and
/// a failed attempt is never retried; the first usable answer wins. Worst
/// case wall-clock time is `endpoints × attempt_timeout`.
#[derive(Debug, Clone)]
pub struct Resolver {
    client: Client,
    endpoints: Vec<ServiceEndpoint>,
    attempt_timeout: Duration,
}

impl Resolver {
    /// Build a resolver from configuration.
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolverError> {
        let endpoints = ServiceEndpoint::parse_all(&config.endpoints)?;
        Self::with_endpoints(endpoints, config.attempt_timeout())
    }

    /// Build a resolver for explicit endpoints.
    pub fn with_endpoints(
        endpoints: Vec<ServiceEndpoint>,
        attempt_timeout: Duration,
    ) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ResolverError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoints,
            attempt_timeout,
        })
    }

    pub fn endpoints(&self) -> &[ServiceEndpoint] {
        &self.endpoints
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Resolve using the configured endpoints and timeout.
    pub async fn resolve(&self) -> ResolutionResult {
        self.resolve_candidates(&self.endpoints, self.attempt_timeout)
            .await
    }

    /// Resolve against `endpoints` in order, bounding each attempt by
    /// `attempt_timeout`.
    pub async fn resolve_candidates(
        &self,
        endpoints: &[ServiceEndpoint],
        attempt_timeout: Duration,
    ) -> ResolutionResult {
        let client = self.client.clone();
        let candidates = endpoints.to_vec();
        let started = Instant::now();

        // The loop runs on its own task so a panic inside it degrades to
        // `Unavailable` instead of unwinding into the caller.
        let handle = tokio::spawn(async move {
            first_address(&client, &candidates, attempt_timeout).await
        });

        settle(handle.await, endpoints.len(), started)
    }
}

/// Map the joined attempt loop onto a [`ResolutionResult`].
fn settle(
    joined: Result<Option<String>, JoinError>,
    candidates: usize,
    started: Instant,
) -> ResolutionResult {
    match joined {
        Ok(Some(address)) => ResolutionResult::Address(address),
        Ok(None) => {
            warn!(
                candidates,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Address resolution exhausted all candidates"
            );
            ResolutionResult::Unavailable(UnavailableReason::AllCandidatesExhausted)
        }
        Err(e) => {
            warn!(error = %e, "Address resolution failed unexpectedly");
            ResolutionResult::Unavailable(UnavailableReason::ResolverInternalError(e.to_string()))
        }
    }
}

async fn first_address(
    client: &Client,
    endpoints: &[ServiceEndpoint],
    attempt_timeout: Duration,
) -> Option<String> {
    for endpoint in endpoints {
        match attempt(client, endpoint, attempt_timeout).await {
            Ok(address) => {
                debug!(endpoint = %endpoint, address = %address, "Address resolved");
                return Some(address);
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Address lookup attempt failed");
            }
        }
    }
    None
}

async fn attempt(
    client: &Client,
    endpoint: &ServiceEndpoint,
    attempt_timeout: Duration,
) -> Result<String, AttemptError> {
    tokio::time::timeout(attempt_timeout, fetch(client, endpoint))
        .await
        .map_err(|_| AttemptError::Timeout(attempt_timeout))?
}

async fn fetch(client: &Client, endpoint: &ServiceEndpoint) -> Result<String, AttemptError> {
    let response = client
        .get(endpoint.url().clone())
        .send()
        .await
        .map_err(AttemptError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(AttemptError::Status(status.as_u16()));
    }

    let body: Value = response.json().await.map_err(AttemptError::Body)?;
    extract_address(&body).ok_or(AttemptError::MissingAddress)
}

/// Pull the address out of a lookup response.
///
/// Returns the first non-empty string under [`RECOGNIZED_FIELDS`]. A
/// comma-separated value (a proxy chain) yields its first element.
pub fn extract_address(body: &Value) -> Option<String> {
    RECOGNIZED_FIELDS.iter().find_map(|field| {
        body.get(field)
            .and_then(Value::as_str)
            .and_then(|raw| raw.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
