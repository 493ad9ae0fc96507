//! Address resolution command.
//!
//! `waypost resolve` - Query the configured lookup services and print the address.

use std::time::Duration;

use waypost_core::{ResolutionResult, ResolverConfig};
use waypost_resolver::{Resolver, ServiceEndpoint};

/// Resolve the client address.
///
/// `endpoints` and `timeout_ms` override the configured values when given.
/// The result is printed and also returned.
pub async fn run(
    config: &ResolverConfig,
    endpoints: Vec<String>,
    timeout_ms: Option<u64>,
    json: bool,
) -> anyhow::Result<ResolutionResult> {
    let endpoints = if endpoints.is_empty() {
        ServiceEndpoint::parse_all(&config.endpoints)?
    } else {
        ServiceEndpoint::parse_all(&endpoints)?
    };
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.attempt_timeout());

    let resolver = Resolver::with_endpoints(endpoints, timeout)?;
    let result = resolver.resolve().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.as_record_value());
    }

    Ok(result)
}
