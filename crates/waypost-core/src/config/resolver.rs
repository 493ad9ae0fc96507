//! Address resolver configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default candidate endpoints, in priority order.
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://api.ipify.org?format=json",
    "https://ipapi.co/json/",
    "https://httpbin.org/ip",
];

/// Configuration for the address resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Candidate endpoint URIs. Order is priority.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Timeout for a single attempt, in milliseconds.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
}

impl ResolverConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
        }
    }
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect()
}

fn default_attempt_timeout_ms() -> u64 {
    1500
}
