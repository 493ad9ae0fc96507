//! Result of an address resolution.

use serde::{Deserialize, Serialize};

/// Value stored in a record when every candidate endpoint failed.
pub const EXHAUSTED_ADDRESS: &str = "client-side-unavailable";

/// Value stored in a record when the resolution procedure itself failed.
pub const INTERNAL_ERROR_ADDRESS: &str = "client-side-error";

/// Why resolution produced no address. Diagnostics only; callers treat
/// every reason as the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum UnavailableReason {
    /// Every candidate endpoint failed.
    AllCandidatesExhausted,
    /// The resolution procedure itself failed.
    ResolverInternalError(String),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllCandidatesExhausted => write!(f, "all-candidates-exhausted"),
            Self::ResolverInternalError(detail) => {
                write!(f, "resolver-internal-error: {}", detail)
            }
        }
    }
}

/// Outcome of one resolution: an address or the failure variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionResult {
    Address(String),
    Unavailable(UnavailableReason),
}

impl ResolutionResult {
    pub fn is_address(&self) -> bool {
        matches!(self, Self::Address(_))
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Address(address) => Some(address),
            Self::Unavailable(_) => None,
        }
    }

    /// Flatten into the string stored on a record.
    pub fn as_record_value(&self) -> &str {
        match self {
            Self::Address(address) => address,
            Self::Unavailable(UnavailableReason::AllCandidatesExhausted) => EXHAUSTED_ADDRESS,
            Self::Unavailable(UnavailableReason::ResolverInternalError(_)) => {
                INTERNAL_ERROR_ADDRESS
            }
        }
    }
}
