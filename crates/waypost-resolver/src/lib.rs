//! # waypost-resolver
//!
//! Resolves the client's network address by querying lookup services in
//! priority order.
//!
//! - Strictly sequential: one request in flight, first usable answer wins
//! - Each attempt is bounded by its own timeout and never retried
//! - Timeouts, transport errors, non-2xx responses and bodies without a
//!   recognized field are logged and skipped
//! - The result is always a [`ResolutionResult`]; exhaustion yields
//!   `Unavailable`, never an error
//!
//! ```rust,no_run
//! use waypost_core::ResolverConfig;
//! use waypost_resolver::Resolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Resolver::new(&ResolverConfig::default())?;
//! let result = resolver.resolve().await;
//! println!("{}", result.as_record_value());
//! # Ok(())
//! # }
//! ```

pub mod endpoint;
pub mod error;
pub mod resolver;

pub use endpoint::ServiceEndpoint;
pub use error::{AttemptError, ResolverError};
pub use resolver::{RECOGNIZED_FIELDS, Resolver, extract_address};
pub use waypost_core::{ResolutionResult, UnavailableReason};
