//! Candidate resolution endpoints.

use reqwest::Url;

use crate::error::ResolverError;

/// A remote address-lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    url: Url,
}

impl ServiceEndpoint {
    /// Parse an endpoint URI. Only `http` and `https` are accepted.
    pub fn parse(uri: &str) -> Result<Self, ResolverError> {
        let url = Url::parse(uri.trim()).map_err(|e| ResolverError::InvalidEndpoint {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(ResolverError::InvalidEndpoint {
                uri: uri.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    /// Parse a priority-ordered list of URIs.
    pub fn parse_all<S: AsRef<str>>(uris: &[S]) -> Result<Vec<Self>, ResolverError> {
        uris.iter().map(|u| Self::parse(u.as_ref())).collect()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}
