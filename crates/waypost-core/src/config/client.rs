//! Client context configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client context recorded with every record. Defaults to `waypost/<version>`.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| concat!("waypost/", env!("CARGO_PKG_VERSION")).to_string())
    }
}
