//! Sink configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where records are committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub backend: SinkBackend,

    /// JSON Lines file (for the file backend).
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            backend: SinkBackend::default(),
            file_path: Some(PathBuf::from("data/records.jsonl")),
        }
    }
}

/// Sink backend type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkBackend {
    /// Append JSON Lines to a local file.
    #[default]
    File,
    /// Keep records in process memory.
    Memory,
    /// No primary sink; every record goes to the log-only fallback.
    None,
}
