//! JSON Lines file sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;
use waypost_core::{Channel, ReadinessFlag, Record};

use crate::error::SinkError;
use crate::sink::{AppendReceipt, MonotonicClock, Sink, StoredRecord};

/// Appends records to a file, one JSON object per line.
///
/// The sink starts uninitialized. [`FileSink::initialize`] opens the file
/// and settles the shared readiness flag either way. Only an opened file
/// makes the sink initialized; the flag may be shared with other sinks.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    readiness: ReadinessFlag,
    file: Mutex<Option<File>>,
    initialized: AtomicBool,
    clock: MonotonicClock,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, readiness: ReadinessFlag) -> Self {
        Self {
            path: path.into(),
            readiness,
            file: Mutex::new(None),
            initialized: AtomicBool::new(false),
            clock: MonotonicClock::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file for appending, creating parent directories.
    pub async fn initialize(&self) -> Result<(), SinkError> {
        match self.open().await {
            Ok(file) => {
                *self.file.lock().await = Some(file);
                self.initialized.store(true, Ordering::SeqCst);
                self.readiness.mark_ready();
                info!(path = %self.path.display(), "File sink ready");
                Ok(())
            }
            Err(e) => {
                self.readiness.mark_failed();
                error!(path = %self.path.display(), error = %e, "File sink failed to initialize");
                Err(e)
            }
        }
    }

    async fn open(&self) -> Result<File, SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        Ok(file)
    }

    /// Read every stored record back from `path`.
    pub async fn read_all(path: impl AsRef<Path>) -> Result<Vec<StoredRecord>, SinkError> {
        let content = tokio::fs::read_to_string(path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(SinkError::from))
            .collect()
    }
}

#[async_trait]
impl Sink for FileSink {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn append(&self, channel: Channel, record: &Record) -> Result<AppendReceipt, SinkError> {
        let stored = StoredRecord {
            id: Uuid::new_v4().to_string(),
            channel,
            record: record.clone(),
        };
        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');

        let mut guard = self.file.lock().await;
        let file = guard.as_mut().ok_or(SinkError::NotInitialized)?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(AppendReceipt { id: stored.id })
    }
}
