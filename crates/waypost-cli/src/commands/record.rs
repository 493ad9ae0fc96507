//! Record commands.
//!
//! `waypost record <kind>` - Run one save against the configured sink and
//! print its report.

use std::sync::Arc;

use clap::ValueEnum;
use waypost_core::{ReadinessFlag, RecordKind, SinkBackend, Submission, WaypostConfig};
use waypost_persist::{DeferredPersister, FileSink, LogFallback, MemorySink, SaveReport};
use waypost_resolver::Resolver;

/// Record kind as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Login,
    AccountCreation,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Login => RecordKind::LoginAttempt,
            KindArg::AccountCreation => RecordKind::AccountCreationAttempt,
        }
    }
}

/// Build a persister for `config`.
///
/// A file sink initializes in the background and raises the readiness flag
/// itself, so the persister's readiness wait is exercised for real.
pub fn build_persister(config: &WaypostConfig) -> anyhow::Result<DeferredPersister> {
    let resolver = Resolver::new(&config.resolver)?;
    let readiness = ReadinessFlag::new();
    let persister =
        DeferredPersister::new(resolver, Arc::new(readiness.clone()), Arc::new(LogFallback))
            .with_config(config.persister);

    let persister = match config.sink.backend {
        SinkBackend::File => {
            let path = config
                .sink
                .file_path
                .clone()
                .ok_or_else(|| anyhow::anyhow!("sink.file_path is required for the file backend"))?;
            let sink = Arc::new(FileSink::new(path, readiness));
            let init = sink.clone();
            tokio::spawn(async move {
                // Failures settle readiness as failed and are logged by the sink.
                let _ = init.initialize().await;
            });
            persister.with_sink(sink)
        }
        SinkBackend::Memory => {
            readiness.mark_ready();
            persister.with_sink(Arc::new(MemorySink::new()))
        }
        SinkBackend::None => {
            readiness.mark_failed();
            persister
        }
    };

    Ok(persister)
}

/// Save one record and wait for the outcome.
pub async fn run(
    config: &WaypostConfig,
    kind: KindArg,
    subject: &str,
    user_agent: Option<String>,
) -> anyhow::Result<SaveReport> {
    let persister = build_persister(config)?;
    let submission = Submission::new(subject)
        .client_context(user_agent.unwrap_or_else(|| config.client.user_agent()));

    let report = persister.save_and_wait(kind.into(), submission).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(report)
}
