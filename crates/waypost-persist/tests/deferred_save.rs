//! DeferredPersister behaviour: readiness gate, commit routing and reports.
//!
//! Run with: cargo test -p waypost-persist --test deferred_save

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::mpsc;
use waypost_core::{
    Channel, PersisterConfig, ReadinessFlag, Record, RecordKind, Submission, EXHAUSTED_ADDRESS,
};
use waypost_persist::{
    DeferredPersister, FallbackSink, FileSink, MemorySink, SaveOutcome, SaveState, Sink,
};
use waypost_resolver::{Resolver, ServiceEndpoint};

/// Fallback that remembers what it was handed.
#[derive(Default)]
struct RecordingFallback {
    records: Mutex<Vec<Record>>,
}

impl RecordingFallback {
    fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl FallbackSink for RecordingFallback {
    async fn append(&self, record: &Record) {
        self.records.lock().unwrap().push(record.clone());
    }
}

fn offline_resolver() -> Resolver {
    Resolver::with_endpoints(vec![], Duration::from_millis(100)).unwrap()
}

fn fast_config() -> PersisterConfig {
    PersisterConfig {
        poll_interval_ms: 10,
        max_wait_ms: 300,
    }
}

fn login() -> Submission {
    Submission::new("grace@example.com")
        .secret("correct horse")
        .client_context("Mozilla/5.0 (test)")
}

struct Harness {
    readiness: ReadinessFlag,
    sink: Arc<MemorySink>,
    fallback: Arc<RecordingFallback>,
    persister: DeferredPersister,
}

impl Harness {
    fn new(readiness: ReadinessFlag, sink: MemorySink, config: PersisterConfig) -> Self {
        let sink = Arc::new(sink);
        let fallback = Arc::new(RecordingFallback::default());
        let persister = DeferredPersister::new(
            offline_resolver(),
            Arc::new(readiness.clone()),
            fallback.clone(),
        )
        .with_sink(sink.clone())
        .with_config(config);

        Self {
            readiness,
            sink,
            fallback,
            persister,
        }
    }
}

#[tokio::test]
async fn test_waits_for_readiness_before_resolving() {
    let h = Harness::new(
        ReadinessFlag::new(),
        MemorySink::new(),
        PersisterConfig::default(),
    );

    let flag = h.readiness.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        flag.mark_ready();
    });

    let report = h
        .persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    let resolving = report.entered(SaveState::Resolving).unwrap();
    assert!(resolving >= Duration::from_millis(50), "{:?}", resolving);

    let states: Vec<_> = report.transitions.iter().map(|t| t.state).collect();
    assert_eq!(
        states,
        vec![
            SaveState::WaitingReady,
            SaveState::Resolving,
            SaveState::Committing,
            SaveState::Done
        ]
    );
    assert!(report.transitions.windows(2).all(|w| w[0].at <= w[1].at));
    assert!(matches!(report.outcome, SaveOutcome::Committed { .. }));
}

#[tokio::test]
async fn test_never_ready_abandons_at_deadline() {
    let h = Harness::new(
        ReadinessFlag::new(),
        MemorySink::new(),
        PersisterConfig::default(),
    );

    let report = h
        .persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    assert_eq!(report.outcome, SaveOutcome::Abandoned);
    assert_eq!(report.final_state(), Some(SaveState::TimedOutAbandoned));
    assert!(report.entered(SaveState::Resolving).is_none());
    assert!(report.record.is_none());

    let at = report.entered(SaveState::TimedOutAbandoned).unwrap();
    assert!(at >= Duration::from_millis(2000), "{:?}", at);
    assert!(at <= Duration::from_millis(2000 + 100 + 150), "{:?}", at);

    assert_eq!(h.sink.append_calls(), 0);
    assert!(h.fallback.records().is_empty());
}

#[tokio::test]
async fn test_login_commits_to_logins_channel() {
    let h = Harness::new(ReadinessFlag::ready(), MemorySink::new(), fast_config());

    let report = h
        .persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    let stored = h.sink.records(Channel::Logins);
    assert_eq!(stored.len(), 1);
    assert!(h.sink.records(Channel::UserActions).is_empty());
    assert_eq!(
        report.outcome,
        SaveOutcome::Committed {
            channel: Channel::Logins,
            id: stored[0].id.clone()
        }
    );
    assert!(h.fallback.records().is_empty());

    let record = &stored[0].record;
    assert_eq!(record.subject(), "grace@example.com");
    assert!(record.secret().is_some());
    assert_eq!(record.client_context(), "Mozilla/5.0 (test)");
    assert_eq!(record.address(), EXHAUSTED_ADDRESS);
    assert!(record.outcome());
}

#[tokio::test]
async fn test_account_creation_commits_to_user_actions_channel() {
    let h = Harness::new(ReadinessFlag::ready(), MemorySink::new(), fast_config());

    h.persister
        .save_and_wait(
            RecordKind::AccountCreationAttempt,
            Submission::new("heidi@example.com"),
        )
        .await;

    assert!(h.sink.records(Channel::Logins).is_empty());
    let stored = h.sink.records(Channel::UserActions);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record.action(), Some("create_account_attempt"));
    assert!(stored[0].record.secret().is_none());
}

#[tokio::test]
async fn test_uninitialized_sink_routes_to_fallback_only() {
    let h = Harness::new(
        ReadinessFlag::ready(),
        MemorySink::uninitialized(),
        fast_config(),
    );

    let report = h
        .persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    assert_eq!(report.outcome, SaveOutcome::FellBack);
    assert_eq!(h.sink.append_calls(), 0);
    assert_eq!(h.fallback.records().len(), 1);
}

#[tokio::test]
async fn test_unopened_file_sink_falls_back_despite_ready_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.jsonl");
    let readiness = ReadinessFlag::ready();
    let fallback = Arc::new(RecordingFallback::default());
    let persister = DeferredPersister::new(
        offline_resolver(),
        Arc::new(readiness.clone()),
        fallback.clone(),
    )
    .with_sink(Arc::new(FileSink::new(&path, readiness)))
    .with_config(fast_config());

    let report = persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    assert_eq!(report.outcome, SaveOutcome::FellBack);
    assert_eq!(fallback.records().len(), 1);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_missing_sink_handle_routes_to_fallback() {
    let fallback = Arc::new(RecordingFallback::default());
    let persister = DeferredPersister::new(
        offline_resolver(),
        Arc::new(ReadinessFlag::ready()),
        fallback.clone(),
    )
    .with_config(fast_config());

    let report = persister
        .save_and_wait(RecordKind::AccountCreationAttempt, Submission::new("ivan"))
        .await;

    assert_eq!(report.outcome, SaveOutcome::FellBack);
    assert_eq!(fallback.records().len(), 1);
    assert_eq!(fallback.records()[0].kind(), RecordKind::AccountCreationAttempt);
}

#[tokio::test]
async fn test_rejected_write_is_not_promoted_to_fallback() {
    let h = Harness::new(
        ReadinessFlag::ready(),
        MemorySink::rejecting("permission denied"),
        fast_config(),
    );

    let report = h
        .persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    assert_eq!(
        report.outcome,
        SaveOutcome::Rejected {
            channel: Channel::Logins,
            error: "write rejected: permission denied".to_string()
        }
    );
    assert_eq!(report.final_state(), Some(SaveState::Done));
    assert_eq!(h.sink.append_calls(), 1);
    assert!(h.fallback.records().is_empty());
}

#[tokio::test]
async fn test_failed_readiness_proceeds_to_fallback() {
    let readiness = ReadinessFlag::new();
    readiness.mark_failed();
    let h = Harness::new(readiness, MemorySink::uninitialized(), fast_config());

    let report = h
        .persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    assert_eq!(report.outcome, SaveOutcome::FellBack);
    assert!(report.entered(SaveState::Resolving).unwrap() < Duration::from_millis(50));
}

#[tokio::test]
async fn test_committed_record_matches_assembled_record() {
    let h = Harness::new(ReadinessFlag::ready(), MemorySink::new(), fast_config());

    let report = h
        .persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    let stored = h.sink.records(Channel::Logins);
    assert_eq!(report.record.as_ref(), Some(&stored[0].record));
}

#[tokio::test]
async fn test_sink_assigns_increasing_timestamps() {
    let h = Harness::new(ReadinessFlag::ready(), MemorySink::new(), fast_config());

    for _ in 0..3 {
        h.persister
            .save_and_wait(RecordKind::LoginAttempt, login())
            .await;
    }

    let stored = h.sink.records(Channel::Logins);
    assert_eq!(stored.len(), 3);
    assert!(
        stored
            .windows(2)
            .all(|w| w[0].record.timestamp() < w[1].record.timestamp())
    );
}

#[tokio::test]
async fn test_background_saves_are_independent() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let h = Harness::new(ReadinessFlag::new(), MemorySink::new(), fast_config());
    let persister = h.persister.clone().with_observer(tx);

    for i in 0..5 {
        let kind = if i % 2 == 0 {
            RecordKind::LoginAttempt
        } else {
            RecordKind::AccountCreationAttempt
        };
        persister.save(kind, Submission::new(format!("user{}@example.com", i)));
    }
    h.readiness.mark_ready();

    let mut session_ids = HashSet::new();
    for _ in 0..5 {
        let report = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(report.outcome, SaveOutcome::Committed { .. }));
        session_ids.insert(report.record.unwrap().session_id().to_string());
    }

    assert_eq!(session_ids.len(), 5);
    assert_eq!(h.sink.records(Channel::Logins).len(), 3);
    assert_eq!(h.sink.records(Channel::UserActions).len(), 2);
}

#[tokio::test]
async fn test_resolved_address_is_recorded() {
    let app = Router::new().route("/ip", get(|| async { Json(json!({ "ip": "203.0.113.77" })) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let endpoint = ServiceEndpoint::parse(&format!("http://{}/ip", addr)).unwrap();
    let resolver = Resolver::with_endpoints(vec![endpoint], Duration::from_millis(500)).unwrap();
    let sink = Arc::new(MemorySink::new());
    let persister = DeferredPersister::new(
        resolver,
        Arc::new(ReadinessFlag::ready()),
        Arc::new(RecordingFallback::default()),
    )
    .with_sink(sink.clone())
    .with_config(fast_config());

    persister
        .save_and_wait(RecordKind::LoginAttempt, login())
        .await;

    let stored = sink.records(Channel::Logins);
    assert_eq!(stored[0].record.address(), "203.0.113.77");
    assert!(sink.is_initialized());
}
