//! Local lookup services for resolver tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use waypost_resolver::ServiceEndpoint;

/// Request counters per route.
#[derive(Debug, Default)]
pub struct Hits {
    pub slow: AtomicUsize,
    pub malformed: AtomicUsize,
    pub good: AtomicUsize,
    pub after: AtomicUsize,
}

impl Hits {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// An HTTP server on an ephemeral local port with one route per behaviour:
///
/// - `/slow`: answers after five seconds
/// - `/malformed`: 200 with a non-JSON body
/// - `/no-field`: 200 with JSON lacking any address field
/// - `/error`: 500
/// - `/good`: `{"address": "9.9.9.9"}`
/// - `/ipify`: `{"ip": "203.0.113.5"}`
/// - `/origin`: `{"origin": "198.51.100.7, 10.0.0.1"}`
/// - `/after`: `{"ip": "1.1.1.1"}`
pub struct LookupServer {
    addr: SocketAddr,
    pub hits: Arc<Hits>,
}

impl LookupServer {
    pub async fn start() -> Self {
        let hits = Arc::new(Hits::default());

        let app = Router::new()
            .route(
                "/slow",
                get({
                    let hits = hits.clone();
                    move || async move {
                        hits.slow.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Json(json!({ "ip": "10.10.10.10" }))
                    }
                }),
            )
            .route(
                "/malformed",
                get({
                    let hits = hits.clone();
                    move || async move {
                        hits.malformed.fetch_add(1, Ordering::SeqCst);
                        "<html>definitely not json</html>"
                    }
                }),
            )
            .route("/no-field", get(|| async { Json(json!({ "status": "ok" })) }))
            .route(
                "/error",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ip": "x" }))) }),
            )
            .route(
                "/good",
                get({
                    let hits = hits.clone();
                    move || async move {
                        hits.good.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "address": "9.9.9.9" }))
                    }
                }),
            )
            .route("/ipify", get(|| async { Json(json!({ "ip": "203.0.113.5" })) }))
            .route(
                "/origin",
                get(|| async { Json(json!({ "origin": "198.51.100.7, 10.0.0.1" })) }),
            )
            .route(
                "/after",
                get({
                    let hits = hits.clone();
                    move || async move {
                        hits.after.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "ip": "1.1.1.1" }))
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, hits }
    }

    pub fn endpoint(&self, path: &str) -> ServiceEndpoint {
        ServiceEndpoint::parse(&format!("http://{}{}", self.addr, path)).unwrap()
    }

    pub fn endpoints(&self, paths: &[&str]) -> Vec<ServiceEndpoint> {
        paths.iter().map(|p| self.endpoint(p)).collect()
    }
}

/// An endpoint nothing listens on.
pub async fn refused_endpoint() -> ServiceEndpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    ServiceEndpoint::parse(&format!("http://{}/ip", addr)).unwrap()
}
