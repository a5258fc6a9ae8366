#![cfg(feature = "server")]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use reconbridge::backends::{MockHttpProber, MockPortScanner, MockSubdomainSource};
use reconbridge::gateway::{router, AppState, PENDING_MESSAGE, TRANSCRIPT_MISSING_MESSAGE};
use reconbridge::{OrchestratorConfig, ScanOrchestrator, TranscriptStore};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn orchestrator(dir: &Path, latency: Duration) -> Arc<ScanOrchestrator> {
    Arc::new(
        ScanOrchestrator::builder()
            .with_subdomain_source(
                MockSubdomainSource::new(["a.example.com", "b.example.com"]).with_latency(latency),
            )
            .with_port_scanner(MockPortScanner::new([80]))
            .with_http_prober(MockHttpProber::new())
            .with_transcripts(TranscriptStore::new(dir))
            .with_config(OrchestratorConfig::default())
            .build()
            .unwrap(),
    )
}

fn app(orchestrator: &Arc<ScanOrchestrator>) -> Router {
    let origins = vec!["http://localhost:5173".to_string()];
    router(AppState::new(Arc::clone(orchestrator)), &origins).unwrap()
}

fn post_scan(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/scan")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn wait_for_record(orchestrator: &ScanOrchestrator, domain: &str) {
    for _ in 0..200 {
        if orchestrator.store().lookup(domain).is_some() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no record published for {domain}");
}

#[tokio::test]
async fn test_invalid_domain_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    for body in [
        r#"{"domain":""}"#,
        r#"{"domain":"localhost"}"#,
        r#"{"domain":"a b.com"}"#,
        r#"{"domain":"-oN/tmp/out.txt"}"#,
        r#"{"domain":"--script=http-title.nse"}"#,
    ] {
        let response = app(&orchestrator).oneshot(post_scan(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid domain format");
    }

    assert_eq!(orchestrator.active_scans(), 0);
    assert!(orchestrator.store().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    let response = app(&orchestrator)
        .oneshot(post_scan("{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(response).await;
    assert_eq!(body["message"], "Invalid request body");
    assert_eq!(orchestrator.active_scans(), 0);
}

#[tokio::test]
async fn test_unknown_domain_is_pending() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    let response = app(&orchestrator)
        .oneshot(get("/api/scan/unknown.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["message"], PENDING_MESSAGE);
}

#[tokio::test]
async fn test_scan_acknowledged_then_reported_scanning() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::from_secs(30));

    let response = app(&orchestrator)
        .oneshot(post_scan(r#"{"domain":"example.com"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["status"], "scanning");
    assert_eq!(body["message"], "Scan started for example.com");

    let body = json(
        app(&orchestrator)
            .oneshot(get("/api/scan/example.com"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["status"], "scanning");

    let response = app(&orchestrator)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/scan/example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], "cancelled");

    wait_for_record(&orchestrator, "example.com").await;
    let body = json(
        app(&orchestrator)
            .oneshot(get("/api/scan/example.com"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["status"], "failed");
    assert_eq!(body["message"], "scan cancelled");
}

#[tokio::test]
async fn test_completed_scan_and_transcript_download() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    app(&orchestrator)
        .oneshot(post_scan(r#"{"domain":"example.com"}"#))
        .await
        .unwrap();
    wait_for_record(&orchestrator, "example.com").await;

    let body = json(
        app(&orchestrator)
            .oneshot(get("/api/scan/example.com"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["subdomains"].as_array().unwrap().len(), 2);
    assert_eq!(body["openPorts"][0]["port"], "80");
    assert_eq!(body["httpxResults"].as_array().unwrap().len(), 4);

    let response = app(&orchestrator)
        .oneshot(get("/api/scan/example.com/file"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=example.com_status_codes.txt"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let transcript = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(transcript.lines().count(), 4);
    assert!(transcript.starts_with("a.example.com:80 - 200\n"));
}

#[tokio::test]
async fn test_missing_transcript_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    let response = app(&orchestrator)
        .oneshot(get("/api/scan/nothing.com/file"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], TRANSCRIPT_MISSING_MESSAGE);
}

#[tokio::test]
async fn test_cancel_without_scan_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    let response = app(&orchestrator)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/scan/idle.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_tools() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    let body = json(app(&orchestrator).oneshot(get("/api/health")).await.unwrap()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tools"]["mock-subdomains"], true);
    assert_eq!(body["tools"]["mock-ports"], true);
    assert_eq!(body["tools"]["mock-prober"], true);
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend_origin() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(dir.path(), Duration::ZERO);

    let response = app(&orchestrator)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/scan")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}
