use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use sprintpilot::clients::{ConsoleNotifier, MockTracker, TrackerError};
use sprintpilot::{
    AppState, Config, LanguageModel, Notifier, ProcessedQuery, ProductManagerAgent, Sprint,
    SprintReport, Tracker, WorkItem, build_router,
};

// ---------------------------------------------------------------------------
// Stubs
// ---------------------------------------------------------------------------

/// Sample-data tracker that counts calls and can be told to fail.
#[derive(Default)]
struct CountingTracker {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl Tracker for CountingTracker {
    fn name(&self) -> &str {
        "counting"
    }

    async fn get_active_sprint(&self) -> Result<Sprint, TrackerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TrackerError::NoActiveSprint);
        }
        Ok(MockTracker::sample_sprint())
    }

    async fn get_work_items_in_sprint(&self, _sprint_id: u64) -> Result<Vec<WorkItem>, TrackerError> {
        Ok(MockTracker::sample_items())
    }
}

/// Answers from the report it is given, in markdown, like a real model would.
#[derive(Default)]
struct ReportEchoModel {
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for ReportEchoModel {
    async fn analyze_query(&self, _text: &str) -> ProcessedQuery {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ProcessedQuery::fallback()
    }

    async fn generate_response(&self, report: Option<&SprintReport>, query: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match report {
            Some(r) => format!(
                "## Sprint Update\n**{}** of {} work items are ready for production.\n- Blocked: {}",
                r.ready_for_production, r.total_items, r.blocked
            ),
            None => format!("Summary: {}", query.lines().nth(2).unwrap_or_default()),
        }
    }
}

#[derive(Default)]
struct CountingNotifier {
    sent: AtomicUsize,
}

#[async_trait]
impl Notifier for CountingNotifier {
    fn name(&self) -> &str {
        "counting"
    }

    async fn send_message(&self, _text: &str, _channel: Option<&str>, _thread_ts: Option<&str>) -> bool {
        self.sent.fetch_add(1, Ordering::SeqCst);
        true
    }
}

struct Harness {
    app: axum::Router,
    tracker: Arc<CountingTracker>,
    model: Arc<ReportEchoModel>,
    notifier: Arc<CountingNotifier>,
}

fn harness(tracker_fails: bool) -> Harness {
    let tracker = Arc::new(CountingTracker {
        fail: tracker_fails,
        ..CountingTracker::default()
    });
    let model = Arc::new(ReportEchoModel::default());
    let notifier = Arc::new(CountingNotifier::default());
    let agent = ProductManagerAgent::new(tracker.clone(), model.clone(), notifier.clone());
    let app = build_router(AppState::new(Config::default(), agent));
    Harness {
        app,
        tracker,
        model,
        notifier,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    read(app.oneshot(req).await.unwrap()).await
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    read(app.oneshot(req).await.unwrap()).await
}

async fn post_empty(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    read(app.oneshot(req).await.unwrap()).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_status_and_version() {
    let (status, json) = get(harness(false).app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn demo_query_answers_from_sample_sprint() {
    let h = harness(false);
    let (status, json) = post_json(
        h.app,
        "/api/demo/query",
        json!({ "message": "How many work items are ready for production?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let answer = json["answer"].as_str().unwrap();
    assert_eq!(
        answer,
        "Sprint Update\n2 of 6 work items are ready for production.\n  • Blocked: 1"
    );
    // The demo path never delivers to chat.
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn demo_query_without_credentials_still_answers() {
    let app = build_router(AppState::from_config(Config::default()));
    let (status, json) = post_json(
        app,
        "/api/demo/query",
        json!({ "message": "How many work items are ready for production?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!json["answer"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn demo_query_routes_assignee_questions() {
    let h = harness(false);
    let (status, json) = post_json(
        h.app,
        "/api/demo/query",
        json!({ "message": "What is Jane working on?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answer"], "Summary: Main focus (In Progress or Code Review):");
}

#[tokio::test]
async fn demo_query_surfaces_tracker_failure() {
    let (status, json) = post_json(harness(true).app, "/api/demo/query", json!({ "message": "status" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to answer query");
    assert_eq!(json["details"], "No active sprints found");
}

#[tokio::test]
async fn test_query_requires_message() {
    let (status, json) = post_empty(harness(false).app, "/api/test/query").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Message is required" }));

    let (status, _) = post_json(harness(false).app, "/api/demo/query", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_query_runs_chat_pipeline() {
    let h = harness(false);
    let (status, json) = post_json(
        h.app,
        "/api/test/query",
        json!({ "message": "What's blocked?", "channel": "C1", "threadTs": "1.1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Query processed successfully");
    // Processing notice + answer.
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 2);
    assert_eq!(h.tracker.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_reports_pipeline_errors_to_chat_not_http() {
    let h = harness(true);
    let (status, json) = post_json(h.app, "/api/test/query", json!({ "message": "status?" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    // Processing notice + error notice.
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn webhook_answers_url_verification() {
    let h = harness(false);
    let (status, json) = post_json(
        h.app,
        "/api/slack/webhook",
        json!({ "type": "url_verification", "challenge": "abc" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "challenge": "abc" }));
    assert_eq!(h.tracker.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn webhook_ignores_bot_messages() {
    let h = harness(false);
    let (status, _) = post_json(
        h.app,
        "/api/slack/webhook",
        json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "text": "How many work items are in the sprint?",
                "channel": "C1",
                "bot_id": "B123"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.tracker.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn webhook_forwards_sprint_messages() {
    let h = harness(false);
    let (status, _) = post_json(
        h.app,
        "/api/slack/webhook",
        json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "text": "What is the sprint status?",
                "user": "U1",
                "channel": "C1",
                "thread_ts": "1700000000.000100"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.tracker.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn webhook_skips_unrelated_chatter() {
    let h = harness(false);
    post_json(
        h.app,
        "/api/slack/webhook",
        json!({ "type": "event_callback", "event": { "type": "message", "text": "lunch?" } }),
    )
    .await;
    assert_eq!(h.tracker.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sprint_summary_returns_report() {
    let (status, json) = get(harness(false).app, "/api/sprint/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert_eq!(data["totalItems"], 6);
    assert_eq!(data["readyForProduction"], 2);
    assert_eq!(data["blocked"], 1);
    assert_eq!(data["inProgress"], 2);
    assert_eq!(data["summary"].as_array().unwrap().len(), 4);
    assert_eq!(data["sprint"]["name"], "Sprint 15 - Product Launch");
}

#[tokio::test]
async fn sprint_summary_failure_is_500() {
    let (status, json) = get(harness(true).app, "/api/sprint/summary").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to fetch sprint summary");
}

#[tokio::test]
async fn sprint_notify_delivers_report() {
    let h = harness(false);
    let (status, json) = post_empty(h.app, "/api/sprint/notify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["delivered"], true);
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn integration_endpoint_exercises_all_clients() {
    let h = harness(false);
    let (status, json) = post_empty(h.app, "/api/test/integration").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Integration test completed successfully");
    assert_eq!(h.model.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tracker.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 1);

    let (status, json) = post_empty(harness(true).app, "/api/test/integration").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Integration test failed");
}

#[tokio::test]
async fn config_status_always_succeeds() {
    let (status, json) = get(harness(false).app, "/api/config/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Configuration validation completed");
}

#[tokio::test]
async fn unknown_api_path_is_json_404() {
    let (status, json) = get(harness(false).app, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Endpoint not found");
    assert_eq!(json["path"], "/api/nope");
}

#[tokio::test]
async fn non_api_paths_serve_the_frontend() {
    let req = axum::http::Request::builder()
        .uri("/chat/anything")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = harness(false).app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("<html"));
}

#[tokio::test]
async fn console_notifier_is_a_drop_in() {
    let agent = ProductManagerAgent::new(
        Arc::new(MockTracker::new()),
        Arc::new(ReportEchoModel::default()),
        Arc::new(ConsoleNotifier),
    );
    let app = build_router(AppState::new(Config::default(), agent));
    let (status, _) = post_json(app, "/api/test/query", json!({ "message": "sprint status" })).await;
    assert_eq!(status, StatusCode::OK);
}
