use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::error::AppError;
use super::state::AppState;
use crate::agents::ChatEvent;

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lenient JSON body: an empty or unparsable body reads as `T::default()`,
/// so handlers report the missing field instead of a parse error.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring malformed JSON body");
        T::default()
    })
}

fn required_message(message: Option<String>) -> Result<String, AppError> {
    message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Message is required"))
}

#[derive(Debug, Default, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    challenge: Option<String>,
    #[serde(default)]
    event: Option<ChatEvent>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(rename = "threadTs", default)]
    thread_ts: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NotifyBody {
    #[serde(default)]
    query: Option<String>,
}

/// GET /api
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "Sprint Pilot",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "AI-powered Product Manager agent for Slack and Jira",
        "endpoints": {
            "health": "/api/health",
            "slackWebhook": "/api/slack/webhook",
            "testQuery": "/api/test/query",
            "sprintSummary": "/api/sprint/summary",
            "sprintNotify": "/api/sprint/notify",
            "testIntegration": "/api/test/integration",
            "configStatus": "/api/config/status",
            "demoQuery": "/api/demo/query",
        },
    }))
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/slack/webhook: URL verification handshake and message events.
pub async fn slack_webhook(State(app): State<AppState>, body: Bytes) -> Response {
    let envelope: WebhookEnvelope = parse_body(&body);

    if envelope.kind == "url_verification" {
        if let Some(challenge) = envelope.challenge {
            return Json(json!({ "challenge": challenge })).into_response();
        }
    }

    if envelope.kind == "event_callback" {
        if let Some(event) = envelope.event {
            tracing::info!(event_type = %event.kind, "Received Slack event");
            if event.kind == "message" {
                app.agent.handle_chat_event(&event).await;
            }
        }
    }

    (StatusCode::OK, "OK").into_response()
}

/// POST /api/test/query: Run the chat pipeline for a message without Slack in front.
pub async fn test_query(State(app): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    let body: QueryBody = parse_body(&body);
    let message = required_message(body.message)?;

    tracing::info!(query = %message, "Testing query");
    app.agent
        .process_query(&message, body.channel.as_deref(), body.thread_ts.as_deref())
        .await;

    Ok(Json(json!({
        "success": true,
        "message": "Query processed successfully",
        "timestamp": timestamp(),
    })))
}

/// GET /api/sprint/summary
pub async fn sprint_summary(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let report = app
        .agent
        .generate_sprint_summary()
        .await
        .map_err(AppError::upstream("Failed to fetch sprint summary"))?;

    Ok(Json(json!({
        "success": true,
        "data": report,
        "timestamp": timestamp(),
    })))
}

/// POST /api/sprint/notify: Post the rendered sprint report to chat.
pub async fn sprint_notify(State(app): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    let body: NotifyBody = parse_body(&body);
    let query = body.query.unwrap_or_else(|| "Sprint report".to_string());

    let delivered = app
        .agent
        .notify_sprint_report(&query)
        .await
        .map_err(AppError::upstream("Failed to send sprint report"))?;

    Ok(Json(json!({
        "success": true,
        "delivered": delivered,
        "timestamp": timestamp(),
    })))
}

/// POST /api/test/integration
pub async fn test_integration(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    app.agent
        .test_integration()
        .await
        .map_err(AppError::upstream("Integration test failed"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Integration test completed successfully",
        "timestamp": timestamp(),
    })))
}

/// GET /api/config/status: Logs missing settings; always succeeds.
pub async fn config_status(State(app): State<AppState>) -> Json<Value> {
    app.config.log_missing();
    Json(json!({
        "message": "Configuration validation completed",
        "timestamp": timestamp(),
    }))
}

/// POST /api/demo/query: Answer synchronously for the web UI, bypassing Slack.
pub async fn demo_query(State(app): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    let body: QueryBody = parse_body(&body);
    let message = required_message(body.message)?;

    let answer = app
        .agent
        .answer_query(&message)
        .await
        .map_err(AppError::upstream("Failed to answer query"))?;

    Ok(Json(json!({ "answer": answer })))
}

/// Any other /api path.
pub async fn not_found(uri: Uri) -> Response {
    let body = json!({ "error": "Endpoint not found", "path": uri.path() });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
