//! HTTP/WebSocket Handlers

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::SinkExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use agent_core::{progress::ChannelSink, AgentMode, ProgressEvent, ProgressSink};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub mode: AgentMode,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub mode: AgentMode,
    pub iterations: usize,
    pub tools_used: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn agent_error(message: String) -> HandlerError {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: message,
            code: "AGENT_ERROR",
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider_connected,
    })
}

/// List models exposed by the provider
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let models = state
        .provider
        .list_models()
        .await
        .map_err(|e| agent_error(e.user_message()))?;
    Ok(Json(json!({ "models": models })))
}

/// Dataset-overview payload (drives the dataset summary panel)
pub async fn dataset_overview(State(state): State<AppState>) -> Json<Value> {
    Json(state.toolkit.dataset_overview())
}

/// Sorted PSU names (drives the PSU selector)
pub async fn list_psus(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "psus": state.toolkit.dataset().psu_names() }))
}

/// Sorted sector names (drives the sector selector)
pub async fn list_sectors(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "sectors": state.toolkit.dataset().sectors() }))
}

/// Process one query to a final sanitized answer (non-streaming)
pub async fn query_handler(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, HandlerError> {
    if payload.query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Query must not be empty".into(),
                code: "EMPTY_QUERY",
            }),
        ));
    }

    let session = state.session(payload.model, None);
    let report = session
        .process_query(&payload.query, payload.mode)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Query failed");
            agent_error(e.user_message())
        })?;

    Ok(Json(QueryResponse {
        answer: report.answer,
        mode: report.mode,
        iterations: report.iterations,
        tools_used: report.tool_log.into_iter().map(|entry| entry.tool).collect(),
    }))
}

/// WebSocket endpoint streaming progress notices followed by the final
/// answer (or error)
pub async fn query_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_query_socket(socket, state))
        .into_response()
}

async fn handle_query_socket(mut socket: WebSocket, state: AppState) {
    // First client frame carries the query request
    let request = loop {
        match socket.recv().await {
            Some(Ok(WsMessage::Text(text))) => {
                match serde_json::from_str::<QueryRequest>(&text) {
                    Ok(request) => break request,
                    Err(e) => {
                        let _ = send_event(
                            &mut socket,
                            &json!({"event": "error", "error": format!("Invalid request: {e}")}),
                        )
                        .await;
                        return;
                    }
                }
            }
            Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => continue,
            _ => return,
        }
    };

    let (sink, mut events) = ChannelSink::new();
    let session = state.session(request.model, Some(Arc::new(sink) as Arc<dyn ProgressSink>));
    let query = request.query;
    let mode = request.mode;

    let worker = tokio::spawn(async move { session.process_query(&query, mode).await });

    // Forward events until the session drops its sink
    while let Some(event) = events.recv().await {
        if forward_progress(&mut socket, &event).await.is_err() {
            // Client went away; the session still runs to completion but
            // nobody is listening
            break;
        }
    }

    match worker.await {
        Ok(Ok(report)) => {
            let _ = send_event(
                &mut socket,
                &json!({
                    "event": "answer",
                    "answer": report.answer,
                    "iterations": report.iterations,
                    "tools_used": report
                        .tool_log
                        .iter()
                        .map(|entry| entry.tool.clone())
                        .collect::<Vec<_>>(),
                }),
            )
            .await;
        }
        Ok(Err(e)) => {
            let _ = send_event(
                &mut socket,
                &json!({"event": "error", "error": e.user_message()}),
            )
            .await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Session task panicked");
            let _ = send_event(
                &mut socket,
                &json!({"event": "error", "error": "An unexpected error occurred."}),
            )
            .await;
        }
    }

    let _ = socket.close().await;
}

async fn forward_progress(
    socket: &mut WebSocket,
    event: &ProgressEvent,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_value(event).unwrap_or_else(|_| json!({"event": "unknown"}));
    send_event(socket, &payload).await
}

async fn send_event(socket: &mut WebSocket, payload: &Value) -> Result<(), axum::Error> {
    socket
        .send(WsMessage::Text(payload.to_string().into()))
        .await
}
