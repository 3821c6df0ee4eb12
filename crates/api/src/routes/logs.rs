//! `GET /v1/services/{id}/logs/stream` (§4.G): the `axum` WebSocket upgrade
//! that bridges a [`logstream::LogStreamSession`] onto the wire, plus the
//! historical (non-streaming) read. Grounded on the split-sender/receiver
//! WebSocket pattern used for live event forwarding in the wider pack
//! (`vibe-kanban`'s `tasks_ws` handler), adapted so that, per §4.G, any
//! client message cancels the stream instead of being silently drained.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use core_types::EntityId;
use logstream::LogFrame;
use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub environment_id: EntityId,
}

/// `GET /v1/services/{id}/logs/stream` — upgrade gated by the configured
/// origin allow-list (§4.G); an empty allow-list or missing header rejects
/// the request outright rather than upgrading and then closing.
pub async fn stream(
    State(state): State<AppState>,
    Path(service_id): Path<EntityId>,
    Query(query): Query<LogQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if !state.log_stream.is_origin_allowed(origin) {
        return Err(ApiError::new(core_types::ErrorCategory::Forbidden, "origin not allowed"));
    }

    let session = state.log_stream.open(service_id, query.environment_id).await?;
    Ok(ws.on_upgrade(move |socket| async move { forward(socket, session).await }))
}

async fn forward(mut socket: WebSocket, session: logstream::LogStreamSession) {
    loop {
        tokio::select! {
            frame = session.recv() => {
                let Some(frame) = frame else { break };
                if socket.send(Message::Text(frame.to_json().into())).await.is_err() {
                    break;
                }
                if matches!(frame, LogFrame::Disconnected) {
                    break;
                }
            }
            incoming = socket.recv() => {
                if incoming.is_some() {
                    // §4.G: any client message, including a close frame,
                    // cancels the stream.
                }
                session.cancel();
                break;
            }
        }
    }
    if let Err(e) = socket.send(Message::Close(None)).await {
        warn!(error = %e, "log stream socket close failed");
    }
}

/// `GET /v1/services/{id}/logs` (historical, non-streaming read; §4.G
/// "capped at 10,000 lines").
pub async fn historical(State(state): State<AppState>, Path(service_id): Path<EntityId>, Query(query): Query<LogQuery>) -> Result<impl IntoResponse, ApiError> {
    let text = state.log_stream.historical(service_id, query.environment_id).await?;
    Ok(text)
}
