//! Assist routes
//!
//! The two-phase streaming API. `start` stores the context payload under a
//! stream id; `stream` picks the payload up and responds with SSE frames.
//! The stream request may also carry the payload inline, the fallback
//! transport for deployments where the two calls can land on different
//! instances and the in-memory store cannot help.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::Response,
    routing::post,
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::stream::StreamPayload;

/// Create the assist router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_stream))
        .route("/stream", post(run_stream))
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    /// Caller-supplied id; generated when absent
    #[serde(rename = "streamId")]
    pub stream_id: Option<String>,
    #[serde(flatten)]
    pub payload: StreamPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub stream_id: String,
}

/// Store the context payload and hand back the id the streaming call will
/// present.
async fn start_stream(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>> {
    if request.payload.current_page == 0 {
        return Err(AppError::BadRequest(
            "currentPage must be at least 1".to_string(),
        ));
    }

    let stream_id = request
        .stream_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(
        stream_id = %stream_id,
        pdf_id = %request.payload.pdf_id,
        current_page = request.payload.current_page,
        "stored stream payload"
    );

    state.payloads().set(&stream_id, request.payload);

    Ok(Json(StartResponse { stream_id }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub stream_id: Option<String>,
    /// Inline fallback when the id was issued by another instance
    pub payload: Option<StreamPayload>,
}

/// Run the response stream for a previously initiated request.
async fn run_stream(
    State(state): State<AppState>,
    Json(request): Json<StreamRequest>,
) -> Result<Response> {
    // stored payloads are read once; delete on pickup
    let stored = request
        .stream_id
        .as_deref()
        .and_then(|id| state.payloads().delete(id));

    let payload = match stored.or(request.payload) {
        Some(payload) => payload,
        None => {
            return Err(AppError::NotFound(
                "stream payload not found or expired".to_string(),
            ))
        }
    };

    let frames = state
        .driver()
        .run(state.source(), payload, state.config().pipeline.options());
    let body = Body::from_stream(frames.map(|frame| Ok::<_, Infallible>(frame.encode())));

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
