//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::{
    future,
    stream::{self, Stream, StreamExt},
};
use tracing::{error, info, warn};

use crate::state::{AppState, BreathingController, CycleState, RegistryError};
use super::responses::{ApiResponse, BreathingView, HealthResponse, StatusResponse};

fn registry_status(e: RegistryError) -> StatusCode {
    match e {
        RegistryError::LimitReached(_) => StatusCode::TOO_MANY_REQUESTS,
        RegistryError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Look up a session or map the failure to a status code
fn find_session(state: &AppState, id: u64) -> Result<Arc<BreathingController>, StatusCode> {
    match state.session(id) {
        Ok(Some(controller)) => Ok(controller),
        Ok(None) => {
            warn!("Breathing session {} not found", id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            error!("Failed to look up session {}: {}", id, e);
            Err(registry_status(e))
        }
    }
}

fn respond(state: &AppState, id: u64, action: &str, cycle: CycleState) -> Json<ApiResponse> {
    state.record_action(&format!("{} {}", action, id));
    let message = if cycle.running {
        format!("Breathing session {} running", id)
    } else {
        format!("Breathing session {} stopped", id)
    };
    Json(ApiResponse::new(message, BreathingView::new(id, &cycle)))
}

/// Handle POST /breathing - Open a new session
pub async fn open_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    match state.open_session() {
        Ok((id, cycle)) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::new(
                format!("Breathing session {} opened", id),
                BreathingView::new(id, &cycle),
            )),
        )),
        Err(e) => {
            error!("Failed to open breathing session: {}", e);
            Err(registry_status(e))
        }
    }
}

/// Handle GET /breathing/:id - Current view of a session
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<BreathingView>, StatusCode> {
    let controller = find_session(&state, id)?;
    Ok(Json(BreathingView::new(id, &controller.snapshot())))
}

/// Handle POST /breathing/:id/start - Start the countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let cycle = find_session(&state, id)?.start();
    info!("Start endpoint called for session {}", id);
    Ok(respond(&state, id, "start", cycle))
}

/// Handle POST /breathing/:id/stop - Stop the countdown
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let cycle = find_session(&state, id)?.stop();
    info!("Stop endpoint called for session {}", id);
    Ok(respond(&state, id, "stop", cycle))
}

/// Handle POST /breathing/:id/toggle - Start or stop depending on the current state
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let cycle = find_session(&state, id)?.toggle();
    info!("Toggle endpoint called for session {}", id);
    Ok(respond(&state, id, "toggle", cycle))
}

/// Handle DELETE /breathing/:id - Close a session
pub async fn close_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> StatusCode {
    match state.close_session(id) {
        Ok(true) => StatusCode::NO_CONTENT,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => {
            error!("Failed to close session {}: {}", id, e);
            registry_status(e)
        }
    }
}

/// Handle GET /breathing/:id/events - Stream every state change as SSE.
///
/// The current view is sent first. The stream ends when the session is closed.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Sse<impl Stream<Item = Result<Event, serde_json::Error>>>, StatusCode> {
    let rx = find_session(&state, id)?.subscribe();
    let initial = BreathingView::new(id, &rx.borrow());

    let updates = stream::unfold(rx, move |mut rx| async move {
        rx.changed().await.ok()?;
        let view = BreathingView::new(id, &rx.borrow_and_update());
        Some((view, rx))
    });

    let events = stream::once(future::ready(initial))
        .chain(updates)
        .map(|view| {
            serde_json::to_string(&view).map(|data| Event::default().event("cycle").data(data))
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Handle GET /status - Return session counts and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let (open_sessions, running_sessions) = match state.session_counts() {
        Ok(counts) => counts,
        Err(e) => {
            error!("Failed to count sessions: {}", e);
            return Err(registry_status(e));
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        open_sessions,
        running_sessions,
        max_sessions: state.max_sessions,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
