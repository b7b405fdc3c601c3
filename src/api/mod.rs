//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/breathing", post(open_handler))
        .route("/breathing/:id", get(session_handler).delete(close_handler))
        .route("/breathing/:id/start", post(start_handler))
        .route("/breathing/:id/stop", post(stop_handler))
        .route("/breathing/:id/toggle", post(toggle_handler))
        .route("/breathing/:id/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    use super::responses::{ApiResponse, BreathingView, StatusResponse};
    use crate::state::Phase;

    fn app(max_sessions: usize) -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), max_sessions));
        (Arc::clone(&state), create_router(state))
    }

    async fn send(app: &Router, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn open_start_toggle_close_round_trip() {
        let (state, app) = app(4);

        let response = send(&app, Method::POST, "/breathing").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let opened: ApiResponse = json(response).await;
        assert_eq!(opened.status, "stopped");
        assert_eq!(opened.session.label, "Breathe in...");
        assert_eq!(opened.session.remaining_seconds, 4);
        let id = opened.session.id;

        let started: ApiResponse = json(send(&app, Method::POST, &format!("/breathing/{}/start", id)).await).await;
        assert_eq!(started.status, "running");
        assert_eq!(started.session.toggle_label, "Stop");

        tokio::time::sleep(Duration::from_millis(4500)).await;
        let view: BreathingView = json(send(&app, Method::GET, &format!("/breathing/{}", id)).await).await;
        assert_eq!(view.label, "Hold...");
        assert_eq!(view.remaining_seconds, 4);
        assert!(view.expanded);

        let toggled: ApiResponse = json(send(&app, Method::POST, &format!("/breathing/{}/toggle", id)).await).await;
        assert_eq!(toggled.status, "stopped");
        assert_eq!(toggled.session.label, "Hold...");

        let response = send(&app, Method::DELETE, &format!("/breathing/{}", id)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.session_counts().unwrap(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_over_http() {
        let (_, app) = app(4);
        let opened: ApiResponse = json(send(&app, Method::POST, "/breathing").await).await;
        let uri = format!("/breathing/{}/stop", opened.session.id);

        let first: ApiResponse = json(send(&app, Method::POST, &uri).await).await;
        let second: ApiResponse = json(send(&app, Method::POST, &uri).await).await;
        assert_eq!(first.session, second.session);
        assert!(!second.session.running);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (_, app) = app(4);
        assert_eq!(send(&app, Method::GET, "/breathing/99").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, Method::POST, "/breathing/99/start").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, Method::DELETE, "/breathing/99").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, Method::GET, "/breathing/99/events").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn session_limit_is_enforced() {
        let (_, app) = app(1);
        assert_eq!(send(&app, Method::POST, "/breathing").await.status(), StatusCode::CREATED);
        assert_eq!(send(&app, Method::POST, "/breathing").await.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test(start_paused = true)]
    async fn status_counts_sessions() {
        let (_, app) = app(8);
        let opened: ApiResponse = json(send(&app, Method::POST, "/breathing").await).await;
        send(&app, Method::POST, "/breathing").await;
        send(&app, Method::POST, &format!("/breathing/{}/start", opened.session.id)).await;

        let status: StatusResponse = json(send(&app, Method::GET, "/status").await).await;
        assert_eq!(status.open_sessions, 2);
        assert_eq!(status.running_sessions, 1);
        assert_eq!(status.max_sessions, 8);
        assert_eq!(status.last_action, Some(format!("start {}", opened.session.id)));
    }

    /// Parse the `data:` payload of every `cycle` event in an SSE body
    fn cycle_events(body: &str) -> Vec<BreathingView> {
        body.split("\n\n")
            .filter(|frame| frame.lines().any(|line| line == "event: cycle"))
            .filter_map(|frame| frame.lines().find_map(|line| line.strip_prefix("data:")))
            .map(|data| serde_json::from_str(data.trim()).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn events_stream_current_view_first_and_end_on_close() {
        let (_, app) = app(4);
        let opened: ApiResponse = json(send(&app, Method::POST, "/breathing").await).await;
        let id = opened.session.id;

        let response = send(&app, Method::GET, &format!("/breathing/{}/events", id)).await;
        assert_eq!(response.status(), StatusCode::OK);

        send(&app, Method::POST, &format!("/breathing/{}/start", id)).await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let closed = send(&app, Method::DELETE, &format!("/breathing/{}", id)).await;
        assert_eq!(closed.status(), StatusCode::NO_CONTENT);

        let bytes = tokio::time::timeout(
            Duration::from_secs(5),
            to_bytes(response.into_body(), usize::MAX),
        )
        .await
        .expect("event stream should end once the session is closed")
        .unwrap();
        let events = cycle_events(&String::from_utf8(bytes.to_vec()).unwrap());

        let first = events.first().expect("at least the current view");
        assert_eq!(first.phase, Phase::Inhale);
        assert_eq!(first.remaining_seconds, 4);
        assert!(!first.running);
        assert!(events[1..].iter().any(|view| view.remaining_seconds == 3 && view.running));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (_, app) = app(1);
        let response = send(&app, Method::GET, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
