//! HTTP server for the offline queue.
//!
//! # Endpoints
//!
//! - `POST /api/v1/commands` - Applies one command, returns the new state
//! - `GET /api/v1/state` - Returns the current state as JSON
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::store::QueueStore;

pub mod commands;
pub mod health;
pub mod state;

pub use commands::commands_handler;
pub use health::health_handler;
pub use state::state_handler;

/// Shared application state.
///
/// The store sits behind a mutex so commands are applied one at a time.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Mutex<QueueStore>,
}

impl AppState {
    pub fn new(store: QueueStore) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                store: Mutex::new(store),
            }),
        }
    }

    /// Returns the store slot.
    pub fn store(&self) -> &Mutex<QueueStore> {
        &self.inner.store
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/api/v1/commands", post(commands_handler))
        .route("/api/v1/state", get(state_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::state::QueueConfig;
    use crate::store::DEFAULT_COMPACT_AFTER;
    use crate::types::{AppointmentId, QueueState};

    /// Creates a test app state backed by a temporary directory.
    fn test_app_state() -> (AppState, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = QueueStore::open(dir.path(), QueueConfig::default(), DEFAULT_COMPACT_AFTER).unwrap();
        (AppState::new(store), dir)
    }

    fn command_request(body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/commands")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ─── Health endpoint tests ───

    #[tokio::test]
    async fn health_returns_200() {
        let (state, _dir) = test_app_state();
        let app = build_router(state);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    // ─── Command endpoint tests ───

    #[tokio::test]
    async fn defer_command_returns_new_state() {
        let (state, _dir) = test_app_state();
        let app = build_router(state);

        let response = app
            .oneshot(command_request(&json!({
                "type": "DEFER_FOR_RETRY",
                "prev_action": {"kind": "SYNC_APPOINTMENT", "payload": {"rev": 1}},
                "meta": {"retry": true, "appointment_id": 9}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let parsed: QueueState = body_json(response).await;
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.queue[0].appointment_id(), Some(AppointmentId::Number(9)));
    }

    #[tokio::test]
    async fn string_appointment_id_is_accepted() {
        let (state, _dir) = test_app_state();
        let app = build_router(state);

        let response = app
            .oneshot(command_request(&json!({
                "type": "DEFER_FOR_RETRY",
                "prev_action": {"kind": "SYNC_APPOINTMENT"},
                "meta": {"retry": true, "appointment_id": "a-17"}
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let parsed: QueueState = body_json(response).await;
        assert_eq!(parsed.queue[0].appointment_id(), Some(AppointmentId::from("a-17")));
    }

    #[tokio::test]
    async fn unrecognized_command_is_accepted_as_noop() {
        let (state, _dir) = test_app_state();
        let app = build_router(state);

        let response = app
            .oneshot(command_request(&json!({"type": "FETCH_APPOINTMENTS"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let parsed: QueueState = body_json(response).await;
        assert_eq!(parsed, QueueState::initial());
    }

    #[tokio::test]
    async fn malformed_command_returns_400() {
        let (state, _dir) = test_app_state();
        let app = build_router(state);

        let response = app
            .oneshot(command_request(&json!({"type": "CONNECTIVITY_CHANGED", "connected": "no"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_json_body_returns_400() {
        let (state, _dir) = test_app_state();
        let app = build_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/commands")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ─── State endpoint tests ───

    #[tokio::test]
    async fn state_reflects_submitted_commands() {
        let (state, _dir) = test_app_state();

        let response = build_router(state.clone())
            .oneshot(command_request(&json!({"type": "CONNECTIVITY_CHANGED", "connected": false})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder().uri("/api/v1/state").body(Body::empty()).unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let parsed: QueueState = body_json(response).await;
        assert!(!parsed.connected);
        assert!(parsed.is_empty());
    }
}
