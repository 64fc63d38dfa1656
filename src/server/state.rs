//! State inspection endpoint.

use axum::Json;
use axum::extract::State;

use super::AppState;
use crate::types::QueueState;

/// Returns the current queue snapshot as JSON.
///
/// # Example
///
/// ```ignore
/// GET /api/v1/state HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// {"connected": false, "queue": [{"kind": "SYNC_APPOINTMENT", "payload": null, "meta": {...}}]}
/// ```
pub async fn state_handler(State(app_state): State<AppState>) -> Json<QueueState> {
    let store = app_state.store().lock().await;
    Json(store.state().clone())
}
