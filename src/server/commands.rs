//! Command submission endpoint.
//!
//! The external dispatcher posts one command per request. The command is
//! applied through the store and the resulting snapshot is returned.
//!
//! Submitting fsyncs the command log, so it runs on the blocking pool.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::AppState;
use crate::commands::{Command, CommandParseError, parse_command};
use crate::store::StoreError;
use crate::types::QueueState;

/// Errors that can occur when submitting a command.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The body could not be parsed as a command.
    #[error("{0}")]
    Parse(#[from] CommandParseError),

    /// The command could not be recorded.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The blocking submit task panicked or was cancelled.
    #[error("submit task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let status = match &self {
            SubmitError::Parse(_) => StatusCode::BAD_REQUEST,
            SubmitError::Store(_) | SubmitError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Command submission handler.
///
/// # Response
///
/// - 200 OK with the resulting `QueueState` as JSON
/// - 400 Bad Request if the body is not a command
/// - 500 Internal Server Error if the command log could not be written
///
/// Unrecognized command kinds are accepted and leave the state unchanged.
///
/// # Example
///
/// ```ignore
/// POST /api/v1/commands HTTP/1.1
/// Content-Type: application/json
///
/// {"type": "DISMISS_QUEUE_ENTRIES", "trigger_kind": "LOGOUT"}
///
/// HTTP/1.1 200 OK
///
/// {"connected": true, "queue": []}
/// ```
pub async fn commands_handler(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<QueueState>, SubmitError> {
    let command = parse_command(&body).inspect_err(|e| {
        warn!(error = %e, "Rejected command body");
    })?;

    if command == Command::Unrecognized {
        debug!("Ignoring unrecognized command kind");
    }

    let result = tokio::task::spawn_blocking(move || {
        let mut store = app_state.store().blocking_lock();
        store.submit(command)
    })
    .await
    .inspect_err(|e| {
        error!(error = %e, "Submit task failed");
    })?;
    let state = result.inspect_err(|e| {
        error!(error = %e, "Failed to record command");
    })?;

    Ok(Json(state))
}
