//! The command dispatcher: the endpoint the build service PUTs to when a
//! commit lands and a build should be scheduled.
//!
//! Works on the raw request path (the job segment is URL-form-encoded by
//! the sender, so the router must not pre-decode it): decode into command
//! and job name, create the command handler, resolve the job, perform,
//! and map the outcome to a JSON response -- 201 when a new queue item
//! was created, 200 otherwise.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use teamgate_core::command::{Command, CommandInput, CommandOutcome};
use teamgate_core::error::CoreError;
use teamgate_core::path::DecodedPath;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET/PUT `/team-build/<command>/<encoded-job-name>`
///
/// All three commands flow through here; the command name in the path
/// selects the handler, case-insensitively.
pub async fn dispatch(State(state): State<AppState>, uri: Uri, body: String) -> Response {
    let decoded = match DecodedPath::parse(uri.path()) {
        Ok(decoded) => decoded,
        Err(err) => return AppError::from(err).into_response(),
    };

    let Some(command) = state.commands.create(&decoded.command) else {
        return AppError::from(CoreError::UnknownCommand {
            name: decoded.command,
        })
        .into_response();
    };

    match perform(&state, command.as_ref(), &decoded, &body).await {
        Ok(outcome) => {
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(with_created_marker(outcome))).into_response()
        }
        Err(err) => {
            if err.is_internal() {
                tracing::error!(
                    command = %decoded.command,
                    error = %err,
                    "error while performing command"
                );
            }
            err.into_response()
        }
    }
}

/// Resolve the job and run the command against it.
async fn perform(
    state: &AppState,
    command: &dyn Command,
    decoded: &DecodedPath,
    body: &str,
) -> AppResult<CommandOutcome> {
    let resolution = state.resolver.resolve(&decoded.job, body).await?;
    let input = CommandInput {
        job_name: &decoded.job,
        job: resolution.job.as_deref(),
        raw: &resolution.raw,
        payload: &resolution.payload,
    };
    Ok(command.perform(&input)?)
}

/// Every success body carries the `created` marker, whatever else the
/// command put in it.
fn with_created_marker(outcome: CommandOutcome) -> Value {
    match outcome.body {
        Value::Object(mut map) => {
            map.insert("created".to_string(), json!(outcome.created));
            Value::Object(map)
        }
        other => json!({ "created": outcome.created, "result": other }),
    }
}
