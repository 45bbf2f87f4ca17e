use axum::extract::{rejection::PathRejection, Path};

use crate::database::models::{normalize_title, TitleError};
use crate::error::ApiError;
use crate::types::TaskId;

/// Parse the `{id}` path segment. Anything that is not an integer is a 400,
/// kept apart from the 404 for well-formed ids the caller does not own.
pub fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse::<TaskId>()
        .map_err(|_| ApiError::bad_request("Invalid task id"))
}

/// Unwrap the raw `{id}` segment; undecodable segments get the same 400 as
/// non-numeric ones.
pub fn task_id_segment(path: Result<Path<String>, PathRejection>) -> Result<TaskId, ApiError> {
    let Path(raw) = path.map_err(|_| ApiError::bad_request("Invalid task id"))?;
    parse_task_id(&raw)
}

/// Trim and validate a title, reporting emptiness with `empty_message`.
pub fn validated_title(raw: &str, empty_message: &str) -> Result<String, ApiError> {
    normalize_title(raw).map_err(|e| match e {
        TitleError::Empty => ApiError::bad_request(empty_message),
        TitleError::TooLong => ApiError::bad_request("Task title is too long"),
    })
}
