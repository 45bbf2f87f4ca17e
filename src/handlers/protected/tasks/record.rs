use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Extension, Path, State,
    },
};
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::{FieldPatch, Task, TaskPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::CallerIdentity;

use super::utils::{task_id_segment, validated_title};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// PUT /tasks/:id - Partially update one of the caller's tasks
pub async fn put(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Task> {
    let id = task_id_segment(path)?;
    let body = body.map_err(|_| ApiError::invalid_json("Invalid JSON"))?;

    let mut patch: TaskPatch =
        serde_json::from_slice(&body).map_err(|_| ApiError::invalid_json("Invalid JSON"))?;

    // A present title is replaced by its trimmed form; it can never be cleared
    if let FieldPatch::Value(title) = &patch.title {
        patch.title = FieldPatch::Value(validated_title(title, "Title cannot be empty")?);
    }

    let task = state
        .store
        .update(&caller, id, &patch)
        .await
        .map_err(|e| ApiError::from_store(e, "Update task failed"))?;

    Ok(ApiResponse::success(task))
}

/// DELETE /tasks/:id - Delete one of the caller's tasks
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<DeleteResponse> {
    let id = task_id_segment(path)?;

    state
        .store
        .delete(&caller, id)
        .await
        .map_err(|e| ApiError::from_store(e, "Delete task failed"))?;

    tracing::info!(owner = %caller, task_id = id, "task deleted");
    Ok(ApiResponse::success(DeleteResponse { ok: true }))
}
