use axum::extract::{rejection::QueryRejection, Extension, Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::Task;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::CallerIdentity;

use super::utils::validated_title;

#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    pub title: Option<String>,
}

/// GET /tasks - List the caller's tasks, newest first
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Vec<Task>> {
    let tasks = state
        .store
        .list(&caller)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to load tasks"))?;

    Ok(ApiResponse::success(tasks))
}

/// POST /tasks?title=... - Create a task owned by the caller
pub async fn post(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    query: Result<Query<CreateQuery>, QueryRejection>,
) -> ApiResult<Task> {
    let Query(query) = query.map_err(|_| ApiError::bad_request("Invalid query string"))?;
    let title = validated_title(
        query.title.as_deref().unwrap_or_default(),
        "Task title cannot be empty",
    )?;

    let task = state
        .store
        .create(&caller, &title)
        .await
        .map_err(|e| ApiError::from_store(e, "Create task failed"))?;

    tracing::info!(owner = %caller, task_id = task.id, "task created");
    Ok(ApiResponse::success(task))
}
