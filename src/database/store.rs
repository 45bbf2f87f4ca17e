use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Task, TaskPatch};
use crate::types::{CallerIdentity, TaskId};

/// Errors from task store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row with this id belongs to the caller. Also covers ids owned by
    /// someone else, so existence never leaks across owners.
    #[error("task not found")]
    NotFound,

    #[error("{0} exceeded its deadline")]
    Timeout(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Ownership-scoped task persistence.
///
/// Every data operation takes the caller identity and must filter or stamp on
/// it; there is deliberately no way to reach a row without one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Idempotent schema bootstrap, safe to run from several instances at once.
    async fn bootstrap(&self) -> Result<(), StoreError>;

    /// Caller's tasks, newest id first.
    async fn list(&self, owner: &CallerIdentity) -> Result<Vec<Task>, StoreError>;

    /// Insert a new not-done task. `title` is already trimmed and validated.
    async fn create(&self, owner: &CallerIdentity, title: &str) -> Result<Task, StoreError>;

    /// Read-modify-write of one owned task. Last writer wins.
    async fn update(
        &self,
        owner: &CallerIdentity,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, StoreError>;

    async fn delete(&self, owner: &CallerIdentity, id: TaskId) -> Result<(), StoreError>;
}
