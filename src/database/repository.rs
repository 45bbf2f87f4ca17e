use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

use crate::database::models::{Task, TaskPatch};
use crate::database::store::{StoreError, TaskStore};
use crate::types::{CallerIdentity, TaskId};

/// Arbitrary key shared by every instance so concurrent bootstraps serialize.
const SCHEMA_LOCK_KEY: i64 = 0x7461_736b_735f_7631;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id SERIAL PRIMARY KEY,
        owner_email VARCHAR(320) NOT NULL,
        title VARCHAR(200) NOT NULL,
        done BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CREATE_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_owner_email ON tasks(owner_email)";

/// Postgres-backed task store. Every statement carries `owner_email = $n`.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgTaskStore {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Bound a store call by the configured deadline. Dropping the returned
    /// future (client went away) cancels the call as well.
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.statement_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(operation)),
        }
    }

    async fn fetch_owned(&self, owner: &CallerIdentity, id: TaskId) -> Result<Option<Task>, StoreError> {
        self.bounded(
            "select task",
            sqlx::query_as::<_, Task>(
                "SELECT id, title, done FROM tasks WHERE id = $1 AND owner_email = $2",
            )
            .bind(id)
            .bind(owner.as_str())
            .fetch_optional(&self.pool),
        )
        .await
    }
}

fn log_failure(operation: &str, owner: &CallerIdentity, id: Option<TaskId>, err: &StoreError) {
    if !matches!(err, StoreError::NotFound) {
        error!(owner = %owner, task_id = ?id, "{} failed: {}", operation, err);
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn bootstrap(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Two instances starting together would otherwise race inside
        // CREATE TABLE IF NOT EXISTS on the catalog's unique indexes.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        sqlx::query(CREATE_OWNER_INDEX).execute(&mut *tx).await?;

        tx.commit().await?;
        info!("Task schema ready");
        Ok(())
    }

    async fn list(&self, owner: &CallerIdentity) -> Result<Vec<Task>, StoreError> {
        self.bounded(
            "list tasks",
            sqlx::query_as::<_, Task>(
                "SELECT id, title, done FROM tasks WHERE owner_email = $1 ORDER BY id DESC",
            )
            .bind(owner.as_str())
            .fetch_all(&self.pool),
        )
        .await
        .inspect_err(|e| log_failure("list tasks", owner, None, e))
    }

    async fn create(&self, owner: &CallerIdentity, title: &str) -> Result<Task, StoreError> {
        self.bounded(
            "create task",
            sqlx::query_as::<_, Task>(
                r#"
                INSERT INTO tasks (owner_email, title, done, created_at)
                VALUES ($1, $2, FALSE, NOW())
                RETURNING id, title, done
                "#,
            )
            .bind(owner.as_str())
            .bind(title)
            .fetch_one(&self.pool),
        )
        .await
        .inspect_err(|e| log_failure("create task", owner, None, e))
    }

    async fn update(
        &self,
        owner: &CallerIdentity,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, StoreError> {
        let result: Result<Task, StoreError> = async {
            let current = self.fetch_owned(owner, id).await?.ok_or(StoreError::NotFound)?;
            let merged = patch.apply_to(current);

            // Zero rows here means the task vanished between read and write
            self.bounded(
                "update task",
                sqlx::query_as::<_, Task>(
                    r#"
                    UPDATE tasks
                    SET title = $1, done = $2
                    WHERE id = $3 AND owner_email = $4
                    RETURNING id, title, done
                    "#,
                )
                .bind(&merged.title)
                .bind(merged.done)
                .bind(id)
                .bind(owner.as_str())
                .fetch_optional(&self.pool),
            )
            .await?
            .ok_or(StoreError::NotFound)
        }
        .await;

        result.inspect_err(|e| log_failure("update task", owner, Some(id), e))
    }

    async fn delete(&self, owner: &CallerIdentity, id: TaskId) -> Result<(), StoreError> {
        let result = self
            .bounded(
                "delete task",
                sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_email = $2")
                    .bind(id)
                    .bind(owner.as_str())
                    .execute(&self.pool),
            )
            .await
            .and_then(|done| {
                if done.rows_affected() == 0 {
                    Err(StoreError::NotFound)
                } else {
                    Ok(())
                }
            });

        result.inspect_err(|e| log_failure("delete task", owner, Some(id), e))
    }
}
