use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use crate::database::models::{Task, TaskPatch, MAX_TITLE_CHARS};
use crate::database::store::{StoreError, TaskStore};
use crate::types::{CallerIdentity, TaskId};

pub const TEST_SECRET: &str = "ci-test-secret";

/// HS256 token for `subject`, valid for an hour, signed with `TEST_SECRET`.
pub fn token_for(subject: &str) -> String {
    token_with_secret(subject, TEST_SECRET)
}

pub fn token_with_secret(subject: &str, secret: &str) -> String {
    let exp = (Utc::now() + Duration::minutes(60)).timestamp();
    sign(json!({ "sub": subject, "exp": exp }), secret)
}

pub fn expired_token(subject: &str) -> String {
    let exp = (Utc::now() - Duration::hours(2)).timestamp();
    sign(json!({ "sub": subject, "exp": exp }), TEST_SECRET)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

fn sign(claims: serde_json::Value, secret: &str) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("sign test token")
}

#[derive(Debug, Clone)]
struct StoredTask {
    owner: String,
    task: Task,
}

/// In-process `TaskStore` for router tests. Same ownership rules as the
/// Postgres store; counts calls so tests can assert none were made.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: Mutex<BTreeMap<TaskId, StoredTask>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryTaskStore {
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next data call fail as if the backend were unreachable.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn bootstrap(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(&self, owner: &CallerIdentity) -> Result<Vec<Task>, StoreError> {
        self.enter()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .rev()
            .filter(|row| row.owner == owner.as_str())
            .map(|row| row.task.clone())
            .collect())
    }

    async fn create(&self, owner: &CallerIdentity, title: &str) -> Result<Task, StoreError> {
        self.enter()?;
        assert!(title.chars().count() <= MAX_TITLE_CHARS, "column bound exceeded");

        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1) as TaskId;
        let task = Task { id, title: title.to_string(), done: false };
        self.rows.lock().unwrap().insert(
            id,
            StoredTask { owner: owner.as_str().to_string(), task: task.clone() },
        );
        Ok(task)
    }

    async fn update(
        &self,
        owner: &CallerIdentity,
        id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Task, StoreError> {
        self.enter()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(row) if row.owner == owner.as_str() => {
                row.task = patch.apply_to(row.task.clone());
                Ok(row.task.clone())
            }
            _ => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, owner: &CallerIdentity, id: TaskId) -> Result<(), StoreError> {
        self.enter()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get(&id) {
            Some(row) if row.owner == owner.as_str() => {
                rows.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound),
        }
    }
}
