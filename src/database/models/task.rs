use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::types::TaskId;

/// Upper bound on a stored title, matching the `VARCHAR(200)` column.
pub const MAX_TITLE_CHARS: usize = 200;

/// A task as exposed to clients. Owner and creation time stay in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("title is empty")]
    Empty,
    #[error("title exceeds the maximum length")]
    TooLong,
}

/// Trim a client-supplied title and check it can be stored.
pub fn normalize_title(raw: &str) -> Result<String, TitleError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TitleError::Empty);
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(TitleError::TooLong);
    }
    Ok(title.to_string())
}

/// One field of a partial update.
///
/// `Absent` and `Null` both leave the stored value alone; only `Value`
/// replaces it. An empty string is a `Value` and is rejected upstream,
/// never mistaken for "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        FieldPatch::Absent
    }
}

impl<T> FieldPatch<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            FieldPatch::Value(v) => Some(v),
            FieldPatch::Absent | FieldPatch::Null => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldPatch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; missing keys use Default
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => FieldPatch::Value(v),
            None => FieldPatch::Null,
        })
    }
}

/// Body of `PUT /tasks/{id}`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: FieldPatch<String>,
    #[serde(default)]
    pub done: FieldPatch<bool>,
}

impl TaskPatch {
    /// Merge the present fields over the current row.
    pub fn apply_to(&self, current: Task) -> Task {
        Task {
            id: current.id,
            title: self.title.as_value().cloned().unwrap_or(current.title),
            done: self.done.as_value().copied().unwrap_or(current.done),
        }
    }
}
