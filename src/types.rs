/// Shared types used across the codebase

use std::fmt;

/// Verified identity of the caller, taken from the `sub` claim of its bearer token.
///
/// Doubles as the ownership key for stored tasks. Only the token verifier builds
/// one from a request, so holding a value means authentication already succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub(crate) fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned task identifier (`SERIAL` column).
pub type TaskId = i32;
