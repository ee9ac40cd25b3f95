//! User domain model.
//!
//! # Responsibility
//! - Define the user record and its opaque identifier.
//! - Provide the one-way soft-delete transition.
//!
//! # Invariants
//! - `id` is `None` until a repository persists the user for the first time.
//! - `created_at` is fixed at construction.
//! - `deleted_at` is the source of truth for tombstone state and, once set,
//!   is never cleared.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Point in time used for `created_at` / `deleted_at`.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC time at storage precision (milliseconds).
///
/// Both backends keep millisecond timestamps, so values produced here
/// compare equal after a round trip through either of them.
pub fn now_timestamp() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Opaque, storage-assigned user identifier.
///
/// Generated values are v4 UUIDs in 32-char lowercase hex form, but callers
/// must treat the content as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generates a fresh unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Canonical user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the repository on first `set`.
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    pub created_at: Timestamp,
    /// Soft delete tombstone. `None` means active.
    pub deleted_at: Option<Timestamp>,
}

impl User {
    /// Creates an unsaved, active user.
    ///
    /// Names are taken as given; no emptiness check is applied here.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            created_at,
            deleted_at: None,
        }
    }

    /// Marks this user as softly deleted at `at`.
    ///
    /// Returns `false` and leaves the record untouched when the user is
    /// already deleted, so the first tombstone timestamp is kept.
    pub fn soft_delete(&mut self, at: Timestamp) -> bool {
        if self.deleted_at.is_some() {
            return false;
        }
        self.deleted_at = Some(at);
        true
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns whether this user should be visible to lookups.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
