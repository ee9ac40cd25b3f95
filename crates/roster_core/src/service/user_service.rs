//! User use-case service.
//!
//! # Responsibility
//! - Provide create/save/get/delete entry points for core callers.
//! - Delegate persistence to an injected repository implementation.
//!
//! # Invariants
//! - Service layer remains storage-agnostic.
//! - Deletion is a one-way soft delete; a second delete is a no-op.
//! - Repository errors are returned unchanged, with no retry.

use crate::model::user::{now_timestamp, User, UserId};
use crate::repo::user_repo::{RepoResult, UserRepository};
use log::{debug, info, warn};

/// Use-case service for user lifecycle operations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the injected repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates and persists a new active user.
    ///
    /// # Contract
    /// - `created_at` is the current time, `deleted_at` is unset.
    /// - Names are stored as given, empty strings included.
    /// - Returns the stored user with its assigned id.
    pub fn create_user(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> RepoResult<User> {
        let user = User::new(first_name, last_name, now_timestamp());
        match self.save_user(user) {
            Ok(saved) => {
                info!(
                    "event=user_create module=service status=ok user_id={}",
                    display_id(&saved)
                );
                Ok(saved)
            }
            Err(err) => {
                warn!(
                    "event=user_create module=service status=error error={}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Persists `user` unchanged through the repository upsert.
    pub fn save_user(&self, user: User) -> RepoResult<User> {
        self.repo.set(user)
    }

    /// Gets one active user by id. Deleted and missing users yield `None`.
    pub fn get_user(&self, id: &UserId) -> RepoResult<Option<User>> {
        let found = self.repo.get(id)?;
        debug!(
            "event=user_get module=service status=ok user_id={} found={}",
            id,
            found.is_some()
        );
        Ok(found)
    }

    /// Soft-deletes `user`.
    ///
    /// # Contract
    /// - Active user: `deleted_at` is set to now, the user is persisted and
    ///   `user` is refreshed from the stored record.
    /// - Already deleted user: no-op, no repository call, the original
    ///   timestamp is kept.
    /// - A failed persist leaves `user` untouched, so the delete can be
    ///   retried.
    pub fn delete_user(&self, user: &mut User) -> RepoResult<()> {
        let mut pending = user.clone();
        if !pending.soft_delete(now_timestamp()) {
            debug!(
                "event=user_delete module=service status=skipped reason=already_deleted user_id={}",
                display_id(user)
            );
            return Ok(());
        }

        match self.repo.set(pending) {
            Ok(stored) => {
                *user = stored;
                info!(
                    "event=user_delete module=service status=ok user_id={}",
                    display_id(user)
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=user_delete module=service status=error user_id={} error={}",
                    display_id(user),
                    err
                );
                Err(err)
            }
        }
    }
}

fn display_id(user: &User) -> &str {
    user.id.as_ref().map_or("none", UserId::as_str)
}
