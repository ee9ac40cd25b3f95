//! In-memory user repository.
//!
//! # Responsibility
//! - Back the `UserRepository` contract with a process-local ordered list.
//! - Give tests a deterministic backend with no external state.
//!
//! # Invariants
//! - At most one entry per `UserId`; a replacing `set` moves the entry to
//!   the end of the list.
//! - Tombstoned entries are kept, never removed.
//! - Replacement keeps the stored `created_at` and any stored `deleted_at`,
//!   matching the SQLite backend.
//! - Timestamps are truncated to milliseconds on `set`, the precision the
//!   SQLite backend stores.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::{RepoResult, UserRepository};
use chrono::SubsecRound;
use std::cell::RefCell;

/// Single-threaded in-memory user store. Lives as long as its owner.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RefCell<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, tombstones included.
    pub fn len(&self) -> usize {
        self.users.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.borrow().is_empty()
    }

    /// Snapshot of every stored record in insertion order, tombstones included.
    pub fn records(&self) -> Vec<User> {
        self.users.borrow().clone()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn get(&self, id: &UserId) -> RepoResult<Option<User>> {
        let users = self.users.borrow();
        let found = users
            .iter()
            .find(|user| user.id.as_ref() == Some(id))
            .filter(|user| user.is_active())
            .cloned();
        Ok(found)
    }

    fn set(&self, mut user: User) -> RepoResult<User> {
        let id = user.id.get_or_insert_with(UserId::generate).clone();
        user.created_at = user.created_at.trunc_subsecs(3);
        user.deleted_at = user.deleted_at.map(|at| at.trunc_subsecs(3));

        let mut users = self.users.borrow_mut();
        if let Some(position) = users.iter().position(|u| u.id.as_ref() == Some(&id)) {
            let existing = users.remove(position);
            user.created_at = existing.created_at;
            user.deleted_at = existing.deleted_at.or(user.deleted_at);
        }

        users.push(user.clone());
        Ok(user)
    }
}
