//! Core domain logic for the user roster.
//!
//! Users are created, looked up and soft-deleted through [`UserService`],
//! which is handed a [`UserRepository`] at construction: SQLite-backed for
//! real storage, in-memory for tests.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{now_timestamp, Timestamp, User, UserId};
pub use repo::memory_repo::InMemoryUserRepository;
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use service::user_service::UserService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
