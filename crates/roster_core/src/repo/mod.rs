//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the `{get, set}` user storage contract.
//! - Isolate SQLite query details from service orchestration.
//! - Provide an in-memory backend with the same observable behavior.
//!
//! # Invariants
//! - Every backend returns only active users from `get`.
//! - `set` is a pure upsert keyed by `UserId`.

pub mod memory_repo;
pub mod user_repo;
