//! Domain model for the user roster.
//!
//! # Responsibility
//! - Define the canonical user record shared by every storage backend.
//! - Keep lifecycle transitions (active -> deleted) on the model itself.
//!
//! # Invariants
//! - Identity is assigned by storage on first persist, never by callers.
//! - Deletion is a soft-delete tombstone, not a hard delete.

pub mod user;
