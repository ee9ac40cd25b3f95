//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the get/upsert API over canonical `users` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `get` never returns a tombstoned row.
//! - `set` assigns an id when absent and otherwise replaces in place.
//! - A replacing `set` keeps the stored `created_at` and never clears a
//!   stored `deleted_at`.
//! - Timestamps are kept at millisecond precision.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::user::{Timestamp, User, UserId};
use chrono::DateTime;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    created_at,
    deleted_at
FROM users";

const USER_UPSERT_SQL: &str = "INSERT INTO users (
        id,
        first_name,
        last_name,
        created_at,
        deleted_at
    ) VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
        first_name = excluded.first_name,
        last_name = excluded.last_name,
        deleted_at = COALESCE(users.deleted_at, excluded.deleted_at)
    RETURNING
        id,
        first_name,
        last_name,
        created_at,
        deleted_at;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for users.
///
/// Implementations must be observably equivalent: the same sequence of
/// calls yields the same results on every backend, apart from the values
/// of generated ids.
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository {
    /// Returns the active user with `id`.
    ///
    /// Missing and soft-deleted users both yield `Ok(None)`.
    fn get(&self, id: &UserId) -> RepoResult<Option<User>>;

    /// Inserts or replaces `user` and returns the stored record.
    ///
    /// A user without an id gets a newly generated one.
    fn set(&self, user: User) -> RepoResult<User>;
}

impl<R: UserRepository + ?Sized> UserRepository for &R {
    fn get(&self, id: &UserId) -> RepoResult<Option<User>> {
        (**self).get(id)
    }

    fn set(&self, user: User) -> RepoResult<User> {
        (**self).set(user)
    }
}

impl<R: UserRepository + ?Sized> UserRepository for Box<R> {
    fn get(&self, id: &UserId) -> RepoResult<Option<User>> {
        (**self).get(id)
    }

    fn set(&self, user: User) -> RepoResult<User> {
        (**self).set(user)
    }
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get(&self, id: &UserId) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE id = ?1
               AND deleted_at IS NULL;"
        ))?;

        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn set(&self, user: User) -> RepoResult<User> {
        let id = user.id.clone().unwrap_or_else(UserId::generate);

        // Upsert with RETURNING always yields exactly one row.
        self.conn.query_row(
            USER_UPSERT_SQL,
            params![
                id.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.created_at.timestamp_millis(),
                user.deleted_at.map(|at| at.timestamp_millis()),
            ],
            |row| Ok(parse_user_row(row)),
        )?
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id: String = row.get("id")?;
    let created_at = millis_to_timestamp(row.get("created_at")?, "created_at")?;
    let deleted_at = match row.get::<_, Option<i64>>("deleted_at")? {
        Some(value) => Some(millis_to_timestamp(value, "deleted_at")?),
        None => None,
    };

    Ok(User {
        id: Some(UserId::from(id)),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        created_at,
        deleted_at,
    })
}

fn millis_to_timestamp(value: i64, column: &str) -> RepoResult<Timestamp> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in users.{column}"))
    })
}
