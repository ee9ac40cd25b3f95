//! Contract tests shared by every `UserRepository` backend.

use chrono::{TimeZone, Utc};
use roster_core::db::open_db_in_memory;
use roster_core::{
    InMemoryUserRepository, SqliteUserRepository, Timestamp, User, UserId, UserRepository,
};
use rusqlite::Connection;

fn at(millis: i64) -> Timestamp {
    Utc.timestamp_millis_opt(millis).unwrap()
}

fn with_each_backend(check: impl Fn(&dyn UserRepository)) {
    let memory = InMemoryUserRepository::new();
    check(&memory);

    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteUserRepository::new(&conn);
    check(&sqlite);
}

#[test]
fn set_assigns_id_and_get_returns_equal_record() {
    with_each_backend(|repo| {
        let saved = repo.set(User::new("guido", "van rossum", at(1_000))).unwrap();
        let id = saved.id.clone().expect("set should assign an id");

        let loaded = repo.get(&id).unwrap().expect("active user should be found");
        assert_eq!(loaded, saved);
        assert_eq!(loaded.created_at, at(1_000));
        assert_eq!(loaded.deleted_at, None);
    });
}

#[test]
fn set_stores_timestamps_at_millisecond_precision() {
    let created_at = Utc.timestamp_nanos(1_700_000_000_123_456_789);
    let deleted_at = Utc.timestamp_nanos(1_700_000_001_987_654_321);

    let observed: Vec<(Timestamp, Option<Timestamp>)> = [true, false]
        .into_iter()
        .map(|in_memory| {
            let memory = InMemoryUserRepository::new();
            let conn = open_db_in_memory().unwrap();
            let sqlite = SqliteUserRepository::new(&conn);
            let repo: &dyn UserRepository = if in_memory { &memory } else { &sqlite };

            let saved = repo.set(User::new("guido", "van rossum", created_at)).unwrap();
            assert_eq!(saved.created_at, at(1_700_000_000_123));
            let id = saved.id.clone().unwrap();
            assert_eq!(repo.get(&id).unwrap(), Some(saved.clone()));

            let mut deleted = saved;
            deleted.deleted_at = Some(deleted_at);
            let stored = repo.set(deleted).unwrap();
            assert_eq!(stored.deleted_at, Some(at(1_700_000_001_987)));

            (stored.created_at, stored.deleted_at)
        })
        .collect();

    assert_eq!(observed[0], observed[1]);
}

#[test]
fn get_unknown_id_returns_none() {
    with_each_backend(|repo| {
        assert!(repo.get(&UserId::from("does-not-exist")).unwrap().is_none());
    });
}

#[test]
fn set_with_existing_id_replaces_instead_of_duplicating() {
    with_each_backend(|repo| {
        let saved = repo.set(User::new("guido", "van rossum", at(1_000))).unwrap();
        let id = saved.id.clone().unwrap();

        let mut renamed = saved.clone();
        renamed.first_name = "Guido".to_string();
        let replaced = repo.set(renamed).unwrap();
        assert_eq!(replaced.id, Some(id.clone()));

        let loaded = repo.get(&id).unwrap().unwrap();
        assert_eq!(loaded.first_name, "Guido");
        assert_eq!(loaded.last_name, "van rossum");
    });
}

#[test]
fn soft_deleted_user_is_hidden_from_get() {
    with_each_backend(|repo| {
        let mut user = repo.set(User::new("guido", "van rossum", at(1_000))).unwrap();
        let id = user.id.clone().unwrap();

        user.deleted_at = Some(at(2_000));
        let stored = repo.set(user).unwrap();
        assert_eq!(stored.deleted_at, Some(at(2_000)));

        assert!(repo.get(&id).unwrap().is_none());
    });
}

#[test]
fn replacing_set_never_clears_tombstone_or_moves_created_at() {
    with_each_backend(|repo| {
        let mut user = repo.set(User::new("guido", "van rossum", at(1_000))).unwrap();
        user.deleted_at = Some(at(2_000));
        let deleted = repo.set(user).unwrap();

        let mut resurrect = deleted.clone();
        resurrect.deleted_at = None;
        resurrect.created_at = at(9_000);
        let stored = repo.set(resurrect).unwrap();

        assert_eq!(stored.deleted_at, Some(at(2_000)));
        assert_eq!(stored.created_at, at(1_000));
        assert!(repo.get(stored.id.as_ref().unwrap()).unwrap().is_none());
    });
}

#[test]
fn in_memory_keeps_tombstones_and_one_entry_per_id() {
    let repo = InMemoryUserRepository::new();
    let mut user = repo.set(User::new("guido", "van rossum", at(1_000))).unwrap();
    repo.set(user.clone()).unwrap();
    user.deleted_at = Some(at(2_000));
    repo.set(user).unwrap();

    assert_eq!(repo.len(), 1);
    assert!(repo.records()[0].is_deleted());
}

#[test]
fn sqlite_keeps_tombstones_and_one_row_per_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(&conn);

    let mut user = repo.set(User::new("guido", "van rossum", at(1_000))).unwrap();
    repo.set(user.clone()).unwrap();
    user.deleted_at = Some(at(2_000));
    let stored = repo.set(user).unwrap();

    assert_eq!(row_count(&conn), 1);
    let deleted_at: Option<i64> = conn
        .query_row(
            "SELECT deleted_at FROM users WHERE id = ?1;",
            [stored.id.unwrap().as_str()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(deleted_at, Some(2_000));
}

#[test]
fn sqlite_rejects_corrupted_timestamp() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (id, first_name, last_name, created_at, deleted_at)
         VALUES ('broken', 'a', 'b', ?1, NULL);",
        [i64::MAX],
    )
    .unwrap();

    let repo = SqliteUserRepository::new(&conn);
    let err = repo.get(&UserId::from("broken")).unwrap_err();
    assert!(err.to_string().contains("users.created_at"), "unexpected error: {err}");
}

#[test]
fn backends_are_observably_equivalent() {
    let memory = InMemoryUserRepository::new();
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteUserRepository::new(&conn);

    assert_eq!(run_script(&memory), run_script(&sqlite));
}

/// Runs a fixed get/set sequence and records results with ids replaced by
/// their creation order, so backends can be compared.
fn run_script(repo: &dyn UserRepository) -> Vec<String> {
    let mut log = Vec::new();
    let mut ids = Vec::new();

    for (index, (first, last)) in [("guido", "van rossum"), ("ada", "lovelace"), ("", "")]
        .into_iter()
        .enumerate()
    {
        let saved = repo.set(User::new(first, last, at(1_000 * index as i64))).unwrap();
        ids.push(saved.id.clone().unwrap());
        log.push(describe(&ids, Some(saved)));
    }

    let mut renamed = repo.get(&ids[1]).unwrap().unwrap();
    renamed.last_name = "king".to_string();
    log.push(describe(&ids, Some(repo.set(renamed).unwrap())));

    let mut deleted = repo.get(&ids[0]).unwrap().unwrap();
    deleted.deleted_at = Some(at(5_000));
    log.push(describe(&ids, Some(repo.set(deleted).unwrap())));

    for id in ids.iter().chain([&UserId::from("unknown")]) {
        log.push(describe(&ids, repo.get(id).unwrap()));
    }

    log
}

fn describe(ids: &[UserId], user: Option<User>) -> String {
    match user {
        None => "absent".to_string(),
        Some(user) => {
            let slot = ids.iter().position(|id| Some(id) == user.id.as_ref());
            format!(
                "{slot:?}|{}|{}|{}|{:?}",
                user.first_name,
                user.last_name,
                user.created_at.timestamp_millis(),
                user.deleted_at.map(|ts| ts.timestamp_millis())
            )
        }
    }
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap()
}
