use askdesk_core::db::migrations::latest_version;
use askdesk_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "questions");
    assert_table_exists(&conn, "answers");
    assert_table_exists(&conn, "votes");
    assert_table_exists(&conn, "reports");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("askdesk.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "questions");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn vote_rows_enforce_single_target_shape() {
    let conn = open_db_in_memory().unwrap();
    seed_question(&conn);

    let both = conn.execute(
        "INSERT INTO votes (voter_id, question_id, answer_id, direction)
         VALUES ('v', 1, 1, 'up');",
        [],
    );
    assert!(both.is_err(), "both-target vote rows must be rejected");

    let neither = conn.execute(
        "INSERT INTO votes (voter_id, question_id, answer_id, direction)
         VALUES ('v', NULL, NULL, 'up');",
        [],
    );
    assert!(neither.is_err(), "no-target vote rows must be rejected");
}

#[test]
fn vote_uniqueness_covers_null_target_columns() {
    let conn = open_db_in_memory().unwrap();
    seed_question(&conn);

    conn.execute(
        "INSERT INTO votes (voter_id, question_id, answer_id, direction)
         VALUES ('v', 1, NULL, 'up');",
        [],
    )
    .unwrap();

    // SQLite treats NULLs as distinct in plain unique indexes; the
    // COALESCE index must still reject this duplicate.
    let duplicate = conn.execute(
        "INSERT INTO votes (voter_id, question_id, answer_id, direction)
         VALUES ('v', 1, NULL, 'down');",
        [],
    );
    assert!(duplicate.is_err(), "duplicate (voter, target) must be rejected");
}

fn seed_question(conn: &Connection) {
    conn.execute(
        "INSERT INTO questions (title, description, category, author_id, author_name)
         VALUES ('t', 'd', 'c', 'a', 'n');",
        [],
    )
    .unwrap();
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
