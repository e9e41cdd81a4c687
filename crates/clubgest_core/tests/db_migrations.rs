use clubgest_core::db::migrations::latest_version;
use clubgest_core::db::{close_db, open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "players");
    assert_table_exists(&conn, "sessions");
    assert_table_exists(&conn, "attendance");
}

#[test]
fn in_memory_databases_are_isolated() {
    let first = open_db_in_memory().unwrap();
    let second = open_db_in_memory().unwrap();

    first
        .execute("INSERT INTO players (name) VALUES ('Carlos');", [])
        .unwrap();

    assert_eq!(count_rows(&first, "players"), 1);
    assert_eq!(count_rows(&second, "players"), 0);
}

#[test]
fn reopening_file_database_keeps_data_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clubgest.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO players (name) VALUES ('Juan');", [])
        .unwrap();
    close_db(conn_first).unwrap();

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_eq!(count_rows(&conn_second, "players"), 1);
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
fn attendance_pair_is_unique_at_storage_level() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO attendance (player_id, session_id, present) VALUES (1, 1, 1);",
        [],
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO attendance (player_id, session_id, present) VALUES (1, 1, 0);",
        [],
    );
    assert!(duplicate.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
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
