use chrono::{NaiveDate, NaiveDateTime};
use clubgest_core::db::{open_db, open_db_in_memory};
use clubgest_core::{
    AttendanceStore, AttendanceTally, NewPlayer, NewTrainingSession, PlayerId, PlayerRepository,
    RepoError, SessionId, SessionKind, SessionRepository, SqliteAttendanceStore,
    SqlitePlayerRepository, SqliteSessionRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Barrier};
use std::thread;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
}

fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn add_player(conn: &Connection, name: &str, surname: Option<&str>) -> PlayerId {
    let mut player = NewPlayer::new(name);
    player.surname = surname.map(str::to_string);
    SqlitePlayerRepository::new(conn)
        .create_player(&player, today())
        .unwrap()
        .id
}

fn add_session(conn: &Connection, name: &str, starts_at: &str) -> SessionId {
    let mut session = NewTrainingSession::new(name, at(starts_at));
    session.kind = Some(SessionKind::Mixed);
    session.location = Some("Main pitch".to_string());
    SqliteSessionRepository::new(conn)
        .create_session(&session)
        .unwrap()
        .id
}

#[test]
fn upsert_inserts_then_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAttendanceStore::new(&conn);

    let first = store.upsert(1, 10, true).unwrap();
    let second = store.upsert(1, 10, true).unwrap();
    assert_eq!(first.id, second.id);
    assert!(second.present);

    let toggled = store.upsert(1, 10, false).unwrap();
    assert_eq!(toggled.id, first.id);
    assert!(!toggled.present);

    let found = store.find(1, 10).unwrap().unwrap();
    assert_eq!(found, toggled);
    assert_eq!(store.tally_for_player(1).unwrap().total, 1);
}

#[test]
fn upsert_assigns_distinct_ids_per_pair() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAttendanceStore::new(&conn);

    let a = store.upsert(1, 10, true).unwrap();
    let b = store.upsert(1, 11, true).unwrap();
    let c = store.upsert(2, 10, false).unwrap();

    assert_ne!(a.id, b.id);
    assert_ne!(a.id, c.id);
    assert_eq!(c.player_id, 2);
    assert_eq!(c.session_id, 10);
}

#[test]
fn find_missing_pair_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAttendanceStore::new(&conn);

    store.upsert(1, 10, true).unwrap();
    assert!(store.find(1, 11).unwrap().is_none());
    assert!(store.find(2, 10).unwrap().is_none());
}

#[test]
fn remove_reports_changed_count_without_failing_on_missing_pair() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAttendanceStore::new(&conn);

    assert_eq!(store.remove(1, 10).unwrap(), 0);

    store.upsert(1, 10, true).unwrap();
    assert_eq!(store.remove(1, 10).unwrap(), 1);
    assert!(store.find(1, 10).unwrap().is_none());
    assert_eq!(store.remove(1, 10).unwrap(), 0);
}

#[test]
fn list_by_session_orders_by_player_name() {
    let conn = open_db_in_memory().unwrap();
    let session = add_session(&conn, "Scrum session", "2025-12-13T19:00:00");
    let pablo = add_player(&conn, "Pablo", Some("López"));
    let carlos_m = add_player(&conn, "Carlos", Some("Martínez"));
    let alberto = add_player(&conn, "Alberto", None);
    let carlos_g = add_player(&conn, "Carlos", Some("García"));
    let bruno = add_player(&conn, "bruno", Some("Sáez"));

    let store = SqliteAttendanceStore::new(&conn);
    store.upsert(bruno, session, true).unwrap();
    store.upsert(pablo, session, true).unwrap();
    store.upsert(carlos_m, session, false).unwrap();
    store.upsert(alberto, session, true).unwrap();
    store.upsert(carlos_g, session, true).unwrap();

    let entries = store.list_by_session(session).unwrap();
    let names: Vec<(String, Option<String>)> = entries
        .iter()
        .map(|entry| (entry.player_name.clone(), entry.player_surname.clone()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Alberto".to_string(), None),
            ("Carlos".to_string(), Some("García".to_string())),
            ("Carlos".to_string(), Some("Martínez".to_string())),
            ("Pablo".to_string(), Some("López".to_string())),
            ("bruno".to_string(), Some("Sáez".to_string())),
        ]
    );
    assert!(!entries[2].record.present);
}

#[test]
fn list_by_player_orders_by_session_datetime_descending() {
    let conn = open_db_in_memory().unwrap();
    let player = add_player(&conn, "Diego", None);
    let middle = add_session(&conn, "Tactics", "2025-12-12T18:30:00");
    let latest = add_session(&conn, "Strength", "2025-12-18T17:00:00");
    let earliest = add_session(&conn, "Passing", "2025-12-09T18:30:00");

    let store = SqliteAttendanceStore::new(&conn);
    store.upsert(player, earliest, true).unwrap();
    store.upsert(player, latest, false).unwrap();
    store.upsert(player, middle, true).unwrap();

    let entries = store.list_by_player(player).unwrap();
    let ids: Vec<SessionId> = entries.iter().map(|entry| entry.record.session_id).collect();
    assert_eq!(ids, vec![latest, middle, earliest]);
    assert_eq!(entries[0].session_name, "Strength");
    assert_eq!(entries[0].starts_at, at("2025-12-18T17:00:00"));
    assert_eq!(entries[0].kind, Some(SessionKind::Mixed));
    assert_eq!(entries[0].location.as_deref(), Some("Main pitch"));
}

#[test]
fn tally_counts_present_and_total() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAttendanceStore::new(&conn);

    assert_eq!(store.tally_for_player(5).unwrap(), AttendanceTally::default());

    store.upsert(5, 1, true).unwrap();
    store.upsert(5, 2, true).unwrap();
    store.upsert(5, 3, false).unwrap();
    store.upsert(6, 1, true).unwrap();

    assert_eq!(
        store.tally_for_player(5).unwrap(),
        AttendanceTally {
            total: 3,
            present: 2
        }
    );
}

#[test]
fn orphaned_rows_leave_listings_but_still_count() {
    let conn = open_db_in_memory().unwrap();
    let player = add_player(&conn, "Sergio", None);
    let kept = add_session(&conn, "Kicking", "2025-12-19T18:30:00");
    let dropped = add_session(&conn, "Rain check", "2025-12-20T18:30:00");

    let store = SqliteAttendanceStore::new(&conn);
    store.upsert(player, kept, true).unwrap();
    store.upsert(player, dropped, false).unwrap();

    SqliteSessionRepository::new(&conn)
        .delete_session(dropped)
        .unwrap();

    assert!(store.find(player, dropped).unwrap().is_some());
    assert_eq!(store.list_by_player(player).unwrap().len(), 1);
    assert_eq!(store.tally_for_player(player).unwrap().total, 2);
}

#[test]
fn invalid_persisted_present_value_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO attendance (player_id, session_id, present) VALUES (1, 1, 7);",
    )
    .unwrap();

    let store = SqliteAttendanceStore::new(&conn);
    let err = store.find(1, 1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("attendance.present")));
}

#[test]
fn concurrent_upserts_of_one_pair_never_insert_twice() {
    const WORKERS: usize = 4;
    const ROUNDS: u32 = 25;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("club.sqlite3");
    let conn = open_db(&path).unwrap();
    let player = add_player(&conn, "Hugo", None);
    let sessions: Vec<SessionId> = (1..=ROUNDS)
        .map(|day| add_session(&conn, "Sprint block", &format!("2025-10-{day:02}T18:00:00")))
        .collect();

    // One connection per worker, opened up front so only the upserts contend.
    let connections: Vec<Connection> = (0..WORKERS).map(|_| open_db(&path).unwrap()).collect();
    let barrier = Arc::new(Barrier::new(WORKERS));
    let workers: Vec<_> = connections
        .into_iter()
        .enumerate()
        .map(|(worker, worker_conn)| {
            let sessions = sessions.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = SqliteAttendanceStore::new(&worker_conn);
                sessions
                    .iter()
                    .map(|&session| {
                        barrier.wait();
                        store.upsert(player, session, worker % 2 == 0).unwrap().id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let ids: Vec<Vec<i64>> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();

    for round in 0..sessions.len() {
        assert!(
            ids.iter().all(|worker| worker[round] == ids[0][round]),
            "round {round} produced different ids"
        );
    }
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM attendance;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, i64::from(ROUNDS));
    let tally = SqliteAttendanceStore::new(&conn)
        .tally_for_player(player)
        .unwrap();
    assert_eq!(tally.total, u64::from(ROUNDS));
}
