//! Request dispatch: route matching, input decoding and service calls.
//!
//! Each handler decodes its input on the async side, then runs exactly one
//! service call on the blocking pool through [`AppState::with_connection`].

use crate::error::{empty_response, json_response, ApiError};
use crate::request::{
    parse_json, parse_path_id, parse_record_attendance, parse_session_active,
    parse_update_attendance,
};
use crate::routes::{match_route, Route};
use crate::state::AppState;
use clubgest_core::{
    AttendanceService, NewPlayer, NewTrainingSession, PlayerId, RosterService, SessionId,
    SqliteAttendanceStore, SqlitePlayerRepository, SqliteSessionRepository, ValidationErrors,
};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use log::info;
use rusqlite::Connection;
use serde_json::json;
use std::time::Instant;

type HttpResponse = Response<Full<Bytes>>;
type HandlerResult = Result<HttpResponse, ApiError>;

type SqliteAttendanceService<'conn> = AttendanceService<
    SqliteAttendanceStore<'conn>,
    SqlitePlayerRepository<'conn>,
    SqliteSessionRepository<'conn>,
>;
type SqliteRosterService<'conn> =
    RosterService<SqlitePlayerRepository<'conn>, SqliteSessionRepository<'conn>>;

fn attendance(conn: &Connection) -> SqliteAttendanceService<'_> {
    AttendanceService::new(
        SqliteAttendanceStore::new(conn),
        SqlitePlayerRepository::new(conn),
        SqliteSessionRepository::new(conn),
    )
}

fn roster(conn: &Connection) -> SqliteRosterService<'_> {
    RosterService::new(
        SqlitePlayerRepository::new(conn),
        SqliteSessionRepository::new(conn),
    )
}

/// Routes one request and renders its response, errors included.
///
/// Socket-free entry point: the server feeds it collected bodies and tests
/// call it directly.
pub async fn dispatch(state: &AppState, method: &Method, path: &str, body: Bytes) -> HttpResponse {
    let started = Instant::now();
    let response = route(state, method, path, &body)
        .await
        .unwrap_or_else(ApiError::into_response);
    let code = response.status();
    info!(
        "event=http_request module=http status={} method={} path={} http_status={} duration_ms={}",
        if code.is_server_error() { "error" } else { "ok" },
        method,
        path,
        code.as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn route(state: &AppState, method: &Method, path: &str, body: &[u8]) -> HandlerResult {
    let route = match_route(path).ok_or_else(|| ApiError::unknown_route(path))?;
    match (route, method) {
        (Route::Status, &Method::GET) => server_status(state).await,

        (Route::Players, &Method::GET) => list_players(state).await,
        (Route::Players, &Method::POST) => create_player(state, body).await,
        (Route::Player(raw), &Method::GET) => get_player(state, &raw).await,
        (Route::Player(raw), &Method::PUT) => update_player(state, &raw, body).await,
        (Route::Player(raw), &Method::DELETE) => delete_player(state, &raw).await,

        (Route::Sessions, &Method::GET) => list_sessions(state).await,
        (Route::Sessions, &Method::POST) => create_session(state, body).await,
        (Route::Session(raw), &Method::GET) => get_session(state, &raw).await,
        (Route::Session(raw), &Method::PUT) => update_session(state, &raw, body).await,
        (Route::SessionActive(raw), &Method::PATCH) => {
            set_session_active(state, &raw, body).await
        }
        (Route::Session(raw), &Method::DELETE) => delete_session(state, &raw).await,

        (Route::Attendance, &Method::POST) => record_attendance(state, body).await,
        (Route::AttendanceBySession(raw), &Method::GET) => list_for_session(state, &raw).await,
        (Route::AttendanceByPlayer(raw), &Method::GET) => list_for_player(state, &raw).await,
        (Route::AttendanceStats(raw), &Method::GET) => statistics(state, &raw).await,
        (Route::AttendancePair { player, session }, &Method::PATCH) => {
            update_attendance(state, &player, &session, body).await
        }
        (Route::AttendancePair { player, session }, &Method::DELETE) => {
            remove_attendance(state, &player, &session).await
        }

        _ => Err(ApiError::MethodNotAllowed),
    }
}

async fn server_status(state: &AppState) -> HandlerResult {
    let schema_version: i64 = state
        .with_connection(|conn| {
            conn.query_row("PRAGMA user_version", [], |row| row.get(0))
                .map_err(|err| ApiError::Internal(err.to_string()))
        })
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "schemaVersion": schema_version,
        }),
    ))
}

async fn list_players(state: &AppState) -> HandlerResult {
    let players = state
        .with_connection(|conn| Ok(roster(conn).list_players()?))
        .await?;
    Ok(json_response(StatusCode::OK, &players))
}

async fn create_player(state: &AppState, body: &[u8]) -> HandlerResult {
    let player: NewPlayer = parse_json(body)?;
    let created = state
        .with_connection(move |conn| Ok(roster(conn).create_player(&player)?))
        .await?;
    Ok(json_response(StatusCode::CREATED, &created))
}

async fn get_player(state: &AppState, raw: &str) -> HandlerResult {
    let id = parse_path_id("id", raw)?;
    let player = state
        .with_connection(move |conn| Ok(roster(conn).get_player(id)?))
        .await?;
    Ok(json_response(StatusCode::OK, &player))
}

async fn update_player(state: &AppState, raw: &str, body: &[u8]) -> HandlerResult {
    let id = parse_path_id("id", raw)?;
    let player: NewPlayer = parse_json(body)?;
    let updated = state
        .with_connection(move |conn| Ok(roster(conn).update_player(id, &player)?))
        .await?;
    Ok(json_response(StatusCode::OK, &updated))
}

async fn delete_player(state: &AppState, raw: &str) -> HandlerResult {
    let id = parse_path_id("id", raw)?;
    state
        .with_connection(move |conn| Ok(roster(conn).delete_player(id)?))
        .await?;
    Ok(empty_response(StatusCode::NO_CONTENT))
}

async fn list_sessions(state: &AppState) -> HandlerResult {
    let sessions = state
        .with_connection(|conn| Ok(roster(conn).list_sessions()?))
        .await?;
    Ok(json_response(StatusCode::OK, &sessions))
}

async fn create_session(state: &AppState, body: &[u8]) -> HandlerResult {
    let session: NewTrainingSession = parse_json(body)?;
    let created = state
        .with_connection(move |conn| Ok(roster(conn).create_session(&session)?))
        .await?;
    Ok(json_response(StatusCode::CREATED, &created))
}

async fn get_session(state: &AppState, raw: &str) -> HandlerResult {
    let id = parse_path_id("id", raw)?;
    let session = state
        .with_connection(move |conn| Ok(roster(conn).get_session(id)?))
        .await?;
    Ok(json_response(StatusCode::OK, &session))
}

async fn update_session(state: &AppState, raw: &str, body: &[u8]) -> HandlerResult {
    let id = parse_path_id("id", raw)?;
    let session: NewTrainingSession = parse_json(body)?;
    let updated = state
        .with_connection(move |conn| Ok(roster(conn).update_session(id, &session)?))
        .await?;
    Ok(json_response(StatusCode::OK, &updated))
}

async fn set_session_active(state: &AppState, raw: &str, body: &[u8]) -> HandlerResult {
    let id = parse_path_id("id", raw)?;
    let active = parse_session_active(body)?;
    let updated = state
        .with_connection(move |conn| Ok(roster(conn).set_session_active(id, active)?))
        .await?;
    Ok(json_response(StatusCode::OK, &updated))
}

async fn delete_session(state: &AppState, raw: &str) -> HandlerResult {
    let id = parse_path_id("id", raw)?;
    state
        .with_connection(move |conn| Ok(roster(conn).delete_session(id)?))
        .await?;
    Ok(empty_response(StatusCode::NO_CONTENT))
}

async fn record_attendance(state: &AppState, body: &[u8]) -> HandlerResult {
    let request = parse_record_attendance(body)?;
    let record = state
        .with_connection(move |conn| {
            Ok(attendance(conn).record_attendance(
                request.player_id,
                request.session_id,
                request.present,
            )?)
        })
        .await?;
    Ok(json_response(StatusCode::CREATED, &record))
}

async fn update_attendance(
    state: &AppState,
    player: &str,
    session: &str,
    body: &[u8],
) -> HandlerResult {
    let (player_id, session_id) = pair_ids(player, session)?;
    let present = parse_update_attendance(body)?;
    state
        .with_connection(move |conn| {
            Ok(attendance(conn).update_attendance(player_id, session_id, present)?)
        })
        .await?;
    Ok(empty_response(StatusCode::NO_CONTENT))
}

async fn remove_attendance(state: &AppState, player: &str, session: &str) -> HandlerResult {
    let (player_id, session_id) = pair_ids(player, session)?;
    state
        .with_connection(move |conn| Ok(attendance(conn).remove_attendance(player_id, session_id)?))
        .await?;
    Ok(empty_response(StatusCode::NO_CONTENT))
}

async fn list_for_session(state: &AppState, raw: &str) -> HandlerResult {
    let session_id = parse_path_id("sessionId", raw)?;
    let entries = state
        .with_connection(move |conn| Ok(attendance(conn).list_for_session(session_id)?))
        .await?;
    Ok(json_response(StatusCode::OK, &entries))
}

async fn list_for_player(state: &AppState, raw: &str) -> HandlerResult {
    let player_id = parse_path_id("playerId", raw)?;
    let entries = state
        .with_connection(move |conn| Ok(attendance(conn).list_for_player(player_id)?))
        .await?;
    Ok(json_response(StatusCode::OK, &entries))
}

async fn statistics(state: &AppState, raw: &str) -> HandlerResult {
    let player_id = parse_path_id("playerId", raw)?;
    let stats = state
        .with_connection(move |conn| Ok(attendance(conn).statistics_for(player_id)?))
        .await?;
    Ok(json_response(StatusCode::OK, &stats))
}

fn pair_ids(player: &str, session: &str) -> Result<(PlayerId, SessionId), ValidationErrors> {
    match (
        parse_path_id("playerId", player),
        parse_path_id("sessionId", session),
    ) {
        (Ok(player_id), Ok(session_id)) => Ok((player_id, session_id)),
        (player_id, session_id) => {
            let mut errors = ValidationErrors::new();
            if let Err(err) = player_id {
                errors.extend(err);
            }
            if let Err(err) = session_id {
                errors.extend(err);
            }
            Err(errors)
        }
    }
}
