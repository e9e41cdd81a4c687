#![allow(dead_code)]

use clubgest_core::db::open_db_in_memory;
use clubgest_server::{dispatch, AppState};
use http_body_util::BodyExt;
use hyper::body::Bytes;
use hyper::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

pub fn state() -> AppState {
    AppState::new(
        open_db_in_memory().expect("in-memory db"),
        Duration::from_secs(5),
    )
}

pub async fn call(state: &AppState, method: Method, path: &str, body: &str) -> (StatusCode, Value) {
    let response = dispatch(state, &method, path, Bytes::from(body.to_owned())).await;
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("full body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

pub async fn get(state: &AppState, path: &str) -> (StatusCode, Value) {
    call(state, Method::GET, path, "").await
}

pub async fn post(state: &AppState, path: &str, body: Value) -> (StatusCode, Value) {
    call(state, Method::POST, path, &body.to_string()).await
}

pub async fn add_player(state: &AppState, name: &str, surname: &str) -> i64 {
    let (status, body) = post(state, "/players", json!({ "name": name, "surname": surname })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().expect("player id")
}

pub async fn add_session(state: &AppState, name: &str, starts_at: &str) -> i64 {
    let (status, body) = post(
        state,
        "/sessions",
        json!({ "name": name, "startsAt": starts_at, "kind": "tactical" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().expect("session id")
}

pub async fn record(state: &AppState, player_id: i64, session_id: i64, present: bool) -> (StatusCode, Value) {
    post(
        state,
        "/attendance",
        json!({ "playerId": player_id, "sessionId": session_id, "present": present }),
    )
    .await
}
