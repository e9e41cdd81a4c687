use clubgest_core::db::open_db;
use clubgest_server::{serve, AppState};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn send(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    response
}

#[tokio::test]
async fn serves_requests_over_tcp_and_shuts_down() {
    let dir = tempfile::tempdir().expect("tempdir");
    let conn = open_db(dir.path().join("club.sqlite3")).expect("open db");
    let state = AppState::new(conn, Duration::from_secs(5));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, state.clone(), async move {
        let _ = stopped.await;
    }));

    let body = r#"{"name":"Salma","surname":"Paralluelo"}"#;
    let created = send(
        addr,
        &format!(
            "POST /api/players HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ),
    )
    .await;
    assert!(created.starts_with("HTTP/1.1 201"), "{created}");
    assert!(created.contains("\"name\":\"Salma\""), "{created}");

    let status = send(
        addr,
        "GET /status HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(status.starts_with("HTTP/1.1 200"), "{status}");

    let _ = stop.send(());
    server
        .await
        .expect("server task")
        .expect("server exits cleanly");
    state.close().expect("connection closes after shutdown");
}
