//! HTTP/1 accept loop.
//!
//! # Invariants
//! - Each connection runs on its own task; a failing connection never stops
//!   the accept loop.
//! - Body collection and dispatch share one per-request deadline.
//! - After shutdown, in-flight connections get a bounded drain period before
//!   they are aborted.

use crate::error::ApiError;
use crate::handlers::dispatch;
use crate::state::AppState;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use log::{debug, info, warn};
use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

const MAX_BODY_BYTES: usize = 64 * 1024;
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(5);

/// Serves `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let local_addr = listener.local_addr()?;
    info!("event=server_listen module=http status=ok addr={local_addr}");

    tokio::pin!(shutdown);
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("event=http_accept module=http status=ok peer={peer}");
                    let state = state.clone();
                    connections.spawn(async move {
                        if let Err(err) = serve_connection(stream, state).await {
                            debug!("event=http_connection module=http status=error peer={peer} error={err}");
                        }
                    });
                }
                Err(err) => warn!("event=http_accept module=http status=error error={err}"),
            },
        }
    }

    info!(
        "event=server_shutdown module=http status=start in_flight={}",
        connections.len()
    );
    let drained = tokio::time::timeout(SHUTDOWN_DRAIN, async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!(
            "event=server_shutdown module=http status=error aborted={}",
            connections.len()
        );
        connections.abort_all();
        while connections.join_next().await.is_some() {}
    }
    info!("event=server_shutdown module=http status=ok");
    Ok(())
}

async fn serve_connection(stream: TcpStream, state: AppState) -> Result<(), hyper::Error> {
    let service = service_fn(move |request: Request<Incoming>| {
        let state = state.clone();
        async move { Ok::<_, Infallible>(handle(state, request).await) }
    });
    http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .await
}

async fn handle(state: AppState, request: Request<Incoming>) -> Response<Full<Bytes>> {
    let (parts, body) = request.into_parts();
    let deadline = state.request_timeout();
    let work = async {
        let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                return ApiError::PayloadTooLarge.into_response();
            }
            Err(err) => {
                return ApiError::invalid_field("body", format!("unreadable body: {err}"))
                    .into_response();
            }
        };
        dispatch(&state, &parts.method, parts.uri.path(), body).await
    };

    match tokio::time::timeout(deadline, work).await {
        Ok(response) => response,
        Err(_) => {
            warn!(
                "event=http_request module=http status=error method={} path={} error=deadline_exceeded timeout_ms={}",
                parts.method,
                parts.uri.path(),
                deadline.as_millis()
            );
            ApiError::Timeout.into_response()
        }
    }
}
