//! Shared server state: the single SQLite connection and request limits.
//!
//! # Invariants
//! - The connection is only touched on blocking threads, never on async
//!   workers, and the mutex is never held across an await point.
//! - `close` is the only way the connection is torn down explicitly.

use crate::error::ApiError;
use clubgest_core::db::{close_db, DbError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub enum StateError {
    /// Another handle still references the connection.
    StillShared,
    Poisoned,
    Db(DbError),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StillShared => write!(f, "database connection is still in use"),
            Self::Poisoned => write!(f, "database connection mutex is poisoned"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StateError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

struct StateInner {
    conn: Mutex<Connection>,
    request_timeout: Duration,
}

/// Cheaply clonable handle shared by every connection task.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

impl AppState {
    pub fn new(conn: Connection, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(StateInner {
                conn: Mutex::new(conn),
                request_timeout,
            }),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    /// Runs `op` against the connection on the blocking thread pool.
    pub async fn with_connection<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let conn = inner
                .conn
                .lock()
                .map_err(|_| ApiError::Internal("database connection mutex is poisoned".into()))?;
            op(&conn)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
    }

    /// Waits up to `grace` for storage tasks that outlived their request
    /// (deadline exceeded) to release the connection, then closes it.
    pub async fn close_when_idle(self, grace: Duration) -> Result<(), StateError> {
        let deadline = tokio::time::Instant::now() + grace;
        while Arc::strong_count(&self.inner) > 1 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
        self.close()
    }

    /// Closes the connection once every other handle is gone.
    pub fn close(self) -> Result<(), StateError> {
        let inner = Arc::try_unwrap(self.inner).map_err(|_| StateError::StillShared)?;
        let conn = inner.conn.into_inner().map_err(|_| StateError::Poisoned)?;
        close_db(conn)?;
        Ok(())
    }
}
