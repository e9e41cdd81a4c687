//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage contracts used by services.
//! - Keep SQL and the 0/1 boolean encoding inside this layer.
//!
//! # Invariants
//! - Repository writes on roster input run `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state (`InvalidData`) instead of
//!   masking it.

use crate::db::DbError;
use crate::model::validation::ValidationErrors;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attendance_repo;
pub mod player_repo;
pub mod session_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all club repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationErrors),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
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

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn count_to_u64(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` in {column}")))
}
