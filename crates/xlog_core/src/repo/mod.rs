//! Persistence gateway contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow read/write contract the engine consumes.
//! - Isolate SQL details from service/business orchestration.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Multi-row mutations (award, penalty, focus change) are transactional;
//!   partial application is never observable.

pub mod store;

use crate::db::DbError;
use crate::model::domain::ElementId;
use crate::model::task::{TaskId, TaskValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Gateway error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed validation before a write.
    Validation(TaskValidationError),
    /// Transport or migration failure.
    Db(DbError),
    /// Task id did not resolve.
    TaskNotFound(TaskId),
    /// Element id did not resolve.
    ElementNotFound(ElementId),
    /// Persisted row violates the model (corrupt date, unknown kind, ...).
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::TaskNotFound(_) | Self::ElementNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
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
