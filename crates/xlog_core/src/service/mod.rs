//! Engine use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway calls into the progression, penalty-sweep and
//!   daily-snapshot operations.
//! - Keep callers (CLI/GUI layers) decoupled from storage details.
//!
//! # Invariants
//! - No service panics on recoverable conditions; missing ids surface as
//!   [`EngineError`] values and leave state unchanged.

pub mod award;
pub mod penalty;
pub mod progression;
pub mod setup;
pub mod snapshot;
pub mod tasks;

use crate::model::domain::ElementId;
use crate::model::task::TaskId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service-level error for engine operations.
#[derive(Debug)]
pub enum EngineError {
    /// Task id did not resolve. Recoverable; no mutation occurred.
    TaskNotFound(TaskId),
    /// Task name did not resolve.
    TaskNameNotFound(String),
    /// Element id did not resolve.
    ElementNotFound(ElementId),
    /// Element name did not resolve.
    ElementNameNotFound(String),
    /// A task draft references an element that does not exist. The
    /// operation aborted before any write.
    InvalidReference(ElementId),
    /// Initial setup was attempted on an already-initialized store.
    AlreadyInitialized,
    /// Persistence-layer failure.
    Store(RepoError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::TaskNameNotFound(name) => write!(f, "task not found: `{name}`"),
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::ElementNameNotFound(name) => write!(f, "element not found: `{name}`"),
            Self::InvalidReference(id) => {
                write!(f, "task references missing element: {id}")
            }
            Self::AlreadyInitialized => write!(f, "profile is already initialized"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            RepoError::ElementNotFound(id) => Self::ElementNotFound(id),
            other => Self::Store(other),
        }
    }
}
