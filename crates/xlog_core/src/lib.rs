//! XP & progression engine for xLog.
//! This crate is the single source of truth for award math, due-date/streak
//! state and the once-daily aggregate snapshot.

pub mod db;
pub mod logging;
pub mod model;
pub mod rank;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::domain::{Domain, DomainId, Element, ElementId};
pub use model::history::{Profile, XpHistoryEntry};
pub use model::task::{Task, TaskId, TaskKind, TaskValidationError, DAILY_LOGIN_TASK};
pub use model::DOMAIN_COUNT;
pub use rank::{compute_rank, rank_xp_window, Rank, MAX_LEVEL, RANK_NAMES, XP_MAX};
pub use repo::store::{SqliteXpStore, XpStore};
pub use repo::{RepoError, RepoResult};
pub use service::award::{award_for, XpAward};
pub use service::penalty::{PenaltyOutcome, PenaltySweeper};
pub use service::progression::{CompletionOutcome, ProgressionService};
pub use service::setup::{DomainSetup, ProfileSetup, SetupService};
pub use service::snapshot::{domain_xp_sums, profile_xp_from, SnapshotLogger, SnapshotOutcome};
pub use service::tasks::{TaskDraft, TaskService};
pub use service::EngineError;

/// Returns the engine crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
