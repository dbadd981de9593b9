//! Overdue penalty sweeper.
//!
//! # Responsibility
//! - Find active, overdue, unpenalized recurring tasks and deduct XP using
//!   the completion pipeline with the 0.6 overdue multiplier.
//!
//! # Invariants
//! - Each task is penalized at most once per calendar date; the guard is an
//!   atomic check-and-update on `last_penalty_date`.
//! - A penalty never touches `last_done` or `streak`; it is an XP
//!   adjustment, not a completion.
//! - One-time tasks (`frequency_days == 0`) are never selected.

use crate::model::task::TaskId;
use crate::repo::store::XpStore;
use crate::service::award::award_for;
use crate::service::EngineError;
use chrono::NaiveDate;
use log::info;

/// One applied penalty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyOutcome {
    /// Penalized task.
    pub task_id: TaskId,
    /// Task name, for caller-side reporting.
    pub task_name: String,
    /// Amount deducted from the major element (positive number).
    pub major_deducted: i64,
    /// Amount deducted from the minor element (positive number).
    pub minor_deducted: i64,
}

/// Batch sweeper, run at most once per calendar day by the snapshot logger
/// (re-running is a per-task no-op).
pub struct PenaltySweeper<S: XpStore> {
    store: S,
}

impl<S: XpStore> PenaltySweeper<S> {
    /// Creates a sweeper over the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Applies penalties for every eligible task; see module invariants.
    pub fn sweep_overdue_penalties(
        &mut self,
        today: NaiveDate,
    ) -> Result<Vec<PenaltyOutcome>, EngineError> {
        sweep_in(&mut self.store, today)
    }
}

/// Sweep routine shared with the daily snapshot logger.
pub(crate) fn sweep_in<S: XpStore>(
    store: &mut S,
    today: NaiveDate,
) -> Result<Vec<PenaltyOutcome>, EngineError> {
    let candidates = store.list_overdue_unpenalized(today)?;
    let mut applied = Vec::new();

    for task in candidates {
        let focus = store
            .get_element(task.major_element)?
            .map(|element| element.is_focus)
            .unwrap_or(false);
        // Current streak, not incremented: the sweep is not a completion.
        let amounts = award_for(task.kind, focus, task.streak, true);

        if store.apply_penalty(&task, -amounts.major, -amounts.minor, today)? {
            info!(
                "event=penalty_applied module=penalty status=ok task={} major_xp=-{} minor_xp=-{}",
                task.name, amounts.major, amounts.minor
            );
            applied.push(PenaltyOutcome {
                task_id: task.id,
                task_name: task.name,
                major_deducted: amounts.major,
                minor_deducted: amounts.minor,
            });
        }
    }

    Ok(applied)
}
