//! Progression engine: task completion awards and focus assignment.
//!
//! # Responsibility
//! - Turn one task completion into XP credits on its major/minor elements
//!   and advance the task's streak/due-date state.
//! - Own the set-focus mutation (one focus element per domain).
//!
//! # Invariants
//! - The four writes of a completion (two element totals, `last_done`,
//!   `streak`) land in one transaction or not at all.
//! - No same-day dedupe: completing twice double-awards. Avoiding duplicate
//!   invocation for one real-world event is the caller's duty.

use crate::model::domain::ElementId;
use crate::model::task::TaskId;
use crate::repo::store::XpStore;
use crate::service::award::{award_for, XpAward};
use crate::service::EngineError;
use chrono::NaiveDate;
use log::info;

/// Result of one completion award.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Completed task.
    pub task_id: TaskId,
    /// Task name, for caller-side reporting.
    pub task_name: String,
    /// Amounts credited to the major/minor elements.
    pub award: XpAward,
    /// Streak value after the completion.
    pub new_streak: u32,
    /// Whether the completion was late and attracted the 0.6 multiplier.
    pub was_overdue: bool,
}

/// Task completion and focus-assignment service.
pub struct ProgressionService<S: XpStore> {
    store: S,
}

impl<S: XpStore> ProgressionService<S> {
    /// Creates a service over the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Completes one task by id, awarding XP and advancing its state.
    ///
    /// # Errors
    /// - [`EngineError::TaskNotFound`] when the id does not resolve; no
    ///   mutation occurs.
    pub fn complete_task(
        &mut self,
        task_id: TaskId,
        today: NaiveDate,
    ) -> Result<CompletionOutcome, EngineError> {
        complete_task_in(&mut self.store, task_id, today)
    }

    /// Completes one task by its unique name.
    pub fn complete_task_by_name(
        &mut self,
        name: &str,
        today: NaiveDate,
    ) -> Result<CompletionOutcome, EngineError> {
        let task = self
            .store
            .get_task_by_name(name)?
            .ok_or_else(|| EngineError::TaskNameNotFound(name.to_string()))?;
        complete_task_in(&mut self.store, task.id, today)
    }

    /// Makes `element_id` the focus element of its domain, clearing the
    /// flag on every sibling first.
    pub fn set_focus(&mut self, element_id: ElementId) -> Result<(), EngineError> {
        let element = self
            .store
            .get_element(element_id)?
            .ok_or(EngineError::ElementNotFound(element_id))?;
        self.store.set_focus_element(element.domain_id, element_id)?;
        info!(
            "event=focus_set module=progression status=ok element={} domain={}",
            element_id, element.domain_id
        );
        Ok(())
    }
}

/// Completion routine shared with the daily snapshot logger, which drives
/// the `daily_login` task through the same award path.
pub(crate) fn complete_task_in<S: XpStore>(
    store: &mut S,
    task_id: TaskId,
    today: NaiveDate,
) -> Result<CompletionOutcome, EngineError> {
    let task = store
        .get_task(task_id)?
        .ok_or(EngineError::TaskNotFound(task_id))?;

    let focus = store
        .get_element(task.major_element)?
        .map(|element| element.is_focus)
        .unwrap_or(false);
    let was_overdue = task.is_overdue(today);
    let award = award_for(task.kind, focus, task.streak, was_overdue);

    store.apply_completion(&task, award.major, award.minor, today)?;

    info!(
        "event=task_complete module=progression status=ok task={} major_xp={} minor_xp={} streak={} overdue={}",
        task.name,
        award.major,
        award.minor,
        task.streak + 1,
        was_overdue
    );

    Ok(CompletionOutcome {
        task_id,
        task_name: task.name,
        award,
        new_streak: task.streak + 1,
        was_overdue,
    })
}
