//! Task administration: create, edit, delete, pause/resume, listings.
//!
//! # Responsibility
//! - Validate element references before any task write.
//! - Expose the "due today" view and the XP history log to callers.
//!
//! # Invariants
//! - A task draft referencing a missing element aborts before any write.
//! - Editing never touches completion/penalty state (`last_done`, `streak`,
//!   `last_penalty_date`, `active`).

use crate::model::domain::ElementId;
use crate::model::history::XpHistoryEntry;
use crate::model::task::{Task, TaskId, TaskKind};
use crate::repo::store::XpStore;
use crate::service::EngineError;
use chrono::NaiveDate;

/// User-editable task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task name, unique across the profile.
    pub name: String,
    /// Weight class.
    pub kind: TaskKind,
    /// Recurrence interval in days; 0 means one-time.
    pub frequency_days: u32,
    /// Element receiving the major award share.
    pub major_element: ElementId,
    /// Element receiving the minor award share.
    pub minor_element: ElementId,
}

/// Task administration service.
pub struct TaskService<S: XpStore> {
    store: S,
}

impl<S: XpStore> TaskService<S> {
    /// Creates a service over the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a task from a draft after validating its element references.
    pub fn create_task(&mut self, draft: &TaskDraft) -> Result<Task, EngineError> {
        self.check_references(draft)?;
        let task = Task::new(
            draft.name.clone(),
            draft.kind,
            draft.frequency_days,
            draft.major_element,
            draft.minor_element,
        );
        self.store.create_task(&task)?;
        Ok(task)
    }

    /// Replaces the definition fields of an existing task.
    pub fn edit_task(&mut self, id: TaskId, draft: &TaskDraft) -> Result<Task, EngineError> {
        let current = self
            .store
            .get_task(id)?
            .ok_or(EngineError::TaskNotFound(id))?;
        self.check_references(draft)?;

        let updated = Task {
            name: draft.name.clone(),
            kind: draft.kind,
            frequency_days: draft.frequency_days,
            major_element: draft.major_element,
            minor_element: draft.minor_element,
            ..current
        };
        self.store.update_task_definition(&updated)?;
        Ok(updated)
    }

    /// Deletes a task and its completion state.
    pub fn delete_task(&mut self, id: TaskId) -> Result<(), EngineError> {
        self.store.delete_task(id)?;
        Ok(())
    }

    /// Pauses or resumes a task without losing its history.
    pub fn set_task_active(&mut self, id: TaskId, active: bool) -> Result<(), EngineError> {
        self.store.set_task_active(id, active)?;
        Ok(())
    }

    /// Active tasks that are due on `today`.
    pub fn list_due_tasks(&self, today: NaiveDate) -> Result<Vec<Task>, EngineError> {
        Ok(self.store.list_due_tasks(today)?)
    }

    /// Full XP history, ascending by date.
    pub fn history(&self) -> Result<Vec<XpHistoryEntry>, EngineError> {
        Ok(self.store.list_xp_history()?)
    }

    fn check_references(&self, draft: &TaskDraft) -> Result<(), EngineError> {
        for element_id in [draft.major_element, draft.minor_element] {
            if self.store.get_element(element_id)?.is_none() {
                return Err(EngineError::InvalidReference(element_id));
            }
        }
        Ok(())
    }
}
