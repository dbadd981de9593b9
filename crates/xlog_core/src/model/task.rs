//! Task record and award-table definitions.
//!
//! # Responsibility
//! - Model recurring/one-time tasks and their completion state machine.
//! - Attach the fixed XP base-award table to the task kind.
//!
//! # Invariants
//! - `frequency_days == 0` means one-time; such a task can never be overdue.
//! - `last_done` and `streak` change only through completion.
//! - `last_penalty_date` changes only through the overdue sweep.

use crate::model::domain::ElementId;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Name of the synthetic task the daily snapshot completes automatically.
pub const DAILY_LOGIN_TASK: &str = "daily_login";

/// Task weight class. Carries the fixed base-award table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Small habitual action.
    Quick,
    /// A focused work session.
    Session,
    /// A long, heavy effort.
    Grind,
}

impl TaskKind {
    /// Base XP granted to the major element, before bonuses.
    pub fn base_major(self) -> i64 {
        match self {
            Self::Quick => 10,
            Self::Session => 60,
            Self::Grind => 125,
        }
    }

    /// Base XP granted to the minor element, before bonuses.
    pub fn base_minor(self) -> i64 {
        match self {
            Self::Quick => 5,
            Self::Session => 30,
            Self::Grind => 75,
        }
    }
}

/// Validation failure for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task name is empty or whitespace-only.
    EmptyName,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// A user-defined recurring or one-time action that awards XP on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID.
    pub id: TaskId,
    /// Display name, unique across the profile.
    pub name: String,
    /// Weight class selecting the base-award row.
    pub kind: TaskKind,
    /// Recurrence interval in days; 0 means one-time.
    pub frequency_days: u32,
    /// Element receiving the major award share.
    pub major_element: ElementId,
    /// Element receiving the minor award share.
    pub minor_element: ElementId,
    /// Calendar date of the most recent completion.
    pub last_done: Option<NaiveDate>,
    /// Consecutive completion count. Only completion increments it; overdue
    /// detection never resets it.
    pub streak: u32,
    /// Paused tasks keep their history but are skipped by listings and the
    /// penalty sweep.
    pub active: bool,
    /// Date of the most recent overdue penalty. Guards against penalizing
    /// the same task twice within one calendar day.
    pub last_penalty_date: Option<NaiveDate>,
}

impl Task {
    /// Creates a task with a generated stable ID and fresh completion state.
    pub fn new(
        name: impl Into<String>,
        kind: TaskKind,
        frequency_days: u32,
        major_element: ElementId,
        minor_element: ElementId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            frequency_days,
            major_element,
            minor_element,
            last_done: None,
            streak: 0,
            active: true,
            last_penalty_date: None,
        }
    }

    /// Checks structural validity. Write paths call this before SQL.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        Ok(())
    }

    /// Next due date, when one exists. One-time and never-completed tasks
    /// have no due date.
    pub fn due_date(&self) -> Option<NaiveDate> {
        let last = self.last_done?;
        if self.frequency_days == 0 {
            return None;
        }
        last.checked_add_days(Days::new(u64::from(self.frequency_days)))
    }

    /// Whether `today` is strictly past the due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date() {
            Some(due) => today > due,
            None => false,
        }
    }

    /// Whether the task shows up in the "today" listing: never completed,
    /// or its due date has been reached.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        match (self.last_done, self.due_date()) {
            (None, _) => true,
            (Some(_), Some(due)) => today >= due,
            (Some(_), None) => false,
        }
    }
}
