//! XP award pipeline.
//!
//! # Responsibility
//! - Compute the major/minor XP amounts for a task completion or an
//!   overdue penalty.
//!
//! # Invariants
//! - Multiplier order is fixed: base, focus, streak, overdue; each applied
//!   multiplicatively, with a single rounding at the end.
//! - The streak bonus never exceeds +20% regardless of streak size.
//! - Completion awards and overdue penalties share this exact pipeline; a
//!   penalty is the negation of the overdue-adjusted award.

use crate::model::task::TaskKind;
use serde::{Deserialize, Serialize};

/// Focus elements earn 10% extra.
pub const FOCUS_MULTIPLIER: f64 = 1.10;

/// Streak percentage cap.
pub const STREAK_CAP_PCT: u32 = 20;

/// Overdue completions and penalties keep 60% of the adjusted amount.
pub const OVERDUE_MULTIPLIER: f64 = 0.6;

/// Rounded XP amounts for the major and minor elements of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    /// Amount credited to the major element.
    pub major: i64,
    /// Amount credited to the minor element.
    pub minor: i64,
}

/// Runs the award pipeline for one task.
///
/// `overdue` covers both cases that attract the 0.6 multiplier: a late
/// completion and the daily penalty sweep.
pub fn award_for(kind: TaskKind, focus: bool, streak: u32, overdue: bool) -> XpAward {
    XpAward {
        major: scaled(kind.base_major(), focus, streak, overdue),
        minor: scaled(kind.base_minor(), focus, streak, overdue),
    }
}

fn scaled(base: i64, focus: bool, streak: u32, overdue: bool) -> i64 {
    let mut amount = base as f64;
    if focus {
        amount *= FOCUS_MULTIPLIER;
    }
    let pct = streak.min(STREAK_CAP_PCT);
    amount *= 1.0 + f64::from(pct) / 100.0;
    if overdue {
        amount *= OVERDUE_MULTIPLIER;
    }
    // f64::round is half-away-from-zero, matching the award rounding rule.
    amount.round() as i64
}
