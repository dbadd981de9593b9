//! Rank/level curve over aggregate XP.
//!
//! # Responsibility
//! - Map an XP total (profile-level or single-domain) onto the fixed
//!   9-tier rank ladder.
//!
//! # Invariants
//! - The curve is square-root shaped: early XP buys ranks quickly, later
//!   ranks cost disproportionately more.
//! - Output is monotonic non-decreasing in XP and clamped to levels 0..=8.

use serde::{Deserialize, Serialize};

/// XP value at which the ladder tops out (level 8, "Legend").
pub const XP_MAX: f64 = 109_500.0;

/// Highest reachable level index.
pub const MAX_LEVEL: usize = RANK_NAMES.len() - 1;

/// Rank names indexed by level.
pub const RANK_NAMES: [&str; 9] = [
    "Rookie",
    "Explorer",
    "Crafter",
    "Strategist",
    "Expert",
    "Architect",
    "Elite",
    "Master",
    "Legend",
];

/// Resolved position on the rank ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    /// Level index, 0..=8.
    pub level: usize,
    /// Progress within the current level, 0.0..=1.0. Exactly 1.0 at the
    /// max level.
    pub fraction: f64,
    /// Display name for `level`.
    pub name: &'static str,
}

/// Computes the rank for an XP total.
///
/// Negative XP (possible after penalties) is treated as 0.
pub fn compute_rank(xp: f64) -> Rank {
    let clamped = if xp.is_finite() && xp > 0.0 { xp } else { 0.0 };
    let level_float = (clamped / XP_MAX).sqrt() * MAX_LEVEL as f64;
    let level = (level_float.floor() as usize).min(MAX_LEVEL);
    let fraction = if level == MAX_LEVEL {
        1.0
    } else {
        level_float - level as f64
    };
    Rank {
        level,
        fraction,
        name: RANK_NAMES[level],
    }
}

/// XP interval `[floor, ceiling)` covered by a level.
///
/// The ceiling of the max level is capped at [`XP_MAX`].
pub fn rank_xp_window(level: usize) -> (f64, f64) {
    let level = level.min(MAX_LEVEL);
    let floor = (level as f64 / MAX_LEVEL as f64).powi(2) * XP_MAX;
    let ceiling = if level >= MAX_LEVEL {
        XP_MAX
    } else {
        ((level + 1) as f64 / MAX_LEVEL as f64).powi(2) * XP_MAX
    };
    (floor, ceiling)
}
