//! Profile record and the append-only XP history log.
//!
//! # Invariants
//! - One `XpHistoryEntry` per calendar date, never updated after insertion.
//! - `domain_xp` columns follow `Domain::position` order.

use crate::model::DOMAIN_COUNT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Singleton profile record, created once at initial setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name chosen at setup.
    pub user_name: String,
    /// Calendar date the profile was created.
    pub created_at: NaiveDate,
}

/// One immutable daily row of the XP log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpHistoryEntry {
    /// Calendar date; unique key of the log.
    pub date: NaiveDate,
    /// Aggregate profile XP recorded for that date.
    pub profile_xp: f64,
    /// Raw per-domain XP sums, ordered by domain position.
    pub domain_xp: [f64; DOMAIN_COUNT],
}
