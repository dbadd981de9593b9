//! Daily snapshot logger.
//!
//! # Responsibility
//! - Once per calendar day: complete the `daily_login` task (when
//!   configured), run the penalty sweep, and append one immutable row of
//!   aggregate XP to the history log.
//!
//! # Invariants
//! - At most one history row per date; the final insert is
//!   conflict-ignoring, so a lost race still yields exactly one row.
//! - Profile XP is the geometric mean of the 4 domain sums with each sum
//!   clamped to >= 0 first; a non-positive domain therefore yields profile
//!   XP 0 and the persisted value is never NaN.
//! - Persisted per-domain sums are the raw, unclamped values.

use crate::model::history::XpHistoryEntry;
use crate::model::task::DAILY_LOGIN_TASK;
use crate::model::DOMAIN_COUNT;
use crate::repo::store::XpStore;
use crate::service::{penalty, progression, EngineError};
use chrono::NaiveDate;
use log::info;

/// Result of a snapshot attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    /// A new history row was appended.
    Logged(XpHistoryEntry),
    /// A row for the date already existed; nothing was written.
    AlreadyLogged,
}

/// Once-per-day aggregate XP logger.
pub struct SnapshotLogger<S: XpStore> {
    store: S,
}

impl<S: XpStore> SnapshotLogger<S> {
    /// Creates a logger over the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends today's history row unless one already exists.
    ///
    /// Driving the `daily_login` task and the penalty sweep only happens on
    /// the first call of the day; later calls return
    /// [`SnapshotOutcome::AlreadyLogged`] without side effects.
    pub fn log_today_if_needed(
        &mut self,
        today: NaiveDate,
    ) -> Result<SnapshotOutcome, EngineError> {
        if self.store.xp_history_exists(today)? {
            return Ok(SnapshotOutcome::AlreadyLogged);
        }

        if let Some(task) = self.store.get_task_by_name(DAILY_LOGIN_TASK)? {
            progression::complete_task_in(&mut self.store, task.id, today)?;
        }

        penalty::sweep_in(&mut self.store, today)?;

        let domain_xp = domain_xp_sums(&self.store)?;
        let entry = XpHistoryEntry {
            date: today,
            profile_xp: profile_xp_from(domain_xp),
            domain_xp,
        };

        if self.store.insert_xp_history(&entry)? {
            info!(
                "event=daily_snapshot module=snapshot status=ok date={} profile_xp={}",
                entry.date, entry.profile_xp
            );
            Ok(SnapshotOutcome::Logged(entry))
        } else {
            Ok(SnapshotOutcome::AlreadyLogged)
        }
    }
}

/// Current per-domain XP sums ordered by domain position. Domains without
/// elements (or a not-yet-set-up store) report 0.
pub fn domain_xp_sums<S: XpStore>(store: &S) -> Result<[f64; DOMAIN_COUNT], EngineError> {
    let mut sums = [0.0; DOMAIN_COUNT];
    for domain in store.list_domains()? {
        if domain.position < DOMAIN_COUNT {
            sums[domain.position] = store.sum_domain_xp(domain.id)?;
        }
    }
    Ok(sums)
}

/// Geometric mean of the domain sums, with the degenerate-aggregate policy
/// applied: sums are clamped to >= 0 before the product.
pub fn profile_xp_from(domain_xp: [f64; DOMAIN_COUNT]) -> f64 {
    let product: f64 = domain_xp.iter().map(|sum| sum.max(0.0)).product();
    product.powf(1.0 / DOMAIN_COUNT as f64)
}

#[cfg(test)]
mod tests {
    use super::profile_xp_from;

    #[test]
    fn balanced_domains_yield_their_common_value() {
        assert!((profile_xp_from([100.0; 4]) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_domain_collapses_profile_xp_to_zero() {
        assert_eq!(profile_xp_from([100.0, 200.0, 0.0, 50.0]), 0.0);
    }

    #[test]
    fn negative_domain_is_clamped_not_nan() {
        let xp = profile_xp_from([100.0, 200.0, -40.0, 50.0]);
        assert_eq!(xp, 0.0);
        assert!(xp.is_finite());
    }

    #[test]
    fn unbalanced_domains_pull_the_mean_down() {
        let balanced = profile_xp_from([100.0; 4]);
        let skewed = profile_xp_from([340.0, 20.0, 20.0, 20.0]);
        assert!(skewed < balanced);
    }
}
