//! Domain model for the XP progression engine.
//!
//! # Responsibility
//! - Define the canonical records: profile, domains, elements, tasks, XP log.
//! - Keep calendar/due-date logic next to the data it describes.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Exactly [`DOMAIN_COUNT`] domains exist per profile after setup.
//! - XP base amounts live on [`task::TaskKind`], not in free strings.

pub mod domain;
pub mod history;
pub mod task;

/// Number of top-level domains per profile. The XP history log carries one
/// column per domain slot.
pub const DOMAIN_COUNT: usize = 4;
