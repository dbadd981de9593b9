//! Domain and element records.
//!
//! # Responsibility
//! - Model the 4 life domains and their XP-accumulating elements.
//!
//! # Invariants
//! - `Domain::position` orders the fixed domain quadruple (0..=3).
//! - At most one element per domain has `is_focus = true`; the set-focus
//!   operation clears siblings before setting the target.
//! - Element XP is a running total and may go negative via penalties.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a domain.
pub type DomainId = Uuid;

/// Stable identifier for an element.
pub type ElementId = Uuid;

/// One of the 4 top-level life categories tracked per profile.
///
/// Domains are created once during initial setup and are immutable
/// afterwards as far as this engine is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Stable global ID.
    pub id: DomainId,
    /// Display name, unique across the profile.
    pub name: String,
    /// Slot in the fixed domain quadruple, 0..=3. Determines the order of
    /// the per-domain columns in the XP history log.
    pub position: usize,
}

impl Domain {
    /// Creates a domain with a generated stable ID.
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
        }
    }
}

/// A named sub-skill within a domain that accumulates XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Stable global ID.
    pub id: ElementId,
    /// Owning domain.
    pub domain_id: DomainId,
    /// Display name, unique within the domain.
    pub name: String,
    /// Whether this element currently receives the 10% focus bonus.
    pub is_focus: bool,
    /// Running XP total. Starts at 0; penalties may drive it negative.
    pub xp: i64,
}

impl Element {
    /// Creates an element with a generated stable ID and zero XP.
    pub fn new(domain_id: DomainId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain_id,
            name: name.into(),
            is_focus: false,
            xp: 0,
        }
    }
}
