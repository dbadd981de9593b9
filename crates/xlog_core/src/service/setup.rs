//! Initial profile setup.
//!
//! # Responsibility
//! - Create the singleton profile, its 4 domains with elements, and the
//!   optional `daily_login` task in one pass.
//!
//! # Invariants
//! - Exactly 4 domains per profile; the arity is enforced by the setup
//!   payload type, not re-validated later.
//! - Setup refuses to run twice against the same store.
//! - An unknown daily-login element name aborts before any write.
//! - All rows land through one store transaction; a failed setup leaves the
//!   store empty and a corrected retry can run.

use crate::model::domain::{Domain, Element};
use crate::model::history::Profile;
use crate::model::task::{Task, TaskKind, DAILY_LOGIN_TASK};
use crate::model::DOMAIN_COUNT;
use crate::repo::store::XpStore;
use crate::service::EngineError;
use chrono::NaiveDate;
use log::info;

/// One domain with its initial elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSetup {
    /// Domain name, unique across the profile.
    pub name: String,
    /// Element names, unique within the domain.
    pub elements: Vec<String>,
}

/// Full initial-setup payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSetup {
    /// User display name.
    pub user_name: String,
    /// The fixed domain quadruple, in position order.
    pub domains: [DomainSetup; DOMAIN_COUNT],
    /// When set, a `daily_login` Quick task (frequency 1, major = minor =
    /// this element) is created so the snapshot logger grants baseline XP
    /// each day. The name must appear among the elements above.
    pub daily_login_element: Option<String>,
}

/// One-shot setup service.
pub struct SetupService<S: XpStore> {
    store: S,
}

impl<S: XpStore> SetupService<S> {
    /// Creates a setup service over the provided store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Runs initial setup.
    ///
    /// # Errors
    /// - [`EngineError::AlreadyInitialized`] when a profile exists.
    /// - [`EngineError::ElementNameNotFound`] when `daily_login_element`
    ///   names an element not present in the payload; nothing is written.
    pub fn initialize_profile(
        &mut self,
        setup: &ProfileSetup,
        today: NaiveDate,
    ) -> Result<(), EngineError> {
        if self.store.get_profile()?.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let taxonomy: Vec<(Domain, Vec<Element>)> = setup
            .domains
            .iter()
            .enumerate()
            .map(|(position, domain_setup)| {
                let domain = Domain::new(domain_setup.name.clone(), position);
                let elements = domain_setup
                    .elements
                    .iter()
                    .map(|name| Element::new(domain.id, name.clone()))
                    .collect();
                (domain, elements)
            })
            .collect();

        let daily_login = match &setup.daily_login_element {
            Some(login_name) => {
                let element = taxonomy
                    .iter()
                    .flat_map(|(_, elements)| elements)
                    .find(|element| &element.name == login_name)
                    .ok_or_else(|| EngineError::ElementNameNotFound(login_name.clone()))?;
                Some(Task::new(
                    DAILY_LOGIN_TASK,
                    TaskKind::Quick,
                    1,
                    element.id,
                    element.id,
                ))
            }
            None => None,
        };

        let profile = Profile {
            user_name: setup.user_name.clone(),
            created_at: today,
        };
        self.store
            .initialize(&profile, &taxonomy, daily_login.as_ref())?;

        info!(
            "event=profile_setup module=setup status=ok user={} daily_login={}",
            setup.user_name,
            setup.daily_login_element.is_some()
        );
        Ok(())
    }
}
