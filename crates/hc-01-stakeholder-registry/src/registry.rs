//! In-memory stakeholder registry.

use crate::domain::entities::{Stakeholder, StakeholderProfile, MAX_REPUTATION};
use crate::domain::errors::RegistryError;
use parking_lot::RwLock;
use shared_types::entities::{
    is_zero_address, short_address, Address, ProductId, StakeholderKind, Timestamp,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Thread-safe registry of stakeholders keyed by address.
///
/// `set_available(false)` makes every call fail with
/// [`RegistryError::Unavailable`], which lets callers exercise their
/// failure paths.
#[derive(Debug)]
pub struct InMemoryStakeholderRegistry {
    stakeholders: RwLock<HashMap<Address, Stakeholder>>,
    available: AtomicBool,
}

impl InMemoryStakeholderRegistry {
    pub fn new() -> Self {
        Self {
            stakeholders: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Register a new stakeholder. Starts unverified with the default
    /// reputation.
    pub fn register(
        &self,
        address: Address,
        kind: StakeholderKind,
        name: &str,
        location: &str,
        registered_at: Timestamp,
    ) -> Result<(), RegistryError> {
        self.ensure_available()?;

        if is_zero_address(&address) {
            return Err(RegistryError::InvalidRegistration("zero address".into()));
        }
        if kind == StakeholderKind::Unregistered {
            return Err(RegistryError::InvalidRegistration("kind required".into()));
        }
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidRegistration("name required".into()));
        }

        let mut stakeholders = self.stakeholders.write();
        if stakeholders.contains_key(&address) {
            return Err(RegistryError::AlreadyRegistered(address));
        }

        stakeholders.insert(
            address,
            Stakeholder::new(address, kind, name, location, registered_at),
        );
        info!(stakeholder = %short_address(&address), kind = %kind, "Stakeholder registered");
        Ok(())
    }

    /// Set the verification flag.
    pub fn verify(&self, address: &Address, verified: bool) -> Result<(), RegistryError> {
        self.update(address, |s| s.verified = verified)?;
        info!(stakeholder = %short_address(address), verified, "Verification changed");
        Ok(())
    }

    /// Overwrite the reputation score.
    pub fn set_reputation(&self, address: &Address, reputation: u8) -> Result<(), RegistryError> {
        if reputation > MAX_REPUTATION {
            return Err(RegistryError::InvalidReputation(reputation));
        }
        self.update(address, |s| s.reputation = reputation)?;
        debug!(stakeholder = %short_address(address), reputation, "Reputation updated");
        Ok(())
    }

    /// Full record, if registered.
    pub fn get(&self, address: &Address) -> Option<Stakeholder> {
        self.stakeholders.read().get(address).cloned()
    }

    /// Read model for the lifecycle engine. Unknown addresses resolve to the
    /// unregistered profile rather than an error.
    pub fn profile(&self, address: &Address) -> Result<StakeholderProfile, RegistryError> {
        self.ensure_available()?;
        Ok(self
            .stakeholders
            .read()
            .get(address)
            .map(Stakeholder::profile)
            .unwrap_or_else(StakeholderProfile::unregistered))
    }

    /// Append a product to a stakeholder's history.
    pub fn add_product(&self, address: &Address, product_id: ProductId) -> Result<(), RegistryError> {
        self.update(address, |s| s.products.push(product_id))
    }

    /// Products associated with a stakeholder, in the order they were added.
    pub fn products_of(&self, address: &Address) -> Vec<ProductId> {
        self.stakeholders
            .read()
            .get(address)
            .map(|s| s.products.clone())
            .unwrap_or_default()
    }

    /// Number of registered stakeholders.
    pub fn len(&self) -> usize {
        self.stakeholders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Toggle availability.
    pub fn set_available(&self, available: bool) {
        if !available {
            warn!("Stakeholder registry marked unavailable");
        }
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), RegistryError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RegistryError::Unavailable)
        }
    }

    fn update(
        &self,
        address: &Address,
        f: impl FnOnce(&mut Stakeholder),
    ) -> Result<(), RegistryError> {
        self.ensure_available()?;
        let mut stakeholders = self.stakeholders.write();
        let stakeholder = stakeholders
            .get_mut(address)
            .ok_or(RegistryError::NotRegistered(*address))?;
        f(stakeholder);
        Ok(())
    }
}

impl Default for InMemoryStakeholderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
