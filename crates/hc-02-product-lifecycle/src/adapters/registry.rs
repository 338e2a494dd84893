//! Stakeholder directory adapter over the in-memory registry.

use crate::ports::outbound::StakeholderDirectory;
use async_trait::async_trait;
use hc_01_stakeholder_registry::{InMemoryStakeholderRegistry, RegistryError, StakeholderProfile};
use shared_types::entities::{Address, ProductId};
use std::sync::Arc;

/// Serves lookups and product callbacks from an [`InMemoryStakeholderRegistry`].
#[derive(Clone, Debug)]
pub struct RegistryDirectory {
    registry: Arc<InMemoryStakeholderRegistry>,
}

impl RegistryDirectory {
    pub fn new(registry: Arc<InMemoryStakeholderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<InMemoryStakeholderRegistry> {
        &self.registry
    }
}

#[async_trait]
impl StakeholderDirectory for RegistryDirectory {
    async fn profile(&self, address: &Address) -> Result<StakeholderProfile, RegistryError> {
        self.registry.profile(address)
    }

    async fn record_product(
        &self,
        address: &Address,
        product_id: ProductId,
    ) -> Result<(), RegistryError> {
        self.registry.add_product(address, product_id)
    }
}
