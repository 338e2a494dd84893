//! Cross-crate integration tests.
//!
//! Every test wires the lifecycle engine to a real
//! `InMemoryStakeholderRegistry` and `InMemoryEventBus`; only the clock is
//! manual.

pub mod lifecycle_flows;
pub mod properties;

use hc_01_stakeholder_registry::InMemoryStakeholderRegistry;
use hc_02_product_lifecycle::{
    BusEventSink, FarmingPractices, LifecycleConfig, ManualTimeSource, ProductCreationData,
    ProductLifecycleService, RegistryDirectory,
};
use shared_bus::InMemoryEventBus;
use shared_types::entities::{Address, StakeholderKind, Timestamp};
use std::sync::Arc;

pub const ADMIN: Address = [0xAD; 20];
pub const FARMER: Address = [0x11; 20];
pub const DISTRIBUTOR: Address = [0x22; 20];
pub const RETAILER: Address = [0x33; 20];
pub const INSPECTOR: Address = [0x44; 20];
pub const GENESIS: Timestamp = 1_700_000_000;
pub const DAY: u64 = 86_400;

pub type Engine = ProductLifecycleService<RegistryDirectory, BusEventSink, ManualTimeSource>;

/// A fully wired engine plus handles on its collaborators.
pub struct Deployment {
    pub engine: Arc<Engine>,
    pub registry: Arc<InMemoryStakeholderRegistry>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<ManualTimeSource>,
}

impl Deployment {
    pub fn new() -> Self {
        Self::with_config(LifecycleConfig::default())
    }

    pub fn with_config(config: LifecycleConfig) -> Self {
        let registry = Arc::new(InMemoryStakeholderRegistry::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(ManualTimeSource::new(GENESIS));
        let engine = ProductLifecycleService::new(
            Arc::new(RegistryDirectory::new(registry.clone())),
            Arc::new(BusEventSink::new(bus.clone())),
            clock.clone(),
            ADMIN,
            config,
        )
        .expect("default config is valid");
        Self {
            engine: Arc::new(engine),
            registry,
            bus,
            clock,
        }
    }

    /// Register, verify and rate a stakeholder.
    pub fn onboard(&self, address: Address, kind: StakeholderKind, reputation: u8) {
        self.registry
            .register(address, kind, &format!("{}", kind), "Salinas Valley", GENESIS)
            .expect("register");
        self.registry.verify(&address, true).expect("verify");
        self.registry
            .set_reputation(&address, reputation)
            .expect("reputation");
    }

    /// The four standard parties, all verified and above every threshold.
    pub fn with_supply_chain() -> Self {
        let deployment = Self::new();
        deployment.onboard(FARMER, StakeholderKind::Farmer, 80);
        deployment.onboard(DISTRIBUTOR, StakeholderKind::Distributor, 75);
        deployment.onboard(RETAILER, StakeholderKind::Retailer, 90);
        deployment.onboard(INSPECTOR, StakeholderKind::Inspector, 85);
        deployment
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}

pub fn lettuce() -> ProductCreationData {
    ProductCreationData {
        name: "Lettuce".into(),
        variety: "Romaine".into(),
        category: "Leafy Greens".into(),
        unit: "kg".into(),
        quantity: 1000,
        planted_date: GENESIS - 60 * DAY,
        harvest_date: None,
        expiry_date: GENESIS + 14 * DAY,
        farm_gate_price: 50,
        recommended_retail_price: 150,
        currency: String::new(),
        practices: FarmingPractices {
            is_organic: true,
            pesticide_free: true,
            irrigation_method: "drip".into(),
            water_source: "well".into(),
            ..Default::default()
        },
        certifications: vec![],
        carbon_footprint: 8,
        location_ref: String::new(),
    }
}
