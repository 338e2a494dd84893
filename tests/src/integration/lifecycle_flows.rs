//! # Lifecycle Flows
//!
//! Farm-to-shelf scenarios across the stakeholder registry, the lifecycle
//! engine and the shared bus.
//!
//! ## Flow Tested
//!
//! ```text
//! Farmer ──create/advance──→ Engine ──record_product──→ Registry
//!                              │
//!                              └──events──→ Bus ──→ Audit subscriber
//! ```

#[cfg(test)]
mod tests {
    use super::super::*;
    use hc_02_product_lifecycle::{
        BatchQualityData, LifecycleError, ProductLifecycleApi, QualityData, TransferRequest,
    };
    use shared_bus::{EventFilter, EventTopic, SupplyChainEvent};
    use shared_types::entities::{Certification, Stage, StakeholderKind};

    async fn advance(d: &Deployment, caller: Address, id: u64, stage: Stage) {
        d.engine
            .update_product_stage(caller, id, stage, String::new(), String::new())
            .await
            .unwrap_or_else(|e| panic!("advance to {}: {}", stage, e));
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_farm_to_shelf() {
        let d = Deployment::with_supply_chain();
        let mut audit = d.bus.subscribe(EventFilter::for_products(vec![1]));

        let id = d.engine.create_product(FARMER, lettuce()).await.unwrap();
        assert_eq!(id, 1);

        d.clock.advance(2 * DAY);
        advance(&d, FARMER, id, Stage::Harvested).await;

        d.engine
            .record_quality_assessment(
                INSPECTOR,
                id,
                QualityData::new("A", 91).with_parameter("freshness", 95),
            )
            .await
            .unwrap();

        d.engine
            .transfer_product(
                FARMER,
                TransferRequest::new(id, DISTRIBUTOR, 60, Stage::ShippedToDistributor)
                    .with_reference("INV-2024-001"),
            )
            .await
            .unwrap();
        advance(&d, DISTRIBUTOR, id, Stage::ReceivedByDistributor).await;
        advance(&d, DISTRIBUTOR, id, Stage::ShippedToRetailer).await;

        d.engine
            .transfer_product(
                DISTRIBUTOR,
                TransferRequest::new(id, RETAILER, 90, Stage::ReceivedByRetailer)
                    .with_reference("INV-2024-002"),
            )
            .await
            .unwrap();
        advance(&d, RETAILER, id, Stage::AvailableForSale).await;
        advance(&d, RETAILER, id, Stage::SoldOut).await;

        let product = d.engine.get_product(id).await.unwrap();
        assert_eq!(product.stage, Stage::SoldOut);
        assert_eq!(product.farmer, FARMER);
        assert_eq!(product.current_owner, RETAILER);
        assert_eq!(product.harvest_date, Some(GENESIS + 2 * DAY));
        assert_eq!(product.farm_location, "Salinas Valley");
        assert_eq!(product.price.farm_gate_price, 50);
        assert_eq!(product.price.distributor_price, 60);
        assert_eq!(product.price.retailer_price, 90);
        assert_eq!(product.latest_quality_score(), Some(91));

        let txs = d.engine.get_transactions(id).await.unwrap();
        assert_eq!(txs.len(), 8);
        assert!(txs.windows(2).all(|w| w[0].stage <= w[1].stage));
        assert!(txs.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        // Every custodian was told about the product.
        for party in [FARMER, DISTRIBUTOR, RETAILER] {
            assert_eq!(d.registry.products_of(&party), vec![id]);
        }
        assert!(d.registry.products_of(&INSPECTOR).is_empty());

        let events = audit.drain();
        assert_eq!(events.len(), 9);
        assert!(matches!(events[0], SupplyChainEvent::ProductCreated { .. }));
        assert!(matches!(
            events[8],
            SupplyChainEvent::StageUpdated { new_stage: Stage::SoldOut, .. }
        ));
        let transfers: Vec<_> = events
            .iter()
            .filter(|e| e.topic() == EventTopic::Custody)
            .collect();
        assert_eq!(transfers.len(), 2);
    }

    #[tokio::test]
    async fn test_indexes_follow_custody() {
        let d = Deployment::with_supply_chain();
        let a = d.engine.create_product(FARMER, lettuce()).await.unwrap();
        let b = d.engine.create_product(FARMER, lettuce()).await.unwrap();

        d.engine
            .transfer_product(
                FARMER,
                TransferRequest::new(a, DISTRIBUTOR, 55, Stage::ShippedToDistributor),
            )
            .await
            .unwrap();

        assert_eq!(d.engine.list_by_owner(FARMER).await, vec![b]);
        assert_eq!(d.engine.list_by_owner(DISTRIBUTOR).await, vec![a]);
        assert_eq!(d.engine.list_by_category("Leafy Greens").await, vec![a, b]);
        assert_eq!(
            d.engine.list_by_stage(Stage::ShippedToDistributor).await,
            vec![a]
        );
        assert_eq!(d.engine.list_by_stage(Stage::Planted).await, vec![b]);

        let batch_number = d.engine.get_product(b).await.unwrap().batch_number;
        assert_eq!(d.engine.find_by_batch_number(&batch_number).await, Some(b));
        assert_eq!(d.engine.find_by_batch_number("BATCH-missing").await, None);
    }

    // =========================================================================
    // REGISTRY INTERPLAY
    // =========================================================================

    #[tokio::test]
    async fn test_registry_state_gates_operations() {
        let d = Deployment::new();
        d.registry
            .register(FARMER, StakeholderKind::Farmer, "Green Acres", "Fresno", GENESIS)
            .unwrap();

        // Registered but not yet verified.
        assert_eq!(
            d.engine.create_product(FARMER, lettuce()).await,
            Err(LifecycleError::StakeholderNotVerified(FARMER))
        );

        d.registry.verify(&FARMER, true).unwrap();
        let id = d.engine.create_product(FARMER, lettuce()).await.unwrap();

        // Unknown address resolves to an unregistered profile.
        assert!(matches!(
            d.engine
                .transfer_product(
                    FARMER,
                    TransferRequest::new(id, DISTRIBUTOR, 60, Stage::ShippedToDistributor),
                )
                .await,
            Err(LifecycleError::InsufficientReputation { stakeholder: DISTRIBUTOR, reputation: 0, .. })
        ));

        // A fresh registration sits exactly at the default transfer threshold.
        d.onboard(DISTRIBUTOR, StakeholderKind::Distributor, 50);
        d.engine
            .transfer_product(
                FARMER,
                TransferRequest::new(id, DISTRIBUTOR, 60, Stage::ShippedToDistributor),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_inspector_needs_verification_reputation() {
        let d = Deployment::with_supply_chain();
        let id = d.engine.create_product(FARMER, lettuce()).await.unwrap();
        d.registry.set_reputation(&INSPECTOR, 69).unwrap();

        assert_eq!(
            d.engine
                .record_quality_assessment(INSPECTOR, id, QualityData::new("A", 90))
                .await,
            Err(LifecycleError::StakeholderNotVerified(INSPECTOR))
        );

        d.registry.set_reputation(&INSPECTOR, 70).unwrap();
        d.engine
            .record_quality_assessment(INSPECTOR, id, QualityData::new("A", 90))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_registry_outage_aborts_without_side_effects() {
        let d = Deployment::with_supply_chain();
        let id = d.engine.create_product(FARMER, lettuce()).await.unwrap();
        let before = d.engine.get_product(id).await.unwrap();

        d.registry.set_available(false);
        assert!(matches!(
            d.engine
                .transfer_product(
                    FARMER,
                    TransferRequest::new(id, DISTRIBUTOR, 60, Stage::ShippedToDistributor)
                        .with_reference("INV-9"),
                )
                .await,
            Err(LifecycleError::Registry(_))
        ));
        d.registry.set_available(true);

        assert_eq!(d.engine.get_product(id).await.unwrap(), before);
        assert_eq!(d.engine.get_transactions(id).await.unwrap().len(), 1);

        // The reference was never claimed.
        d.engine
            .transfer_product(
                FARMER,
                TransferRequest::new(id, DISTRIBUTOR, 60, Stage::ShippedToDistributor)
                    .with_reference("INV-9"),
            )
            .await
            .unwrap();
    }

    // =========================================================================
    // BATCHES AND ADMINISTRATION
    // =========================================================================

    #[tokio::test]
    async fn test_batch_quality_with_blocked_products() {
        let d = Deployment::with_supply_chain();
        let mut quality = d.bus.subscribe(EventFilter::topics(vec![EventTopic::Quality]));
        for _ in 0..10 {
            d.engine.create_product(FARMER, lettuce()).await.unwrap();
        }
        d.engine.block_product(ADMIN, 4).await.unwrap();
        d.engine.block_product(ADMIN, 9).await.unwrap();

        let report = d
            .engine
            .batch_record_quality(
                INSPECTOR,
                BatchQualityData {
                    product_ids: (1..=10).collect(),
                    assessments: (0..10).map(|i| QualityData::new("B", 60 + i)).collect(),
                },
            )
            .await
            .unwrap();

        assert_eq!(report.applied_count(), 8);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(quality.drain().len(), 8);
        assert!(d.engine.get_quality_history(4).await.unwrap().is_empty());
        assert_eq!(
            d.engine.get_quality_history(10).await.unwrap()[0].score,
            69
        );
    }

    #[tokio::test]
    async fn test_pause_and_block_flow() {
        let d = Deployment::with_supply_chain();
        let mut admin_events = d
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Administration]));
        let id = d.engine.create_product(FARMER, lettuce()).await.unwrap();

        d.engine.set_paused(ADMIN, true).await.unwrap();
        assert_eq!(
            d.engine
                .add_certification(FARMER, id, Certification::Organic)
                .await,
            Err(LifecycleError::SystemPaused)
        );
        d.engine.set_paused(ADMIN, false).await.unwrap();

        d.engine.block_user(ADMIN, DISTRIBUTOR).await.unwrap();
        assert_eq!(
            d.engine
                .transfer_product(
                    FARMER,
                    TransferRequest::new(id, DISTRIBUTOR, 60, Stage::ShippedToDistributor),
                )
                .await,
            Err(LifecycleError::UserBlocked(DISTRIBUTOR))
        );
        d.engine.unblock_user(ADMIN, DISTRIBUTOR).await.unwrap();

        assert_eq!(admin_events.drain().len(), 4);
        assert_eq!(
            d.engine.block_user(FARMER, DISTRIBUTOR).await,
            Err(LifecycleError::NotAdmin)
        );
    }

    #[tokio::test]
    async fn test_statistics_after_season() {
        let d = Deployment::with_supply_chain();
        for _ in 0..4 {
            d.engine.create_product(FARMER, lettuce()).await.unwrap();
        }
        d.engine
            .add_certification(FARMER, 1, Certification::Organic)
            .await
            .unwrap();
        d.engine
            .record_quality_assessment(INSPECTOR, 1, QualityData::new("A", 90))
            .await
            .unwrap();
        d.engine
            .record_quality_assessment(INSPECTOR, 2, QualityData::new("C", 40))
            .await
            .unwrap();
        d.engine.deactivate_product(FARMER, 4).await.unwrap();

        let stats = d.engine.get_system_statistics().await;
        assert_eq!(stats.total_products, 4);
        assert_eq!(stats.active_products, 3);
        assert_eq!(stats.total_transactions, 4);
        assert_eq!(stats.average_quality_score, 65);
        assert_eq!(stats.total_carbon_footprint, 32);

        let green = d.engine.get_sustainability_metrics().await;
        assert_eq!(green.organic_certified_products, 1);
        assert_eq!(green.organic_farmers, 1);
        assert_eq!(green.average_carbon_per_product, 8);
    }

    #[tokio::test]
    async fn test_metrics_exposition_includes_engine_counters() {
        let d = Deployment::with_supply_chain();
        d.engine.create_product(FARMER, lettuce()).await.unwrap();

        let handle = hc_telemetry::register_metrics().unwrap();
        let text = handle.encode().unwrap();
        assert!(text.contains("hc_products_created_total"));
    }
}
