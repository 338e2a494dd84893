//! Property tests over random stage walks, reputations and batch shapes.

#[cfg(test)]
mod tests {
    use super::super::*;
    use hc_02_product_lifecycle::algorithms::role_window;
    use hc_02_product_lifecycle::{BatchQualityData, LifecycleError, ProductLifecycleApi, QualityData, TransferRequest};
    use proptest::prelude::*;
    use shared_types::entities::{Stage, StakeholderKind};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn stage_strategy() -> impl Strategy<Value = Stage> {
        (0usize..Stage::ALL.len()).prop_map(|i| Stage::ALL[i])
    }

    proptest! {
        /// Random stage requests from the farmer never move a product
        /// backwards, and the only stage a farmer reaches is Harvested.
        #[test]
        fn prop_farmer_stage_walk_is_monotonic(walk in prop::collection::vec(stage_strategy(), 1..24)) {
            let rt = runtime();
            rt.block_on(async {
                let d = Deployment::with_supply_chain();
                let id = d.engine.create_product(FARMER, lettuce()).await.unwrap();
                let window = role_window(StakeholderKind::Farmer).unwrap();
                let mut current = Stage::Planted;

                for requested in walk {
                    let result = d
                        .engine
                        .update_product_stage(FARMER, id, requested, String::new(), String::new())
                        .await;
                    let expected_ok = requested > current && window.contains(&requested);
                    assert_eq!(result.is_ok(), expected_ok, "{} -> {}", current, requested);
                    if expected_ok {
                        current = requested;
                    }
                    assert_eq!(d.engine.get_product(id).await.unwrap().stage, current);
                }
                assert!(matches!(current, Stage::Planted | Stage::Harvested));
            });
        }

        /// A transfer clears the reputation gate only when both parties are
        /// verified and at or above the threshold.
        #[test]
        fn prop_transfer_reputation_gate(
            sender_rep in 0u8..=100,
            sender_verified in any::<bool>(),
            recipient_rep in 0u8..=100,
            recipient_verified in any::<bool>(),
        ) {
            let rt = runtime();
            rt.block_on(async {
                let d = Deployment::with_supply_chain();
                let id = d.engine.create_product(FARMER, lettuce()).await.unwrap();
                d.registry.set_reputation(&FARMER, sender_rep).unwrap();
                d.registry.verify(&FARMER, sender_verified).unwrap();
                d.registry.set_reputation(&DISTRIBUTOR, recipient_rep).unwrap();
                d.registry.verify(&DISTRIBUTOR, recipient_verified).unwrap();

                let result = d
                    .engine
                    .transfer_product(
                        FARMER,
                        TransferRequest::new(id, DISTRIBUTOR, 60, Stage::ShippedToDistributor),
                    )
                    .await;

                let sender_ok = sender_verified && sender_rep >= 50;
                let recipient_ok = recipient_verified && recipient_rep >= 50;
                match result {
                    Ok(()) => assert!(sender_ok && recipient_ok),
                    Err(LifecycleError::InsufficientReputation { stakeholder, .. }) => {
                        // The sender is checked first.
                        let expected = if sender_ok { DISTRIBUTOR } else { FARMER };
                        assert_eq!(stakeholder, expected);
                    }
                    Err(other) => panic!("unexpected error: {}", other),
                }

                let owner = d.engine.get_product(id).await.unwrap().current_owner;
                assert_eq!(owner == DISTRIBUTOR, sender_ok && recipient_ok);
            });
        }

        /// Every item of a batch is either applied or skipped, and only the
        /// blocked products are skipped.
        #[test]
        fn prop_batch_partitions_items(blocked in prop::collection::btree_set(1u64..=10, 0..10)) {
            let rt = runtime();
            rt.block_on(async {
                let d = Deployment::with_supply_chain();
                for _ in 0..10 {
                    d.engine.create_product(FARMER, lettuce()).await.unwrap();
                }
                for id in &blocked {
                    d.engine.block_product(ADMIN, *id).await.unwrap();
                }

                let report = d
                    .engine
                    .batch_record_quality(
                        INSPECTOR,
                        BatchQualityData {
                            product_ids: (1..=10).collect(),
                            assessments: vec![QualityData::new("B", 75); 10],
                        },
                    )
                    .await
                    .unwrap();

                assert_eq!(report.applied_count() + report.skipped_count(), 10);
                let skipped: Vec<u64> = report.skipped.iter().map(|(id, _)| *id).collect();
                assert_eq!(skipped, blocked.iter().copied().collect::<Vec<_>>());
                for id in 1..=10u64 {
                    let recorded = !d.engine.get_quality_history(id).await.unwrap().is_empty();
                    assert_eq!(recorded, !blocked.contains(&id));
                }
            });
        }
    }
}
