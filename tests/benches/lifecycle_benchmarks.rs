//! # Harvest-Chain Lifecycle Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Stage validation | Role window lookup per transition |
//! | Batch numbers | SHA-256 derivation |
//! | Engine | Create, advance and transfer through the full stack |
//! | Analytics | Statistics scan over a populated ledger |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hc_01_stakeholder_registry::InMemoryStakeholderRegistry;
use hc_02_product_lifecycle::algorithms::{derive_batch_number, validate_stage_update};
use hc_02_product_lifecycle::{
    LifecycleConfig, NoOpEventSink, ProductCreationData, ProductLifecycleApi,
    ProductLifecycleService, RegistryDirectory, SystemTimeSource, TransferRequest,
};
use shared_types::entities::{Address, Stage, StakeholderKind};
use std::sync::Arc;

const ADMIN: Address = [0xAD; 20];
const FARMER: Address = [0x11; 20];
const DISTRIBUTOR: Address = [0x22; 20];

type BenchEngine = ProductLifecycleService<RegistryDirectory, NoOpEventSink, SystemTimeSource>;

fn engine() -> BenchEngine {
    let registry = Arc::new(InMemoryStakeholderRegistry::new());
    for (address, kind) in [
        (FARMER, StakeholderKind::Farmer),
        (DISTRIBUTOR, StakeholderKind::Distributor),
    ] {
        registry.register(address, kind, "bench", "bench", 0).unwrap();
        registry.verify(&address, true).unwrap();
        registry.set_reputation(&address, 90).unwrap();
    }
    ProductLifecycleService::new(
        Arc::new(RegistryDirectory::new(registry)),
        Arc::new(NoOpEventSink),
        Arc::new(SystemTimeSource),
        ADMIN,
        LifecycleConfig::default(),
    )
    .unwrap()
}

fn product() -> ProductCreationData {
    ProductCreationData {
        name: "Wheat".into(),
        category: "Grain".into(),
        unit: "t".into(),
        quantity: 40,
        planted_date: 1_600_000_000,
        expiry_date: 4_000_000_000,
        farm_gate_price: 210,
        carbon_footprint: 3,
        ..Default::default()
    }
}

// ============================================================================
// Pure algorithms
// ============================================================================

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-02-algorithms");

    group.bench_function("validate_stage_update", |b| {
        b.iter(|| {
            for pair in Stage::ALL.windows(2) {
                black_box(
                    validate_stage_update(pair[0], pair[1], StakeholderKind::Distributor).is_ok(),
                );
            }
        })
    });

    group.bench_function("derive_batch_number", |b| {
        let mut id = 0u64;
        b.iter(|| {
            id += 1;
            black_box(derive_batch_number(&FARMER, id, 1_700_000_000))
        })
    });

    group.finish();
}

// ============================================================================
// Engine
// ============================================================================

fn bench_engine(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("hc-02-engine");

    group.bench_function("create_advance_transfer", |b| {
        let engine = engine();
        b.iter(|| {
            rt.block_on(async {
                let id = engine.create_product(FARMER, product()).await.unwrap();
                engine
                    .update_product_stage(FARMER, id, Stage::Harvested, String::new(), String::new())
                    .await
                    .unwrap();
                engine
                    .transfer_product(
                        FARMER,
                        TransferRequest::new(id, DISTRIBUTOR, 250, Stage::ShippedToDistributor),
                    )
                    .await
                    .unwrap();
                black_box(id)
            })
        })
    });

    for size in [100u64, 1_000, 10_000] {
        let engine = engine();
        rt.block_on(async {
            for _ in 0..size {
                engine.create_product(FARMER, product()).await.unwrap();
            }
        });

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("system_statistics", size), &engine, |b, engine| {
            b.iter(|| rt.block_on(async { black_box(engine.get_system_statistics().await) }))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_algorithms, bench_engine);
criterion_main!(benches);
