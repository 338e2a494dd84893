//! Product Lifecycle Service
//!
//! Main service implementing `ProductLifecycleApi`.
//!
//! Every operation runs under one state lock, so reads and writes of
//! different operations never interleave. A mutating operation:
//! 1. Looks up the parties it needs in the stakeholder directory
//! 2. Checks every precondition, first failure wins
//! 3. Mutates the ledger and queues notifications in an `Outbox`
//! 4. Releases the state lock, then delivers the notifications

use crate::algorithms::{
    apply_transfer_price, derive_batch_number, sustainability_metrics, system_statistics,
    validate_stage_update, validate_transfer_stage,
};
use crate::application::outbox::Outbox;
use crate::config::{ConfigError, LifecycleConfig};
use crate::domain::controls::SystemControls;
use crate::domain::entities::{PriceInfo, Product, QualityRecord, Transaction};
use crate::domain::errors::LifecycleError;
use crate::domain::invariants;
use crate::domain::ledger::ProductLedger;
use crate::domain::value_objects::{
    BatchQualityData, BatchReport, ProductCreationData, QualityData, SustainabilityMetrics,
    SystemStatistics, TransferRequest,
};
use crate::ports::inbound::ProductLifecycleApi;
use crate::ports::outbound::{LifecycleEventSink, StakeholderDirectory, TimeSource};
use async_trait::async_trait;
use hc_01_stakeholder_registry::StakeholderProfile;
use hc_telemetry::{
    OPERATIONS_REJECTED, OPERATION_DURATION, PRODUCTS_CREATED, QUALITY_RECORDS, STAGE_UPDATES,
    TRANSFERS,
};
use shared_bus::SupplyChainEvent;
use shared_types::entities::{
    is_zero_address, short_address, Address, Certification, ProductId, Stage, StakeholderKind,
    Timestamp,
};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Ledger plus the administrative flags, guarded together.
#[derive(Debug, Default)]
struct LedgerState {
    ledger: ProductLedger,
    controls: SystemControls,
}

/// Product Lifecycle Service
///
/// Generic over its collaborators: the stakeholder directory `R`, the audit
/// event sink `P` and the clock `T`.
pub struct ProductLifecycleService<R, P, T>
where
    R: StakeholderDirectory,
    P: LifecycleEventSink,
    T: TimeSource,
{
    directory: Arc<R>,
    sink: Arc<P>,
    time: Arc<T>,
    config: LifecycleConfig,
    admin: Address,
    state: Mutex<LedgerState>,
    /// Held while notifications are delivered so they leave in commit order.
    delivery: Mutex<()>,
}

impl<R, P, T> ProductLifecycleService<R, P, T>
where
    R: StakeholderDirectory,
    P: LifecycleEventSink,
    T: TimeSource,
{
    /// Create a service. `admin` is the only address allowed to pause and
    /// block.
    pub fn new(
        directory: Arc<R>,
        sink: Arc<P>,
        time: Arc<T>,
        admin: Address,
        config: LifecycleConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            admin = %short_address(&admin),
            pricing_policy = ?config.pricing_policy,
            min_reputation = config.min_reputation_for_transaction,
            "Product lifecycle service started"
        );
        Ok(Self {
            directory,
            sink,
            time,
            config,
            admin,
            state: Mutex::new(LedgerState::default()),
            delivery: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    // =========================================================================
    // PLUMBING
    // =========================================================================

    async fn profile(&self, address: &Address) -> Result<StakeholderProfile, LifecycleError> {
        self.directory.profile(address).await.map_err(|e| {
            warn!(stakeholder = %short_address(address), error = %e, "Registry lookup failed");
            LifecycleError::from(e)
        })
    }

    /// Release the state lock, then deliver the outbox.
    async fn commit(&self, state: MutexGuard<'_, LedgerState>, outbox: Outbox) {
        let _delivery = self.delivery.lock().await;
        drop(state);
        if outbox.is_empty() {
            return;
        }
        let summary = outbox
            .flush(self.directory.as_ref(), self.sink.as_ref())
            .await;
        if summary.dropped > 0 {
            debug!(
                delivered = summary.delivered,
                dropped = summary.dropped,
                "Notifications flushed with drops"
            );
        }
    }

    fn ensure_admin(&self, caller: &Address) -> Result<(), LifecycleError> {
        if *caller == self.admin {
            Ok(())
        } else {
            Err(LifecycleError::NotAdmin)
        }
    }

    // =========================================================================
    // LEDGER
    // =========================================================================

    async fn do_create_product(
        &self,
        creator: Address,
        data: ProductCreationData,
    ) -> Result<ProductId, LifecycleError> {
        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        let now = self.time.now();

        validate_creation(&data, now)?;
        if state.controls.is_user_blocked(&creator) {
            return Err(LifecycleError::UserBlocked(creator));
        }

        let profile = self.profile(&creator).await?;
        if profile.kind != StakeholderKind::Farmer {
            return Err(LifecycleError::NotFarmer(profile.kind));
        }
        if !profile.verified {
            return Err(LifecycleError::StakeholderNotVerified(creator));
        }

        let id = state.ledger.next_id();
        let batch_number = derive_batch_number(&creator, id, now);
        let currency = if data.currency.trim().is_empty() {
            self.config.default_currency.clone()
        } else {
            data.currency.trim().to_string()
        };

        let product = Product {
            id,
            name: data.name.trim().to_string(),
            variety: data.variety,
            category: data.category.trim().to_string(),
            unit: data.unit,
            quantity: data.quantity,
            planted_date: data.planted_date,
            harvest_date: data.harvest_date,
            expiry_date: data.expiry_date,
            last_updated: now,
            created_at: now,
            farmer: creator,
            current_owner: creator,
            farm_location: profile.location.clone(),
            current_location: profile.location,
            stage: Stage::Planted,
            quality_history: Vec::new(),
            certifications: data.certifications,
            price: PriceInfo {
                farm_gate_price: data.farm_gate_price,
                distributor_price: 0,
                retailer_price: 0,
                recommended_retail_price: data.recommended_retail_price,
                currency,
                last_updated: now,
            },
            practices: data.practices,
            is_active: true,
            carbon_footprint: data.carbon_footprint,
            batch_number: batch_number.clone(),
        };

        let creation = Transaction {
            product_id: id,
            from: None,
            to: creator,
            quantity: product.quantity,
            price: product.price.farm_gate_price,
            stage: Stage::Planted,
            timestamp: now,
            estimated_delivery: None,
            tx_reference: None,
            notes: "Product Created".to_string(),
            location_ref: data.location_ref,
        };

        let mut outbox = Outbox::new();
        outbox.record_product(creator, id);
        outbox.event(SupplyChainEvent::ProductCreated {
            product_id: id,
            farmer: creator,
            name: product.name.clone(),
            category: product.category.clone(),
            quantity: product.quantity,
            batch_number: batch_number.clone(),
            timestamp: now,
        });

        state.ledger.insert(product, creation);
        PRODUCTS_CREATED.inc();
        info!(
            product_id = id,
            farmer = %short_address(&creator),
            batch_number = %batch_number,
            "Product created"
        );

        self.commit(state, outbox).await;
        Ok(id)
    }

    async fn do_add_certification(
        &self,
        caller: Address,
        product_id: ProductId,
        certification: Certification,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        let now = self.time.now();

        ensure_mutable(&state, product_id)?;
        ensure_owner(&state.ledger, product_id, &caller)?;
        ensure_user_allowed(&state.controls, &caller)?;
        if matches!(&certification, Certification::Other(name) if name.trim().is_empty()) {
            return Err(LifecycleError::InvalidInput(
                "certification name is empty".into(),
            ));
        }

        let product = product_mut(&mut state.ledger, product_id)?;
        product.certifications.push(certification.clone());
        product.last_updated = now;

        let mut outbox = Outbox::new();
        outbox.event(SupplyChainEvent::CertificationAdded {
            product_id,
            certification: certification.clone(),
            added_by: caller,
            timestamp: now,
        });
        info!(product_id, certification = ?certification, "Certification added");

        self.commit(state, outbox).await;
        Ok(())
    }

    async fn do_deactivate_product(
        &self,
        caller: Address,
        product_id: ProductId,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        let now = self.time.now();

        let product = state
            .ledger
            .get(product_id)
            .ok_or(LifecycleError::ProductNotFound(product_id))?;
        if !product.is_active {
            return Err(LifecycleError::ProductInactive(product_id));
        }
        if caller != self.admin {
            if state.controls.is_product_blocked(product_id) {
                return Err(LifecycleError::ProductBlocked(product_id));
            }
            ensure_owner(&state.ledger, product_id, &caller)?;
            ensure_user_allowed(&state.controls, &caller)?;
        }

        let product = product_mut(&mut state.ledger, product_id)?;
        product.is_active = false;
        product.last_updated = now;

        let mut outbox = Outbox::new();
        outbox.event(SupplyChainEvent::ProductDeactivated {
            product_id,
            deactivated_by: caller,
            timestamp: now,
        });
        info!(product_id, by = %short_address(&caller), "Product deactivated");

        self.commit(state, outbox).await;
        Ok(())
    }

    // =========================================================================
    // STAGES
    // =========================================================================

    async fn do_update_product_stage(
        &self,
        caller: Address,
        product_id: ProductId,
        new_stage: Stage,
        new_location: String,
        notes: String,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        ensure_mutable(&state, product_id)?;
        let profile = self.profile(&caller).await?;
        let now = self.time.now();

        let mut outbox = Outbox::new();
        apply_stage_update(
            &mut state,
            StageUpdate {
                caller,
                caller_kind: profile.kind,
                product_id,
                new_stage,
                new_location: &new_location,
                notes: &notes,
                now,
            },
            &mut outbox,
        )?;
        STAGE_UPDATES.inc();

        self.commit(state, outbox).await;
        Ok(())
    }

    async fn do_batch_update_stage(
        &self,
        caller: Address,
        product_ids: Vec<ProductId>,
        stages: Vec<Stage>,
        notes: String,
    ) -> Result<BatchReport, LifecycleError> {
        validate_batch_shape(
            product_ids.len(),
            stages.len(),
            self.config.max_batch_stage_updates,
        )?;

        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        ensure_user_allowed(&state.controls, &caller)?;
        let profile = self.profile(&caller).await?;
        let now = self.time.now();

        let mut outbox = Outbox::new();
        let mut report = BatchReport::default();
        for (product_id, new_stage) in product_ids.into_iter().zip(stages) {
            let update = StageUpdate {
                caller,
                caller_kind: profile.kind,
                product_id,
                new_stage,
                new_location: "",
                notes: &notes,
                now,
            };
            match apply_stage_update(&mut state, update, &mut outbox) {
                Ok(()) => report.applied.push(product_id),
                Err(e) => {
                    debug!(product_id, error = %e, "Batch stage update skipped");
                    report.skipped.push((product_id, e));
                }
            }
        }

        STAGE_UPDATES.inc_by(report.applied_count() as f64);
        info!(
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            "Batch stage update finished"
        );

        self.commit(state, outbox).await;
        Ok(report)
    }

    // =========================================================================
    // CUSTODY
    // =========================================================================

    async fn do_transfer_product(
        &self,
        caller: Address,
        request: TransferRequest,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        let product_id = request.product_id;

        ensure_mutable(&state, product_id)?;
        ensure_owner(&state.ledger, product_id, &caller)?;
        ensure_user_allowed(&state.controls, &caller)?;

        let threshold = self.config.min_reputation_for_transaction;
        let sender = self.profile(&caller).await?;
        ensure_reputation(&caller, &sender, threshold)?;
        let recipient = self.profile(&request.recipient).await?;
        ensure_reputation(&request.recipient, &recipient, threshold)?;
        ensure_user_allowed(&state.controls, &request.recipient)?;

        if is_zero_address(&request.recipient) {
            return Err(LifecycleError::InvalidInput("recipient is the zero address".into()));
        }
        if request.recipient == caller {
            return Err(LifecycleError::InvalidInput("recipient is the current owner".into()));
        }
        if request.price == 0 {
            return Err(LifecycleError::InvalidInput("price must be positive".into()));
        }
        let reference = request.reference().map(str::to_string);
        if let Some(reference) = &reference {
            if state.ledger.is_reference_used(reference) {
                return Err(LifecycleError::DuplicateTransactionReference(
                    reference.clone(),
                ));
            }
        }

        let current = product_ref(&state.ledger, product_id)?.stage;
        validate_transfer_stage(current, request.new_stage, recipient.kind)?;

        // All checks passed; mutate.
        let now = self.time.now();
        let policy = self.config.pricing_policy;
        let product = product_mut(&mut state.ledger, product_id)?;
        let previous_owner = product.current_owner;
        product.current_owner = request.recipient;
        product.stage = request.new_stage;
        product.last_updated = now;
        let tier = apply_transfer_price(
            &mut product.price,
            request.new_stage,
            request.price,
            policy,
            now,
        );
        let quantity = product.quantity;
        debug_assert!(invariants::invariant_stage_monotonic(current, product.stage));

        state
            .ledger
            .reindex_owner(product_id, &previous_owner, request.recipient);
        if let Some(reference) = &reference {
            state.ledger.claim_reference(reference);
        }
        let appended = state.ledger.append_transaction(Transaction {
            product_id,
            from: Some(previous_owner),
            to: request.recipient,
            quantity,
            price: request.price,
            stage: request.new_stage,
            timestamp: now,
            estimated_delivery: request.estimated_delivery,
            tx_reference: reference.clone(),
            notes: request.notes.clone(),
            location_ref: request.location_ref.clone(),
        });
        debug_assert!(appended, "transaction log missing for product {}", product_id);

        let mut outbox = Outbox::new();
        outbox.record_product(request.recipient, product_id);
        outbox.event(SupplyChainEvent::ProductTransferred {
            product_id,
            from: previous_owner,
            to: request.recipient,
            quantity,
            price: request.price,
            stage: request.new_stage,
            tx_reference: reference,
            estimated_delivery: request.estimated_delivery,
            notes: request.notes,
            location_ref: request.location_ref,
            timestamp: now,
        });

        TRANSFERS.inc();
        info!(
            product_id,
            from = %short_address(&previous_owner),
            to = %short_address(&request.recipient),
            stage = %request.new_stage,
            price = request.price,
            tier = ?tier,
            "Product transferred"
        );

        self.commit(state, outbox).await;
        Ok(())
    }

    // =========================================================================
    // QUALITY
    // =========================================================================

    async fn authorize_inspector(
        &self,
        controls: &SystemControls,
        caller: &Address,
    ) -> Result<(), LifecycleError> {
        ensure_user_allowed(controls, caller)?;
        let profile = self.profile(caller).await?;
        if profile.kind != StakeholderKind::Inspector {
            return Err(LifecycleError::NotInspector(profile.kind));
        }
        if !profile.meets(self.config.min_reputation_for_verification) {
            return Err(LifecycleError::StakeholderNotVerified(*caller));
        }
        Ok(())
    }

    fn apply_quality(
        &self,
        state: &mut LedgerState,
        caller: Address,
        product_id: ProductId,
        data: QualityData,
        now: Timestamp,
        outbox: &mut Outbox,
    ) -> Result<(), LifecycleError> {
        ensure_mutable(state, product_id)?;
        validate_quality(&data, self.config.min_quality_score)?;

        let product = product_mut(&mut state.ledger, product_id)?;
        let record = QualityRecord {
            grade: data.grade,
            score: data.score,
            inspector: caller,
            timestamp: now,
            test_results_ref: data.test_results_ref,
            parameters: data.parameters,
            parameter_scores: data.parameter_scores,
        };
        let score = record.score;
        outbox.event(SupplyChainEvent::QualityRecorded {
            product_id,
            inspector: caller,
            grade: record.grade.clone(),
            score,
            test_results_ref: record.test_results_ref.clone(),
            parameters: record.parameters.clone(),
            parameter_scores: record.parameter_scores.clone(),
            timestamp: now,
        });
        product.quality_history.push(record);
        product.last_updated = now;

        info!(product_id, score, inspector = %short_address(&caller), "Quality recorded");
        Ok(())
    }

    async fn do_record_quality_assessment(
        &self,
        caller: Address,
        product_id: ProductId,
        data: QualityData,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        ensure_mutable(&state, product_id)?;
        self.authorize_inspector(&state.controls, &caller).await?;
        let now = self.time.now();

        let mut outbox = Outbox::new();
        self.apply_quality(&mut state, caller, product_id, data, now, &mut outbox)?;
        QUALITY_RECORDS.inc();

        self.commit(state, outbox).await;
        Ok(())
    }

    async fn do_batch_record_quality(
        &self,
        caller: Address,
        batch: BatchQualityData,
    ) -> Result<BatchReport, LifecycleError> {
        validate_batch_shape(
            batch.product_ids.len(),
            batch.assessments.len(),
            self.config.max_batch_quality_records,
        )?;

        let mut state = self.state.lock().await;
        ensure_running(&state.controls)?;
        self.authorize_inspector(&state.controls, &caller).await?;
        let now = self.time.now();

        let mut outbox = Outbox::new();
        let mut report = BatchReport::default();
        for (product_id, data) in batch.product_ids.into_iter().zip(batch.assessments) {
            match self.apply_quality(&mut state, caller, product_id, data, now, &mut outbox) {
                Ok(()) => report.applied.push(product_id),
                Err(e) => {
                    debug!(product_id, error = %e, "Batch quality record skipped");
                    report.skipped.push((product_id, e));
                }
            }
        }

        QUALITY_RECORDS.inc_by(report.applied_count() as f64);
        info!(
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            "Batch quality recording finished"
        );

        self.commit(state, outbox).await;
        Ok(report)
    }

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    async fn do_set_paused(&self, caller: Address, paused: bool) -> Result<(), LifecycleError> {
        self.ensure_admin(&caller)?;
        let mut state = self.state.lock().await;
        let mut outbox = Outbox::new();
        if state.controls.set_paused(paused) {
            outbox.event(SupplyChainEvent::PauseChanged {
                paused,
                timestamp: self.time.now(),
            });
            warn!(paused, "Pause state changed");
        }
        self.commit(state, outbox).await;
        Ok(())
    }

    async fn do_set_user_blocked(
        &self,
        caller: Address,
        user: Address,
        blocked: bool,
    ) -> Result<(), LifecycleError> {
        self.ensure_admin(&caller)?;
        let mut state = self.state.lock().await;
        let mut outbox = Outbox::new();
        if state.controls.set_user_blocked(user, blocked) {
            outbox.event(SupplyChainEvent::StakeholderBlockChanged {
                stakeholder: user,
                blocked,
                timestamp: self.time.now(),
            });
            info!(stakeholder = %short_address(&user), blocked, "Stakeholder block changed");
        }
        self.commit(state, outbox).await;
        Ok(())
    }

    async fn do_set_product_blocked(
        &self,
        caller: Address,
        product_id: ProductId,
        blocked: bool,
    ) -> Result<(), LifecycleError> {
        self.ensure_admin(&caller)?;
        let mut state = self.state.lock().await;
        if !state.ledger.contains(product_id) {
            return Err(LifecycleError::ProductNotFound(product_id));
        }
        let mut outbox = Outbox::new();
        if state.controls.set_product_blocked(product_id, blocked) {
            outbox.event(SupplyChainEvent::ProductBlockChanged {
                product_id,
                blocked,
                timestamp: self.time.now(),
            });
            info!(product_id, blocked, "Product block changed");
        }
        self.commit(state, outbox).await;
        Ok(())
    }
}

/// Count and log a rejected operation, pass the result through.
fn observe<V>(operation: &'static str, result: Result<V, LifecycleError>) -> Result<V, LifecycleError> {
    if let Err(e) = &result {
        OPERATIONS_REJECTED.with_label_values(&[operation]).inc();
        match e {
            LifecycleError::Registry(_) => warn!(operation, error = %e, "Operation aborted"),
            _ => debug!(operation, error = %e, category = ?e.category(), "Operation rejected"),
        }
    }
    result
}

// =============================================================================
// PRECONDITIONS
// =============================================================================

fn ensure_running(controls: &SystemControls) -> Result<(), LifecycleError> {
    if controls.is_paused() {
        Err(LifecycleError::SystemPaused)
    } else {
        Ok(())
    }
}

fn ensure_user_allowed(controls: &SystemControls, user: &Address) -> Result<(), LifecycleError> {
    if controls.is_user_blocked(user) {
        Err(LifecycleError::UserBlocked(*user))
    } else {
        Ok(())
    }
}

fn product_ref(ledger: &ProductLedger, id: ProductId) -> Result<&Product, LifecycleError> {
    ledger.get(id).ok_or(LifecycleError::ProductNotFound(id))
}

fn product_mut(ledger: &mut ProductLedger, id: ProductId) -> Result<&mut Product, LifecycleError> {
    ledger.get_mut(id).ok_or(LifecycleError::ProductNotFound(id))
}

/// Exists, active and not blocked.
fn ensure_mutable(state: &LedgerState, id: ProductId) -> Result<(), LifecycleError> {
    let product = product_ref(&state.ledger, id)?;
    if !product.is_active {
        return Err(LifecycleError::ProductInactive(id));
    }
    if state.controls.is_product_blocked(id) {
        return Err(LifecycleError::ProductBlocked(id));
    }
    Ok(())
}

fn ensure_owner(ledger: &ProductLedger, id: ProductId, caller: &Address) -> Result<(), LifecycleError> {
    if product_ref(ledger, id)?.current_owner == *caller {
        Ok(())
    } else {
        Err(LifecycleError::NotProductOwner {
            product_id: id,
            caller: *caller,
        })
    }
}

fn ensure_reputation(
    address: &Address,
    profile: &StakeholderProfile,
    threshold: u8,
) -> Result<(), LifecycleError> {
    if profile.meets(threshold) {
        Ok(())
    } else {
        Err(LifecycleError::InsufficientReputation {
            stakeholder: *address,
            reputation: profile.reputation,
            required: threshold,
        })
    }
}

fn validate_creation(data: &ProductCreationData, now: Timestamp) -> Result<(), LifecycleError> {
    let invalid = |msg: &str| Err(LifecycleError::InvalidInput(msg.to_string()));

    if data.name.trim().is_empty() {
        return invalid("name is empty");
    }
    if data.category.trim().is_empty() {
        return invalid("category is empty");
    }
    if data.quantity == 0 {
        return invalid("quantity must be positive");
    }
    if data.farm_gate_price == 0 {
        return invalid("farm gate price must be positive");
    }
    if data.planted_date > now {
        return invalid("planted date is in the future");
    }
    match data.harvest_date {
        Some(harvest) if harvest < data.planted_date => invalid("harvest date precedes planting"),
        Some(harvest) if data.expiry_date <= harvest => invalid("expiry date must follow harvest"),
        None if data.expiry_date <= data.planted_date => {
            invalid("expiry date must follow planting")
        }
        _ => Ok(()),
    }
}

fn validate_quality(data: &QualityData, min_score: u8) -> Result<(), LifecycleError> {
    if data.parameters.len() != data.parameter_scores.len() {
        return Err(LifecycleError::InvalidInput(format!(
            "{} parameters but {} parameter scores",
            data.parameters.len(),
            data.parameter_scores.len()
        )));
    }
    if data.score > 100 || data.parameter_scores.iter().any(|s| *s > 100) {
        return Err(LifecycleError::InvalidInput("score above 100".into()));
    }
    if data.score < min_score {
        return Err(LifecycleError::QualityScoreTooLow {
            score: data.score,
            min: min_score,
        });
    }
    Ok(())
}

fn validate_batch_shape(ids: usize, items: usize, max: usize) -> Result<(), LifecycleError> {
    if ids != items {
        return Err(LifecycleError::InvalidInput(format!(
            "{} product ids but {} items",
            ids, items
        )));
    }
    if ids == 0 {
        return Err(LifecycleError::InvalidInput("batch is empty".into()));
    }
    if ids > max {
        return Err(LifecycleError::BatchTooLarge { size: ids, max });
    }
    Ok(())
}

// =============================================================================
// STAGE UPDATE
// =============================================================================

struct StageUpdate<'a> {
    caller: Address,
    caller_kind: StakeholderKind,
    product_id: ProductId,
    new_stage: Stage,
    new_location: &'a str,
    notes: &'a str,
    now: Timestamp,
}

fn apply_stage_update(
    state: &mut LedgerState,
    update: StageUpdate<'_>,
    outbox: &mut Outbox,
) -> Result<(), LifecycleError> {
    let StageUpdate {
        caller,
        caller_kind,
        product_id,
        new_stage,
        new_location,
        notes,
        now,
    } = update;

    ensure_mutable(state, product_id)?;
    ensure_owner(&state.ledger, product_id, &caller)?;
    ensure_user_allowed(&state.controls, &caller)?;

    let product = product_mut(&mut state.ledger, product_id)?;
    let previous_stage = product.stage;
    validate_stage_update(previous_stage, new_stage, caller_kind)?;

    product.stage = new_stage;
    product.last_updated = now;
    if new_stage == Stage::Harvested && product.harvest_date.is_none() {
        product.harvest_date = Some(now);
    }
    let location = new_location.trim();
    let location_changed = !location.is_empty();
    if location_changed {
        product.current_location = location.to_string();
    }
    let quantity = product.quantity;
    debug_assert!(invariants::invariant_stage_monotonic(previous_stage, new_stage));

    let appended = state.ledger.append_transaction(Transaction {
        product_id,
        from: Some(caller),
        to: caller,
        quantity,
        price: 0,
        stage: new_stage,
        timestamp: now,
        estimated_delivery: None,
        tx_reference: None,
        notes: notes.to_string(),
        location_ref: String::new(),
    });
    debug_assert!(appended, "transaction log missing for product {}", product_id);

    outbox.event(SupplyChainEvent::StageUpdated {
        product_id,
        previous_stage,
        new_stage,
        updated_by: caller,
        quantity,
        notes: notes.to_string(),
        timestamp: now,
    });
    if location_changed {
        outbox.event(SupplyChainEvent::LocationUpdated {
            product_id,
            location: location.to_string(),
            updated_by: caller,
            timestamp: now,
        });
    }

    info!(
        product_id,
        from = %previous_stage,
        to = %new_stage,
        by = %short_address(&caller),
        "Stage updated"
    );
    Ok(())
}

// =============================================================================
// API
// =============================================================================

#[async_trait]
impl<R, P, T> ProductLifecycleApi for ProductLifecycleService<R, P, T>
where
    R: StakeholderDirectory + 'static,
    P: LifecycleEventSink + 'static,
    T: TimeSource + 'static,
{
    async fn create_product(
        &self,
        creator: Address,
        data: ProductCreationData,
    ) -> Result<ProductId, LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["create_product"])
            .start_timer();
        observe("create_product", self.do_create_product(creator, data).await)
    }

    async fn add_certification(
        &self,
        caller: Address,
        product_id: ProductId,
        certification: Certification,
    ) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["add_certification"])
            .start_timer();
        observe(
            "add_certification",
            self.do_add_certification(caller, product_id, certification)
                .await,
        )
    }

    async fn deactivate_product(
        &self,
        caller: Address,
        product_id: ProductId,
    ) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["deactivate_product"])
            .start_timer();
        observe(
            "deactivate_product",
            self.do_deactivate_product(caller, product_id).await,
        )
    }

    async fn update_product_stage(
        &self,
        caller: Address,
        product_id: ProductId,
        new_stage: Stage,
        new_location: String,
        notes: String,
    ) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["update_product_stage"])
            .start_timer();
        observe(
            "update_product_stage",
            self.do_update_product_stage(caller, product_id, new_stage, new_location, notes)
                .await,
        )
    }

    async fn transfer_product(
        &self,
        caller: Address,
        request: TransferRequest,
    ) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["transfer_product"])
            .start_timer();
        observe(
            "transfer_product",
            self.do_transfer_product(caller, request).await,
        )
    }

    async fn batch_update_stage(
        &self,
        caller: Address,
        product_ids: Vec<ProductId>,
        stages: Vec<Stage>,
        notes: String,
    ) -> Result<BatchReport, LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["batch_update_stage"])
            .start_timer();
        observe(
            "batch_update_stage",
            self.do_batch_update_stage(caller, product_ids, stages, notes)
                .await,
        )
    }

    async fn record_quality_assessment(
        &self,
        caller: Address,
        product_id: ProductId,
        data: QualityData,
    ) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["record_quality_assessment"])
            .start_timer();
        observe(
            "record_quality_assessment",
            self.do_record_quality_assessment(caller, product_id, data)
                .await,
        )
    }

    async fn batch_record_quality(
        &self,
        caller: Address,
        batch: BatchQualityData,
    ) -> Result<BatchReport, LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["batch_record_quality"])
            .start_timer();
        observe(
            "batch_record_quality",
            self.do_batch_record_quality(caller, batch).await,
        )
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product, LifecycleError> {
        let state = self.state.lock().await;
        product_ref(&state.ledger, product_id).cloned()
    }

    async fn get_transactions(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Transaction>, LifecycleError> {
        let state = self.state.lock().await;
        state
            .ledger
            .transactions(product_id)
            .map(<[Transaction]>::to_vec)
            .ok_or(LifecycleError::ProductNotFound(product_id))
    }

    async fn get_quality_history(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<QualityRecord>, LifecycleError> {
        let state = self.state.lock().await;
        product_ref(&state.ledger, product_id).map(|p| p.quality_history.clone())
    }

    async fn list_by_category(&self, category: &str) -> Vec<ProductId> {
        self.state.lock().await.ledger.ids_by_category(category)
    }

    async fn list_by_owner(&self, owner: Address) -> Vec<ProductId> {
        self.state.lock().await.ledger.ids_by_owner(&owner)
    }

    async fn list_by_stage(&self, stage: Stage) -> Vec<ProductId> {
        self.state.lock().await.ledger.ids_by_stage(stage)
    }

    async fn list_all_ids(&self) -> Vec<ProductId> {
        self.state.lock().await.ledger.ids()
    }

    async fn list_all_categories(&self) -> Vec<String> {
        self.state.lock().await.ledger.categories()
    }

    async fn find_by_batch_number(&self, batch_number: &str) -> Option<ProductId> {
        self.state.lock().await.ledger.find_by_batch_number(batch_number)
    }

    async fn get_system_statistics(&self) -> SystemStatistics {
        system_statistics(&self.state.lock().await.ledger)
    }

    async fn get_sustainability_metrics(&self) -> SustainabilityMetrics {
        sustainability_metrics(&self.state.lock().await.ledger)
    }

    async fn set_paused(&self, caller: Address, paused: bool) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["set_paused"])
            .start_timer();
        observe("set_paused", self.do_set_paused(caller, paused).await)
    }

    async fn block_user(&self, caller: Address, user: Address) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["block_user"])
            .start_timer();
        observe("block_user", self.do_set_user_blocked(caller, user, true).await)
    }

    async fn unblock_user(&self, caller: Address, user: Address) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["unblock_user"])
            .start_timer();
        observe(
            "unblock_user",
            self.do_set_user_blocked(caller, user, false).await,
        )
    }

    async fn block_product(
        &self,
        caller: Address,
        product_id: ProductId,
    ) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["block_product"])
            .start_timer();
        observe(
            "block_product",
            self.do_set_product_blocked(caller, product_id, true).await,
        )
    }

    async fn unblock_product(
        &self,
        caller: Address,
        product_id: ProductId,
    ) -> Result<(), LifecycleError> {
        let _timer = OPERATION_DURATION
            .with_label_values(&["unblock_product"])
            .start_timer();
        observe(
            "unblock_product",
            self.do_set_product_blocked(caller, product_id, false).await,
        )
    }

    async fn is_paused(&self) -> bool {
        self.state.lock().await.controls.is_paused()
    }
}
