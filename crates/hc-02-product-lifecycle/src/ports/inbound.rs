//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{Product, QualityRecord, Transaction};
use crate::domain::errors::LifecycleError;
use crate::domain::value_objects::{
    BatchQualityData, BatchReport, ProductCreationData, QualityData, SustainabilityMetrics,
    SystemStatistics, TransferRequest,
};
use async_trait::async_trait;
use shared_types::entities::{Address, Certification, ProductId, Stage};

/// Primary Product Lifecycle API
///
/// `caller` is the authenticated identity of whoever invokes the
/// operation. Every mutation either applies completely or returns an error
/// with no state change, except the batch operations which skip failing
/// items.
#[async_trait]
pub trait ProductLifecycleApi: Send + Sync {
    // =========================================================================
    // LEDGER
    // =========================================================================

    /// Register a new product batch. Farmer only.
    async fn create_product(
        &self,
        creator: Address,
        data: ProductCreationData,
    ) -> Result<ProductId, LifecycleError>;

    /// Attach a certification. Current owner only.
    async fn add_certification(
        &self,
        caller: Address,
        product_id: ProductId,
        certification: Certification,
    ) -> Result<(), LifecycleError>;

    /// Take a product out of circulation. Current owner or admin.
    async fn deactivate_product(
        &self,
        caller: Address,
        product_id: ProductId,
    ) -> Result<(), LifecycleError>;

    // =========================================================================
    // STAGES AND CUSTODY
    // =========================================================================

    /// Advance a product the caller owns. An empty `new_location` leaves the
    /// current location as is.
    async fn update_product_stage(
        &self,
        caller: Address,
        product_id: ProductId,
        new_stage: Stage,
        new_location: String,
        notes: String,
    ) -> Result<(), LifecycleError>;

    /// Hand custody to another stakeholder.
    async fn transfer_product(
        &self,
        caller: Address,
        request: TransferRequest,
    ) -> Result<(), LifecycleError>;

    /// Apply stage updates pairwise. Length mismatch, an empty list or more
    /// than the configured bound rejects the whole call.
    async fn batch_update_stage(
        &self,
        caller: Address,
        product_ids: Vec<ProductId>,
        stages: Vec<Stage>,
        notes: String,
    ) -> Result<BatchReport, LifecycleError>;

    // =========================================================================
    // QUALITY
    // =========================================================================

    /// Append an inspector's assessment.
    async fn record_quality_assessment(
        &self,
        caller: Address,
        product_id: ProductId,
        data: QualityData,
    ) -> Result<(), LifecycleError>;

    /// Apply assessments pairwise, skipping items that fail.
    async fn batch_record_quality(
        &self,
        caller: Address,
        batch: BatchQualityData,
    ) -> Result<BatchReport, LifecycleError>;

    // =========================================================================
    // READS
    // =========================================================================

    async fn get_product(&self, product_id: ProductId) -> Result<Product, LifecycleError>;

    async fn get_transactions(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Transaction>, LifecycleError>;

    async fn get_quality_history(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<QualityRecord>, LifecycleError>;

    async fn list_by_category(&self, category: &str) -> Vec<ProductId>;

    /// Products currently held by `owner`.
    async fn list_by_owner(&self, owner: Address) -> Vec<ProductId>;

    async fn list_by_stage(&self, stage: Stage) -> Vec<ProductId>;

    /// All ids in creation order.
    async fn list_all_ids(&self) -> Vec<ProductId>;

    /// Categories in first-seen order.
    async fn list_all_categories(&self) -> Vec<String>;

    async fn find_by_batch_number(&self, batch_number: &str) -> Option<ProductId>;

    async fn get_system_statistics(&self) -> SystemStatistics;

    async fn get_sustainability_metrics(&self) -> SustainabilityMetrics;

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    async fn set_paused(&self, caller: Address, paused: bool) -> Result<(), LifecycleError>;

    async fn block_user(&self, caller: Address, user: Address) -> Result<(), LifecycleError>;

    async fn unblock_user(&self, caller: Address, user: Address) -> Result<(), LifecycleError>;

    async fn block_product(
        &self,
        caller: Address,
        product_id: ProductId,
    ) -> Result<(), LifecycleError>;

    async fn unblock_product(
        &self,
        caller: Address,
        product_id: ProductId,
    ) -> Result<(), LifecycleError>;

    async fn is_paused(&self) -> bool;
}
