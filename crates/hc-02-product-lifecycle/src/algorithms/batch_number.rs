//! Batch number derivation
//!
//! `BATCH-` followed by the first 8 bytes of
//! `SHA-256(creator || product_id_be || timestamp_be)` in lowercase hex.

use sha2::{Digest, Sha256};
use shared_types::entities::{Address, ProductId, Timestamp};

pub const BATCH_PREFIX: &str = "BATCH-";

pub fn derive_batch_number(creator: &Address, product_id: ProductId, created_at: Timestamp) -> String {
    let mut hasher = Sha256::new();
    hasher.update(creator);
    hasher.update(product_id.to_be_bytes());
    hasher.update(created_at.to_be_bytes());
    let digest = hasher.finalize();
    format!("{}{}", BATCH_PREFIX, hex::encode(&digest[..8]))
}
