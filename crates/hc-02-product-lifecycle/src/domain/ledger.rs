//! Product Ledger
//!
//! Arena of products indexed by dense id (`id - 1`), with the per-product
//! transaction log alongside and secondary indexes kept in step on every
//! write.

use super::entities::{Product, Transaction};
use shared_types::entities::{Address, ProductId, Stage};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct ProductLedger {
    products: Vec<Product>,
    /// `transactions[i]` belongs to `products[i]`.
    transactions: Vec<Vec<Transaction>>,
    by_category: HashMap<String, Vec<ProductId>>,
    /// Categories in first-seen order.
    categories: Vec<String>,
    by_owner: HashMap<Address, Vec<ProductId>>,
    by_batch_number: HashMap<String, ProductId>,
    used_tx_references: HashSet<String>,
}

impl ProductLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next inserted product will receive. Starts at 1.
    pub fn next_id(&self) -> ProductId {
        self.products.len() as ProductId + 1
    }

    /// Append a product with its creation record and index it.
    ///
    /// The product's id must equal [`next_id`](Self::next_id).
    pub fn insert(&mut self, product: Product, creation: Transaction) -> ProductId {
        let id = product.id;
        debug_assert_eq!(id, self.next_id());

        if !self.by_category.contains_key(&product.category) {
            self.categories.push(product.category.clone());
        }
        self.by_category
            .entry(product.category.clone())
            .or_default()
            .push(id);
        self.by_owner
            .entry(product.current_owner)
            .or_default()
            .push(id);
        self.by_batch_number.insert(product.batch_number.clone(), id);

        self.products.push(product);
        self.transactions.push(vec![creation]);
        id
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        slot(id).and_then(|i| self.products.get(i))
    }

    pub fn get_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        slot(id).and_then(move |i| self.products.get_mut(i))
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    pub fn transactions(&self, id: ProductId) -> Option<&[Transaction]> {
        slot(id)
            .and_then(|i| self.transactions.get(i))
            .map(Vec::as_slice)
    }

    /// Append to a product's log. Returns false for an unknown product.
    #[must_use]
    pub fn append_transaction(&mut self, tx: Transaction) -> bool {
        match slot(tx.product_id).and_then(|i| self.transactions.get_mut(i)) {
            Some(log) => {
                log.push(tx);
                true
            }
            None => false,
        }
    }

    /// Move a product between owners in the owner index.
    pub fn reindex_owner(&mut self, id: ProductId, from: &Address, to: Address) {
        if let Some(held) = self.by_owner.get_mut(from) {
            held.retain(|p| *p != id);
            if held.is_empty() {
                self.by_owner.remove(from);
            }
        }
        self.by_owner.entry(to).or_default().push(id);
    }

    pub fn is_reference_used(&self, reference: &str) -> bool {
        self.used_tx_references.contains(reference)
    }

    /// Returns false if the reference was already taken.
    pub fn claim_reference(&mut self, reference: &str) -> bool {
        self.used_tx_references.insert(reference.to_string())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn total_transactions(&self) -> u64 {
        self.transactions.iter().map(|log| log.len() as u64).sum()
    }

    pub fn ids(&self) -> Vec<ProductId> {
        self.products.iter().map(|p| p.id).collect()
    }

    pub fn ids_by_category(&self, category: &str) -> Vec<ProductId> {
        self.by_category.get(category).cloned().unwrap_or_default()
    }

    pub fn ids_by_owner(&self, owner: &Address) -> Vec<ProductId> {
        self.by_owner.get(owner).cloned().unwrap_or_default()
    }

    pub fn ids_by_stage(&self, stage: Stage) -> Vec<ProductId> {
        self.products
            .iter()
            .filter(|p| p.stage == stage)
            .map(|p| p.id)
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.categories.clone()
    }

    pub fn find_by_batch_number(&self, batch_number: &str) -> Option<ProductId> {
        self.by_batch_number.get(batch_number).copied()
    }
}

fn slot(id: ProductId) -> Option<usize> {
    id.checked_sub(1).and_then(|i| usize::try_from(i).ok())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::entities::{FarmingPractices, PriceInfo};

    pub fn product(id: ProductId, owner: Address, category: &str) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            variety: String::new(),
            category: category.to_string(),
            unit: "kg".into(),
            quantity: 100,
            planted_date: 1,
            harvest_date: None,
            expiry_date: 1_000,
            last_updated: 1,
            created_at: 1,
            farmer: owner,
            current_owner: owner,
            farm_location: "Farm".into(),
            current_location: "Farm".into(),
            stage: Stage::Planted,
            quality_history: vec![],
            certifications: vec![],
            price: PriceInfo::default(),
            practices: FarmingPractices::default(),
            is_active: true,
            carbon_footprint: 0,
            batch_number: format!("BATCH-{:016x}", id),
        }
    }

    pub fn creation(id: ProductId, owner: Address) -> Transaction {
        Transaction {
            product_id: id,
            from: None,
            to: owner,
            quantity: 100,
            price: 0,
            stage: Stage::Planted,
            timestamp: 1,
            estimated_delivery: None,
            tx_reference: None,
            notes: "Product Created".into(),
            location_ref: String::new(),
        }
    }

    pub fn ledger_with(owners: &[(Address, &str)]) -> ProductLedger {
        let mut ledger = ProductLedger::new();
        for (owner, category) in owners {
            let id = ledger.next_id();
            ledger.insert(product(id, *owner, category), creation(id, *owner));
        }
        ledger
    }
}
