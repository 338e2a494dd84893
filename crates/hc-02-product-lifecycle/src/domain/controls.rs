//! Administrative flags read by every mutating operation.

use shared_types::entities::{Address, ProductId};
use std::collections::HashSet;

/// Pause switch and block lists. Changed only through the admin operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SystemControls {
    paused: bool,
    blocked_users: HashSet<Address>,
    blocked_products: HashSet<ProductId>,
}

impl SystemControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns true if the flag changed.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        std::mem::replace(&mut self.paused, paused) != paused
    }

    pub fn is_user_blocked(&self, address: &Address) -> bool {
        self.blocked_users.contains(address)
    }

    /// Returns true if the flag changed.
    pub fn set_user_blocked(&mut self, address: Address, blocked: bool) -> bool {
        if blocked {
            self.blocked_users.insert(address)
        } else {
            self.blocked_users.remove(&address)
        }
    }

    pub fn is_product_blocked(&self, product_id: ProductId) -> bool {
        self.blocked_products.contains(&product_id)
    }

    /// Returns true if the flag changed.
    pub fn set_product_blocked(&mut self, product_id: ProductId, blocked: bool) -> bool {
        if blocked {
            self.blocked_products.insert(product_id)
        } else {
            self.blocked_products.remove(&product_id)
        }
    }
}
