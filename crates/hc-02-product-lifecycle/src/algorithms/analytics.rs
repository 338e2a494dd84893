//! Quality and sustainability aggregation
//!
//! Full scans over the ledger; nothing is cached.

use crate::domain::ledger::ProductLedger;
use crate::domain::value_objects::{SustainabilityMetrics, SystemStatistics};
use std::collections::HashSet;

pub fn system_statistics(ledger: &ProductLedger) -> SystemStatistics {
    let mut stats = SystemStatistics {
        total_products: ledger.len() as u64,
        total_transactions: ledger.total_transactions(),
        ..Default::default()
    };

    let mut assessed = 0u64;
    let mut score_sum = 0u64;

    for product in ledger.iter() {
        if product.is_active {
            stats.active_products += 1;
        }
        if let Some(score) = product.latest_quality_score() {
            assessed += 1;
            score_sum += u64::from(score);
        }
        stats.total_carbon_footprint = stats
            .total_carbon_footprint
            .saturating_add(product.carbon_footprint);
    }

    stats.average_quality_score = score_sum.checked_div(assessed).unwrap_or(0);
    stats
}

pub fn sustainability_metrics(ledger: &ProductLedger) -> SustainabilityMetrics {
    let mut metrics = SustainabilityMetrics::default();
    let mut organic_farmers = HashSet::new();

    for product in ledger.iter() {
        metrics.total_carbon_footprint = metrics
            .total_carbon_footprint
            .saturating_add(product.carbon_footprint);
        if product.is_organic_certified() {
            metrics.organic_certified_products += 1;
        }
        if product.practices.is_organic {
            organic_farmers.insert(product.farmer);
        }
    }

    metrics.organic_farmers = organic_farmers.len() as u64;
    metrics.average_carbon_per_product = metrics
        .total_carbon_footprint
        .checked_div(ledger.len() as u64)
        .unwrap_or(0);
    metrics
}
