//! Domain invariants for the Product Lifecycle engine
//!
//! Checked with `debug_assert!` after each mutation and directly in tests.

use super::entities::{Product, QualityRecord, Transaction};
use super::ledger::ProductLedger;
use shared_types::entities::Stage;

/// Stage never decreases.
pub fn invariant_stage_monotonic(before: Stage, after: Stage) -> bool {
    after >= before
}

/// Identity fields are untouched by a mutation.
pub fn invariant_identity_preserved(before: &Product, after: &Product) -> bool {
    before.id == after.id
        && before.farmer == after.farmer
        && before.farm_location == after.farm_location
        && before.created_at == after.created_at
        && before.batch_number == after.batch_number
}

/// A harvest date, once set, never changes.
pub fn invariant_harvest_date_stable(before: &Product, after: &Product) -> bool {
    before.harvest_date.is_none() || before.harvest_date == after.harvest_date
}

/// `after` extends `before` without rewriting it.
pub fn invariant_append_only<T: PartialEq>(before: &[T], after: &[T]) -> bool {
    after.len() >= before.len() && after[..before.len()] == *before
}

pub fn invariant_quality_history_append_only(
    before: &[QualityRecord],
    after: &[QualityRecord],
) -> bool {
    invariant_append_only(before, after)
}

pub fn invariant_transactions_append_only(before: &[Transaction], after: &[Transaction]) -> bool {
    invariant_append_only(before, after)
}

/// Every product appears exactly once in the owner index, under its
/// current owner.
pub fn invariant_owner_index_consistent(ledger: &ProductLedger) -> bool {
    ledger.iter().all(|p| {
        let held = ledger.ids_by_owner(&p.current_owner);
        held.iter().filter(|id| **id == p.id).count() == 1
    })
}

/// Transaction logs are ordered by recording time.
pub fn invariant_transactions_ordered(log: &[Transaction]) -> bool {
    log.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}
