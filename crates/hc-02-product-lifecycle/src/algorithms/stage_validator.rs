//! Stage Transition Validator
//!
//! Two rules, checked in order:
//! 1. Monotonicity: the requested stage is later than the current one.
//! 2. Role window: the acting (or receiving) party's kind may hold the
//!    requested stage.
//!
//! | Kind | Window |
//! |------|--------|
//! | Farmer | `Harvested` only (stage updates only) |
//! | Distributor | `ShippedToDistributor..=ShippedToRetailer` |
//! | Retailer | `ReceivedByRetailer..=SoldOut` |
//! | Inspector, Unregistered | none |

use crate::domain::errors::LifecycleError;
use shared_types::entities::{Stage, StakeholderKind};
use std::ops::RangeInclusive;

/// Stages `kind` may set on a product it holds. A farmer's only move is
/// marking the crop harvested.
pub fn role_window(kind: StakeholderKind) -> Option<RangeInclusive<Stage>> {
    match kind {
        StakeholderKind::Farmer => Some(Stage::Harvested..=Stage::Harvested),
        StakeholderKind::Distributor => {
            Some(Stage::ShippedToDistributor..=Stage::ShippedToRetailer)
        }
        StakeholderKind::Retailer => Some(Stage::ReceivedByRetailer..=Stage::SoldOut),
        StakeholderKind::Inspector | StakeholderKind::Unregistered => None,
    }
}

/// Stages a product may arrive in when `kind` receives it. Farmers never
/// receive custody.
pub fn recipient_window(kind: StakeholderKind) -> Option<RangeInclusive<Stage>> {
    match kind {
        StakeholderKind::Farmer => None,
        other => role_window(other),
    }
}

pub fn is_within_window(kind: StakeholderKind, stage: Stage) -> bool {
    role_window(kind).is_some_and(|w| w.contains(&stage))
}

/// Validate a custodian's own stage update. The new stage must be strictly
/// later.
pub fn validate_stage_update(
    current: Stage,
    requested: Stage,
    actor: StakeholderKind,
) -> Result<(), LifecycleError> {
    if requested <= current {
        return Err(LifecycleError::InvalidStageTransition {
            from: current,
            to: requested,
        });
    }
    if !is_within_window(actor, requested) {
        return Err(LifecycleError::UnauthorizedStageTransition {
            kind: actor,
            stage: requested,
        });
    }
    Ok(())
}

/// Validate the stage a transfer moves a product into, keyed to the
/// recipient's kind. Staying at the same stage is allowed so a distributor
/// can hand off to another distributor.
pub fn validate_transfer_stage(
    current: Stage,
    requested: Stage,
    recipient: StakeholderKind,
) -> Result<(), LifecycleError> {
    if requested < current {
        return Err(LifecycleError::InvalidStageTransition {
            from: current,
            to: requested,
        });
    }
    if !recipient_window(recipient).is_some_and(|w| w.contains(&requested)) {
        return Err(LifecycleError::UnauthorizedStageTransition {
            kind: recipient,
            stage: requested,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_must_move_forward() {
        for kind in [
            StakeholderKind::Farmer,
            StakeholderKind::Distributor,
            StakeholderKind::Retailer,
        ] {
            assert!(matches!(
                validate_stage_update(Stage::Processed, Stage::Processed, kind),
                Err(LifecycleError::InvalidStageTransition { .. })
            ));
            assert!(matches!(
                validate_stage_update(Stage::Processed, Stage::Growing, kind),
                Err(LifecycleError::InvalidStageTransition { .. })
            ));
        }
    }

    #[test]
    fn test_monotonicity_checked_before_window() {
        // Backwards and outside the window: monotonicity wins.
        assert_eq!(
            validate_stage_update(Stage::SoldOut, Stage::Growing, StakeholderKind::Retailer),
            Err(LifecycleError::InvalidStageTransition {
                from: Stage::SoldOut,
                to: Stage::Growing
            })
        );
    }

    #[test]
    fn test_farmer_window() {
        let f = StakeholderKind::Farmer;
        assert!(validate_stage_update(Stage::Planted, Stage::Harvested, f).is_ok());
        assert!(validate_stage_update(Stage::Growing, Stage::Harvested, f).is_ok());
        for (from, to) in [
            (Stage::Planted, Stage::Growing),
            (Stage::Harvested, Stage::Processed),
            (Stage::Processed, Stage::PackedAtFarm),
            (Stage::PackedAtFarm, Stage::ShippedToDistributor),
        ] {
            assert_eq!(
                validate_stage_update(from, to, f),
                Err(LifecycleError::UnauthorizedStageTransition { kind: f, stage: to })
            );
        }
    }

    #[test]
    fn test_distributor_window() {
        let d = StakeholderKind::Distributor;
        assert!(validate_stage_update(Stage::ShippedToDistributor, Stage::ReceivedByDistributor, d).is_ok());
        assert!(validate_stage_update(Stage::ReceivedByDistributor, Stage::ShippedToRetailer, d).is_ok());
        assert!(matches!(
            validate_stage_update(Stage::ShippedToRetailer, Stage::ReceivedByRetailer, d),
            Err(LifecycleError::UnauthorizedStageTransition { .. })
        ));
    }

    #[test]
    fn test_retailer_window() {
        let r = StakeholderKind::Retailer;
        assert!(validate_stage_update(Stage::ReceivedByRetailer, Stage::AvailableForSale, r).is_ok());
        assert!(validate_stage_update(Stage::AvailableForSale, Stage::SoldOut, r).is_ok());
        assert!(matches!(
            validate_stage_update(Stage::Planted, Stage::ShippedToRetailer, r),
            Err(LifecycleError::UnauthorizedStageTransition { .. })
        ));
    }

    #[test]
    fn test_inspector_and_unregistered_have_no_window() {
        for kind in [StakeholderKind::Inspector, StakeholderKind::Unregistered] {
            assert!(role_window(kind).is_none());
            for stage in Stage::ALL.iter().skip(1) {
                assert!(validate_stage_update(Stage::Planted, *stage, kind).is_err());
            }
        }
    }

    #[test]
    fn test_transfer_allows_same_stage_handoff() {
        assert!(validate_transfer_stage(
            Stage::ReceivedByDistributor,
            Stage::ReceivedByDistributor,
            StakeholderKind::Distributor
        )
        .is_ok());
        assert!(matches!(
            validate_transfer_stage(
                Stage::ReceivedByDistributor,
                Stage::ShippedToDistributor,
                StakeholderKind::Distributor
            ),
            Err(LifecycleError::InvalidStageTransition { .. })
        ));
    }

    #[test]
    fn test_farmer_never_receives() {
        assert!(recipient_window(StakeholderKind::Farmer).is_none());
        assert!(matches!(
            validate_transfer_stage(Stage::Planted, Stage::Growing, StakeholderKind::Farmer),
            Err(LifecycleError::UnauthorizedStageTransition { .. })
        ));
    }

    #[test]
    fn test_transfer_window_keyed_to_recipient() {
        assert!(validate_transfer_stage(
            Stage::Planted,
            Stage::ShippedToDistributor,
            StakeholderKind::Distributor
        )
        .is_ok());
        assert!(matches!(
            validate_transfer_stage(
                Stage::Planted,
                Stage::ShippedToDistributor,
                StakeholderKind::Retailer
            ),
            Err(LifecycleError::UnauthorizedStageTransition { .. })
        ));
    }
}
