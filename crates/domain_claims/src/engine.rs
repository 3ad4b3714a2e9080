//! The transition engine
//!
//! [`apply_transition`] is the single dispatcher interpreting the table in
//! [`crate::transition`]. It validates permission, source status, business
//! condition, and payload before touching the claim, so a failed call
//! leaves the claim bit-for-bit unchanged. On success the claim carries its
//! new status and side-effect fields and exactly one log row is returned
//! for the store to persist atomically with the claim.

use chrono::Utc;
use core_kernel::{Currency, Money};
use tracing::debug;

use crate::actor::Actor;
use crate::claim::Claim;
use crate::error::ClaimError;
use crate::log::ClaimStatusLog;
use crate::status::ClaimAction;
use crate::transition::spec_for;

/// Action-specific input carried alongside a transition request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionPayload {
    /// Reason recorded by the returning/rejecting actions
    pub reason: Option<String>,
    /// Settlement amount for `mark_as_paid`, in SAR
    pub approved_amount: Option<Money>,
}

impl TransitionPayload {
    /// Payload for actions without side-effect input
    pub fn none() -> Self {
        Self::default()
    }

    /// Payload carrying a return/rejection reason
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            approved_amount: None,
        }
    }

    /// Payload carrying a settlement amount
    pub fn with_approved_amount(amount: Money) -> Self {
        Self {
            reason: None,
            approved_amount: Some(amount),
        }
    }
}

/// Applies `action` to `claim` on behalf of `actor`
///
/// `bypass_hr_review` is the claim's client configuration flag, supplied by
/// the client-management collaborator (engine treats it as a read-only
/// input). Validation failures occur strictly before any mutation.
pub fn apply_transition(
    claim: &mut Claim,
    action: ClaimAction,
    actor: &Actor,
    bypass_hr_review: bool,
    payload: TransitionPayload,
) -> Result<ClaimStatusLog, ClaimError> {
    let spec = spec_for(action);

    if !actor.has(spec.permission) {
        return Err(ClaimError::PermissionDenied {
            operation: action.as_str(),
            permission: spec.permission,
        });
    }

    if !spec.allows_source(claim.status) {
        return Err(ClaimError::illegal(
            action,
            claim.status,
            format!("status {} is not a legal source", claim.status),
        ));
    }

    if let Some(condition) = spec.condition {
        if !condition.holds(bypass_hr_review) {
            return Err(ClaimError::illegal(
                action,
                claim.status,
                format!("condition not met: {}", condition.describe()),
            ));
        }
    }

    let side_effect = validate_payload(action, &payload)?;

    // Everything checked; mutate and build the single log row.
    let from_status = claim.status;
    match side_effect {
        SideEffect::None => {}
        SideEffect::RejectionReason(reason) => claim.rejection_reason = Some(reason),
        SideEffect::ApprovedAmount(amount) => claim.approved_amount_sar = Some(amount),
    }
    claim.status = spec.target;
    claim.updated_at = Utc::now();

    debug!(
        claim = %claim.claim_reference,
        %action,
        from = %from_status,
        to = %spec.target,
        actor = %actor.user_id,
        "claim transition applied"
    );

    Ok(ClaimStatusLog::record(
        claim.id,
        from_status,
        spec.target,
        action,
        payload.reason,
        actor.user_id,
    ))
}

enum SideEffect {
    None,
    RejectionReason(String),
    ApprovedAmount(Money),
}

fn validate_payload(
    action: ClaimAction,
    payload: &TransitionPayload,
) -> Result<SideEffect, ClaimError> {
    match action {
        ClaimAction::HrReturn | ClaimAction::BrokerReturn | ClaimAction::InsuranceReject => {
            let reason = payload
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ClaimError::invalid_payload(action, "a reason is required"))?;
            Ok(SideEffect::RejectionReason(reason.to_string()))
        }
        ClaimAction::MarkAsPaid => {
            let amount = payload.approved_amount.ok_or_else(|| {
                ClaimError::invalid_payload(action, "an approved amount is required")
            })?;
            if amount.currency() != Currency::SAR {
                return Err(ClaimError::invalid_payload(
                    action,
                    format!("approved amount must be SAR, got {}", amount.currency()),
                ));
            }
            if !amount.is_positive() {
                return Err(ClaimError::invalid_payload(
                    action,
                    "approved amount must be positive",
                ));
            }
            Ok(SideEffect::ApprovedAmount(amount))
        }
        _ => Ok(SideEffect::None),
    }
}
