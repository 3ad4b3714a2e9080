//! The declarative transition table
//!
//! Each lifecycle action is described by a [`TransitionSpec`]: its legal
//! source statuses, the target status, the permission required of the
//! actor, and an optional business condition evaluated against the client's
//! `bypass_hr_review` configuration. The engine in [`crate::engine`] is the
//! only interpreter of this table.

use crate::actor::Permission;
use crate::status::{ClaimAction, ClaimStatus};

/// Business condition gating a transition
///
/// Both variants read the same client flag, with opposite polarity, so the
/// two submit actions can never be legal for the same claim at the same
/// time. Keep that exclusivity when adding bypass logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The client company reviews claims in-house first
    /// (`bypass_hr_review` is false)
    NeedsHrReview,
    /// The client company skips HR review (`bypass_hr_review` is true)
    CanBypassHr,
}

impl Condition {
    /// Evaluates the condition against the client's `bypass_hr_review` flag
    pub fn holds(&self, bypass_hr_review: bool) -> bool {
        match self {
            Condition::NeedsHrReview => !bypass_hr_review,
            Condition::CanBypassHr => bypass_hr_review,
        }
    }

    /// Human-readable description used in rejection messages
    pub fn describe(&self) -> &'static str {
        match self {
            Condition::NeedsHrReview => "client requires HR review",
            Condition::CanBypassHr => "client allows bypassing HR review",
        }
    }
}

/// One row of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionSpec {
    pub action: ClaimAction,
    pub sources: &'static [ClaimStatus],
    pub target: ClaimStatus,
    pub permission: Permission,
    pub condition: Option<Condition>,
}

impl TransitionSpec {
    /// True if the claim's current status is a legal source
    pub fn allows_source(&self, status: ClaimStatus) -> bool {
        self.sources.contains(&status)
    }
}

/// Returns the table row for an action
pub fn spec_for(action: ClaimAction) -> TransitionSpec {
    use ClaimStatus::*;
    use Permission::*;

    match action {
        ClaimAction::SubmitToHr => TransitionSpec {
            action,
            sources: &[Draft, ReturnedByHr],
            target: SubmittedToHr,
            permission: CanSubmitClaim,
            condition: Some(Condition::NeedsHrReview),
        },
        ClaimAction::SubmitDirectToBroker => TransitionSpec {
            action,
            sources: &[Draft, ReturnedByHr, ReturnedByBroker],
            target: SubmittedToBroker,
            permission: CanSubmitClaim,
            condition: Some(Condition::CanBypassHr),
        },
        ClaimAction::HrApprove => TransitionSpec {
            action,
            sources: &[SubmittedToHr],
            target: SubmittedToBroker,
            permission: CanApproveHr,
            condition: None,
        },
        ClaimAction::HrReturn => TransitionSpec {
            action,
            sources: &[SubmittedToHr],
            target: ReturnedByHr,
            permission: CanRejectHr,
            condition: None,
        },
        ClaimAction::BrokerStartProcess => TransitionSpec {
            action,
            sources: &[SubmittedToBroker],
            target: BrokerProcessing,
            permission: CanProcessBroker,
            condition: None,
        },
        ClaimAction::BrokerReturn => TransitionSpec {
            action,
            sources: &[BrokerProcessing],
            target: ReturnedByBroker,
            permission: CanProcessBroker,
            condition: None,
        },
        ClaimAction::SentToInsurance => TransitionSpec {
            action,
            sources: &[BrokerProcessing],
            target: SentToInsurance,
            permission: CanProcessBroker,
            condition: None,
        },
        // The insurer never acts directly on the system; the broker relays
        // insurer queries and decisions, hence the broker permission on the
        // insurer-stage actions.
        ClaimAction::InsuranceQuery => TransitionSpec {
            action,
            sources: &[SentToInsurance],
            target: InsuranceQuery,
            permission: CanProcessBroker,
            condition: None,
        },
        ClaimAction::AnswerInsuranceQuery => TransitionSpec {
            action,
            sources: &[InsuranceQuery],
            target: SentToInsurance,
            permission: CanProcessBroker,
            condition: None,
        },
        ClaimAction::InsuranceApprove => TransitionSpec {
            action,
            sources: &[SentToInsurance],
            target: ApprovedByInsurance,
            permission: CanProcessBroker,
            condition: None,
        },
        ClaimAction::InsuranceReject => TransitionSpec {
            action,
            sources: &[SentToInsurance],
            target: RejectedByInsurance,
            permission: CanProcessBroker,
            condition: None,
        },
        ClaimAction::MarkAsPaid => TransitionSpec {
            action,
            sources: &[ApprovedByInsurance],
            target: Paid,
            permission: CanApprovePayment,
            condition: None,
        },
    }
}

/// Actions whose source set and condition admit a claim in `status` under
/// the given client configuration
///
/// Used by the API layer to advertise available operations; permission
/// checks still happen per call.
pub fn legal_actions(status: ClaimStatus, bypass_hr_review: bool) -> Vec<ClaimAction> {
    ClaimAction::ALL
        .into_iter()
        .filter(|action| {
            let spec = spec_for(*action);
            spec.allows_source(status)
                && spec
                    .condition
                    .map(|c| c.holds(bypass_hr_review))
                    .unwrap_or(true)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses_have_no_outgoing_actions() {
        for status in [ClaimStatus::Paid, ClaimStatus::RejectedByInsurance] {
            for bypass in [false, true] {
                assert!(legal_actions(status, bypass).is_empty());
            }
        }
    }

    #[test]
    fn test_submit_actions_are_mutually_exclusive() {
        for status in ClaimStatus::ALL {
            for bypass in [false, true] {
                let actions = legal_actions(status, bypass);
                let both = actions.contains(&ClaimAction::SubmitToHr)
                    && actions.contains(&ClaimAction::SubmitDirectToBroker);
                assert!(!both, "both submit actions legal in {status} (bypass={bypass})");
            }
        }
    }

    #[test]
    fn test_every_target_is_not_a_source_of_the_same_action() {
        // No self-loops: a transition always moves the claim.
        for action in ClaimAction::ALL {
            let spec = spec_for(action);
            assert!(
                !spec.allows_source(spec.target),
                "{action} loops on {}",
                spec.target
            );
        }
    }

    #[test]
    fn test_draft_actions_depend_on_bypass_flag() {
        assert_eq!(
            legal_actions(ClaimStatus::Draft, false),
            vec![ClaimAction::SubmitToHr]
        );
        assert_eq!(
            legal_actions(ClaimStatus::Draft, true),
            vec![ClaimAction::SubmitDirectToBroker]
        );
    }

    #[test]
    fn test_returned_by_broker_requires_bypass() {
        // A non-bypass client cannot resubmit a broker-returned claim; the
        // table deliberately mirrors the production system here.
        assert!(legal_actions(ClaimStatus::ReturnedByBroker, false).is_empty());
        assert_eq!(
            legal_actions(ClaimStatus::ReturnedByBroker, true),
            vec![ClaimAction::SubmitDirectToBroker]
        );
    }
}
