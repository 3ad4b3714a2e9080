//! Tests for the transition engine against the full lifecycle table

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, MemberId, Money, UserId};

use domain_claims::claim::{Claim, NewClaim};
use domain_claims::engine::{apply_transition, TransitionPayload};
use domain_claims::error::ClaimError;
use domain_claims::reference::ClaimReference;
use domain_claims::status::{ClaimAction, ClaimStatus};
use domain_claims::transition::{legal_actions, spec_for};
use domain_claims::{Actor, Permission};

fn draft_claim() -> Claim {
    let reference = ClaimReference::new(2025, 1).unwrap();
    Claim::draft(
        reference,
        &NewClaim {
            member_id: MemberId::new(),
            service_date: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            amount_original: Money::new(dec!(850.00), Currency::SAR),
            is_in_patient: false,
            is_international: false,
            admin_notes: None,
        },
    )
}

fn member() -> Actor {
    Actor::new(UserId::new(), [Permission::CanSubmitClaim])
}

fn hr() -> Actor {
    Actor::new(
        UserId::new(),
        [Permission::CanApproveHr, Permission::CanRejectHr],
    )
}

fn broker() -> Actor {
    Actor::new(UserId::new(), [Permission::CanProcessBroker])
}

fn finance() -> Actor {
    Actor::new(UserId::new(), [Permission::CanApprovePayment])
}

/// Drives a claim from DRAFT to the given status along the HR path
fn drive_to(claim: &mut Claim, target: ClaimStatus) {
    let steps = [
        (ClaimAction::SubmitToHr, member(), TransitionPayload::none()),
        (ClaimAction::HrApprove, hr(), TransitionPayload::none()),
        (ClaimAction::BrokerStartProcess, broker(), TransitionPayload::none()),
        (ClaimAction::SentToInsurance, broker(), TransitionPayload::none()),
        (ClaimAction::InsuranceApprove, broker(), TransitionPayload::none()),
        (
            ClaimAction::MarkAsPaid,
            finance(),
            TransitionPayload::with_approved_amount(Money::new(dec!(800.00), Currency::SAR)),
        ),
    ];
    for (action, actor, payload) in steps {
        if claim.status == target {
            return;
        }
        apply_transition(claim, action, &actor, false, payload).unwrap();
    }
    assert_eq!(claim.status, target, "could not drive claim to {target}");
}

mod submission {
    use super::*;

    #[test]
    fn test_submit_to_hr_when_client_requires_review() {
        // Scenario: bypass_hr_review=false, DRAFT -> SUBMITTED_TO_HR
        let mut claim = draft_claim();
        let log =
            apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), false, TransitionPayload::none())
                .unwrap();

        assert_eq!(claim.status, ClaimStatus::SubmittedToHr);
        assert_eq!(log.from_status, ClaimStatus::Draft);
        assert_eq!(log.to_status, ClaimStatus::SubmittedToHr);
        assert_eq!(log.action, ClaimAction::SubmitToHr);
        assert_eq!(log.claim_id, claim.id);
    }

    #[test]
    fn test_submit_to_hr_rejected_when_client_bypasses() {
        let mut claim = draft_claim();
        let err =
            apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), true, TransitionPayload::none())
                .unwrap_err();

        assert!(matches!(err, ClaimError::IllegalTransition { .. }));
        assert_eq!(claim.status, ClaimStatus::Draft);
    }

    #[test]
    fn test_submit_direct_to_broker_when_client_bypasses() {
        // Scenario: bypass_hr_review=true, DRAFT -> SUBMITTED_TO_BROKER
        let mut claim = draft_claim();
        let log = apply_transition(
            &mut claim,
            ClaimAction::SubmitDirectToBroker,
            &member(),
            true,
            TransitionPayload::none(),
        )
        .unwrap();

        assert_eq!(claim.status, ClaimStatus::SubmittedToBroker);
        assert_eq!(log.action, ClaimAction::SubmitDirectToBroker);
    }

    #[test]
    fn test_submit_direct_rejected_without_bypass() {
        let mut claim = draft_claim();
        let err = apply_transition(
            &mut claim,
            ClaimAction::SubmitDirectToBroker,
            &member(),
            false,
            TransitionPayload::none(),
        )
        .unwrap_err();

        assert!(matches!(err, ClaimError::IllegalTransition { .. }));
        assert_eq!(claim.status, ClaimStatus::Draft);
    }

    #[test]
    fn test_resubmission_after_hr_return() {
        let mut claim = draft_claim();
        apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), false, TransitionPayload::none())
            .unwrap();
        apply_transition(
            &mut claim,
            ClaimAction::HrReturn,
            &hr(),
            false,
            TransitionPayload::with_reason("missing lab report"),
        )
        .unwrap();
        assert_eq!(claim.status, ClaimStatus::ReturnedByHr);

        apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), false, TransitionPayload::none())
            .unwrap();
        assert_eq!(claim.status, ClaimStatus::SubmittedToHr);
    }
}

mod side_effects {
    use super::*;

    #[test]
    fn test_hr_return_records_reason() {
        // Scenario: hr_return(reason="missing lab report")
        let mut claim = draft_claim();
        apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), false, TransitionPayload::none())
            .unwrap();

        let log = apply_transition(
            &mut claim,
            ClaimAction::HrReturn,
            &hr(),
            false,
            TransitionPayload::with_reason("missing lab report"),
        )
        .unwrap();

        assert_eq!(claim.status, ClaimStatus::ReturnedByHr);
        assert_eq!(claim.rejection_reason.as_deref(), Some("missing lab report"));
        assert_eq!(log.reason.as_deref(), Some("missing lab report"));
    }

    #[test]
    fn test_return_without_reason_is_rejected() {
        let mut claim = draft_claim();
        apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), false, TransitionPayload::none())
            .unwrap();

        let err = apply_transition(
            &mut claim,
            ClaimAction::HrReturn,
            &hr(),
            false,
            TransitionPayload::none(),
        )
        .unwrap_err();

        assert!(matches!(err, ClaimError::InvalidPayload { .. }));
        assert_eq!(claim.status, ClaimStatus::SubmittedToHr);
        assert!(claim.rejection_reason.is_none());
    }

    #[test]
    fn test_blank_reason_is_rejected() {
        let mut claim = draft_claim();
        apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), false, TransitionPayload::none())
            .unwrap();

        let err = apply_transition(
            &mut claim,
            ClaimAction::HrReturn,
            &hr(),
            false,
            TransitionPayload::with_reason("   "),
        )
        .unwrap_err();

        assert!(matches!(err, ClaimError::InvalidPayload { .. }));
    }

    #[test]
    fn test_mark_as_paid_records_approved_amount() {
        // Scenario: APPROVED_BY_INSURANCE -> mark_as_paid(1500.00 SAR)
        let mut claim = draft_claim();
        drive_to(&mut claim, ClaimStatus::ApprovedByInsurance);

        let log = apply_transition(
            &mut claim,
            ClaimAction::MarkAsPaid,
            &finance(),
            false,
            TransitionPayload::with_approved_amount(Money::new(dec!(1500.00), Currency::SAR)),
        )
        .unwrap();

        assert_eq!(claim.status, ClaimStatus::Paid);
        assert_eq!(
            claim.approved_amount_sar,
            Some(Money::new(dec!(1500.00), Currency::SAR))
        );
        assert_eq!(log.to_status, ClaimStatus::Paid);
    }

    #[test]
    fn test_mark_as_paid_requires_sar() {
        let mut claim = draft_claim();
        drive_to(&mut claim, ClaimStatus::ApprovedByInsurance);

        let err = apply_transition(
            &mut claim,
            ClaimAction::MarkAsPaid,
            &finance(),
            false,
            TransitionPayload::with_approved_amount(Money::new(dec!(400.00), Currency::USD)),
        )
        .unwrap_err();

        assert!(matches!(err, ClaimError::InvalidPayload { .. }));
        assert_eq!(claim.status, ClaimStatus::ApprovedByInsurance);
        assert!(claim.approved_amount_sar.is_none());
    }

    #[test]
    fn test_mark_as_paid_requires_positive_amount() {
        let mut claim = draft_claim();
        drive_to(&mut claim, ClaimStatus::ApprovedByInsurance);

        let err = apply_transition(
            &mut claim,
            ClaimAction::MarkAsPaid,
            &finance(),
            false,
            TransitionPayload::with_approved_amount(Money::zero(Currency::SAR)),
        )
        .unwrap_err();

        assert!(matches!(err, ClaimError::InvalidPayload { .. }));
    }

    #[test]
    fn test_insurance_reject_records_reason_and_terminates() {
        let mut claim = draft_claim();
        drive_to(&mut claim, ClaimStatus::SentToInsurance);

        apply_transition(
            &mut claim,
            ClaimAction::InsuranceReject,
            &broker(),
            false,
            TransitionPayload::with_reason("not covered under policy"),
        )
        .unwrap();

        assert_eq!(claim.status, ClaimStatus::RejectedByInsurance);
        assert!(claim.is_settled());
        assert_eq!(
            claim.rejection_reason.as_deref(),
            Some("not covered under policy")
        );
        assert!(legal_actions(claim.status, false).is_empty());
    }
}

mod permissions {
    use super::*;

    #[test]
    fn test_member_cannot_hr_approve() {
        let mut claim = draft_claim();
        apply_transition(&mut claim, ClaimAction::SubmitToHr, &member(), false, TransitionPayload::none())
            .unwrap();

        let err =
            apply_transition(&mut claim, ClaimAction::HrApprove, &member(), false, TransitionPayload::none())
                .unwrap_err();

        assert!(matches!(
            err,
            ClaimError::PermissionDenied {
                permission: Permission::CanApproveHr,
                ..
            }
        ));
        assert_eq!(claim.status, ClaimStatus::SubmittedToHr);
    }

    #[test]
    fn test_broker_cannot_mark_as_paid() {
        let mut claim = draft_claim();
        drive_to(&mut claim, ClaimStatus::ApprovedByInsurance);

        let err = apply_transition(
            &mut claim,
            ClaimAction::MarkAsPaid,
            &broker(),
            false,
            TransitionPayload::with_approved_amount(Money::new(dec!(100.00), Currency::SAR)),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ClaimError::PermissionDenied {
                permission: Permission::CanApprovePayment,
                ..
            }
        ));
    }

    #[test]
    fn test_every_action_denied_without_its_permission() {
        for action in ClaimAction::ALL {
            let spec = spec_for(action);
            let mut claim = draft_claim();
            // Park the claim in a legal source so only the permission fails.
            claim.status = spec.sources[0];
            let nobody = Actor::without_permissions(UserId::new());

            let err = apply_transition(
                &mut claim,
                action,
                &nobody,
                true,
                TransitionPayload::with_reason("x"),
            )
            .unwrap_err();

            assert!(
                matches!(err, ClaimError::PermissionDenied { .. }),
                "{action} did not check permission"
            );
            assert_eq!(claim.status, spec.sources[0]);
        }
    }
}

mod illegal_transitions {
    use super::*;

    #[test]
    fn test_illegal_action_leaves_claim_unchanged() {
        for status in ClaimStatus::ALL {
            for action in ClaimAction::ALL {
                let spec = spec_for(action);
                if spec.allows_source(status) {
                    continue;
                }
                let mut claim = draft_claim();
                claim.status = status;
                let before = claim.clone();
                let actor = Actor::new(UserId::new(), Permission::ALL);

                let err = apply_transition(
                    &mut claim,
                    action,
                    &actor,
                    false,
                    TransitionPayload::with_reason("x"),
                )
                .unwrap_err();

                assert!(
                    matches!(err, ClaimError::IllegalTransition { .. }),
                    "{action} from {status} was not rejected"
                );
                assert_eq!(claim, before, "{action} from {status} mutated the claim");
            }
        }
    }

    #[test]
    fn test_no_skipping_intermediate_states() {
        let mut claim = draft_claim();
        let actor = Actor::new(UserId::new(), Permission::ALL);

        // DRAFT straight to broker processing is not in the table.
        let err = apply_transition(
            &mut claim,
            ClaimAction::BrokerStartProcess,
            &actor,
            false,
            TransitionPayload::none(),
        )
        .unwrap_err();
        assert!(matches!(err, ClaimError::IllegalTransition { .. }));

        // Nor is paying before insurer approval.
        let err = apply_transition(
            &mut claim,
            ClaimAction::MarkAsPaid,
            &actor,
            false,
            TransitionPayload::with_approved_amount(Money::new(dec!(1.00), Currency::SAR)),
        )
        .unwrap_err();
        assert!(matches!(err, ClaimError::IllegalTransition { .. }));
    }

    #[test]
    fn test_paid_is_terminal() {
        let mut claim = draft_claim();
        drive_to(&mut claim, ClaimStatus::Paid);
        let actor = Actor::new(UserId::new(), Permission::ALL);

        for action in ClaimAction::ALL {
            let before = claim.clone();
            let result = apply_transition(
                &mut claim,
                action,
                &actor,
                true,
                TransitionPayload::with_reason("x"),
            );
            assert!(result.is_err(), "{action} succeeded on a PAID claim");
            assert_eq!(claim, before);
        }
    }
}

mod full_lifecycle {
    use super::*;

    #[test]
    fn test_happy_path_through_query_loop() {
        let mut claim = draft_claim();
        let mut logs = Vec::new();

        let steps: Vec<(ClaimAction, Actor, TransitionPayload)> = vec![
            (ClaimAction::SubmitToHr, member(), TransitionPayload::none()),
            (ClaimAction::HrApprove, hr(), TransitionPayload::none()),
            (ClaimAction::BrokerStartProcess, broker(), TransitionPayload::none()),
            (ClaimAction::SentToInsurance, broker(), TransitionPayload::none()),
            (ClaimAction::InsuranceQuery, broker(), TransitionPayload::none()),
            (ClaimAction::AnswerInsuranceQuery, broker(), TransitionPayload::none()),
            (ClaimAction::InsuranceApprove, broker(), TransitionPayload::none()),
            (
                ClaimAction::MarkAsPaid,
                finance(),
                TransitionPayload::with_approved_amount(Money::new(dec!(612.50), Currency::SAR)),
            ),
        ];

        for (action, actor, payload) in steps {
            logs.push(apply_transition(&mut claim, action, &actor, false, payload).unwrap());
        }

        assert_eq!(claim.status, ClaimStatus::Paid);
        assert_eq!(logs.len(), 8);
        // The log chain is contiguous: each row starts where the last ended.
        for pair in logs.windows(2) {
            assert_eq!(pair[0].to_status, pair[1].from_status);
        }
        assert_eq!(logs[0].from_status, ClaimStatus::Draft);
        assert_eq!(logs[7].to_status, ClaimStatus::Paid);
    }

    #[test]
    fn test_broker_return_loop_for_bypass_client() {
        let mut claim = draft_claim();

        apply_transition(
            &mut claim,
            ClaimAction::SubmitDirectToBroker,
            &member(),
            true,
            TransitionPayload::none(),
        )
        .unwrap();
        apply_transition(&mut claim, ClaimAction::BrokerStartProcess, &broker(), true, TransitionPayload::none())
            .unwrap();
        apply_transition(
            &mut claim,
            ClaimAction::BrokerReturn,
            &broker(),
            true,
            TransitionPayload::with_reason("invoice unreadable"),
        )
        .unwrap();
        assert_eq!(claim.status, ClaimStatus::ReturnedByBroker);

        apply_transition(
            &mut claim,
            ClaimAction::SubmitDirectToBroker,
            &member(),
            true,
            TransitionPayload::none(),
        )
        .unwrap();
        assert_eq!(claim.status, ClaimStatus::SubmittedToBroker);
    }
}
