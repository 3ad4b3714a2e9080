//! End-to-end service tests over the in-memory adapters

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, MemberId, Money};
use domain_claims::{
    Actor, ClaimAction, ClaimError, ClaimService, ClaimStatus, CommentVisibility,
    BYPASS_HR_REVIEW,
};
use infra_db::{InMemoryClaimStore, InMemoryClientSettings, InMemoryMemberDirectory};
use test_utils::{assert_claim_status, assert_log_chain, ActorFixtures, NewClaimBuilder};

struct Harness {
    service: ClaimService,
    store: Arc<InMemoryClaimStore>,
    directory: Arc<InMemoryMemberDirectory>,
    settings: Arc<InMemoryClientSettings>,
    /// Acting user linked to `member_id` in the directory
    member: Actor,
    member_id: MemberId,
    client_id: ClientId,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryClaimStore::new());
    let directory = Arc::new(InMemoryMemberDirectory::new());
    let settings = Arc::new(InMemoryClientSettings::new());
    let member = ActorFixtures::member();
    let member_id = MemberId::new();
    let client_id = ClientId::new();
    directory.register(member_id, client_id);
    directory.link_user(member.user_id, member_id);

    Harness {
        service: ClaimService::new(store.clone(), directory.clone(), settings.clone()),
        store,
        directory,
        settings,
        member,
        member_id,
        client_id,
    }
}

#[tokio::test]
async fn test_full_lifecycle_with_hr_review() {
    let h = harness();
    let member = h.member.clone();
    let hr = ActorFixtures::hr_officer();
    let broker = ActorFixtures::broker_agent();
    let finance = ActorFixtures::finance_officer();

    let new = NewClaimBuilder::new()
        .with_member(h.member_id)
        .with_amount(Money::new(dec!(1850.00), Currency::SAR))
        .build();
    let claim = h.service.create_claim(new, &member).await.unwrap();
    assert_claim_status(&claim, ClaimStatus::Draft);

    let id = claim.id;
    h.service.submit(id, &member).await.unwrap();
    h.service.hr_approve(id, &hr).await.unwrap();
    h.service.broker_start_process(id, &broker).await.unwrap();
    h.service.send_to_insurance(id, &broker).await.unwrap();
    h.service.insurance_approve(id, &broker).await.unwrap();
    let outcome = h
        .service
        .mark_as_paid(id, &finance, Money::new(dec!(1500.00), Currency::SAR))
        .await
        .unwrap();

    assert_claim_status(&outcome.claim, ClaimStatus::Paid);
    assert_eq!(
        outcome.claim.approved_amount_sar,
        Some(Money::new(dec!(1500.00), Currency::SAR))
    );

    let logs = h.service.status_log(id, &member).await.unwrap();
    assert_eq!(logs.len(), 6);
    assert_log_chain(&logs, ClaimStatus::Draft);
}

#[tokio::test]
async fn test_submit_dispatches_on_bypass_flag() {
    let h = harness();
    let member = h.member.clone();

    // Review required: submit lands at HR.
    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();
    let outcome = h.service.submit(claim.id, &member).await.unwrap();
    assert_claim_status(&outcome.claim, ClaimStatus::SubmittedToHr);

    // Bypass configured: submit skips HR entirely.
    h.settings.set_bool(h.client_id, BYPASS_HR_REVIEW, true);
    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();
    let outcome = h.service.submit(claim.id, &member).await.unwrap();
    assert_claim_status(&outcome.claim, ClaimStatus::SubmittedToBroker);
}

#[tokio::test]
async fn test_explicit_submit_to_hr_fails_for_bypass_client() {
    let h = harness();
    h.settings.set_bool(h.client_id, BYPASS_HR_REVIEW, true);
    let member = h.member.clone();

    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();

    let err = h.service.submit_to_hr(claim.id, &member).await.unwrap_err();
    assert!(matches!(err, ClaimError::IllegalTransition { .. }));
    assert_claim_status(
        &h.service.get_claim(claim.id, &member).await.unwrap(),
        ClaimStatus::Draft,
    );
}

#[tokio::test]
async fn test_hr_return_and_resubmission() {
    let h = harness();
    let member = h.member.clone();
    let hr = ActorFixtures::hr_officer();

    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();
    h.service.submit(claim.id, &member).await.unwrap();

    let outcome = h
        .service
        .hr_return(claim.id, &hr, "missing lab report")
        .await
        .unwrap();
    assert_claim_status(&outcome.claim, ClaimStatus::ReturnedByHr);
    assert_eq!(
        outcome.claim.rejection_reason.as_deref(),
        Some("missing lab report")
    );
    assert_eq!(outcome.log.reason.as_deref(), Some("missing lab report"));

    h.service.submit(claim.id, &member).await.unwrap();
    assert_claim_status(
        &h.service.get_claim(claim.id, &member).await.unwrap(),
        ClaimStatus::SubmittedToHr,
    );
}

#[tokio::test]
async fn test_create_retries_once_on_reference_collision() {
    let h = harness();
    let member = h.member.clone();

    h.store.inject_reference_conflicts(1);
    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();
    assert_eq!(claim.claim_reference.sequence(), 1);

    h.store.inject_reference_conflicts(2);
    let err = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::ReferenceCollision));
}

#[tokio::test]
async fn test_create_requires_known_member_and_permission() {
    let h = harness();

    let err = h
        .service
        .create_claim(
            NewClaimBuilder::new().with_member(h.member_id).build(),
            &ActorFixtures::stranger(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::PermissionDenied { .. }));

    let err = h
        .service
        .create_claim(
            NewClaimBuilder::new().with_member(MemberId::new()).build(),
            &h.member,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::NotFound(_)));
}

#[tokio::test]
async fn test_claim_reads_scoped_to_owner_or_staff() {
    let h = harness();
    let owner = h.member.clone();

    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &owner)
        .await
        .unwrap();

    // Another client's member holds the same submit permission but owns a
    // different member record; none of the read surfaces open up.
    let other = ActorFixtures::member();
    let other_member_id = MemberId::new();
    h.directory.register(other_member_id, ClientId::new());
    h.directory.link_user(other.user_id, other_member_id);

    let err = h.service.get_claim(claim.id, &other).await.unwrap_err();
    assert!(matches!(err, ClaimError::PermissionDenied { .. }));
    let err = h
        .service
        .claims_for_member(h.member_id, &other)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::PermissionDenied { .. }));
    let err = h.service.status_log(claim.id, &other).await.unwrap_err();
    assert!(matches!(err, ClaimError::PermissionDenied { .. }));
    let err = h.service.attachments(claim.id, &other).await.unwrap_err();
    assert!(matches!(err, ClaimError::PermissionDenied { .. }));

    // The owner sees their own claim; staff visibility covers everything.
    assert_eq!(
        h.service.get_claim(claim.id, &owner).await.unwrap().id,
        claim.id
    );
    let staff = ActorFixtures::hr_officer();
    assert_eq!(
        h.service
            .claims_for_member(h.member_id, &staff)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_available_actions_track_status_and_config() {
    let h = harness();
    let member = h.member.clone();

    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();
    assert_eq!(
        h.service.available_actions(claim.id, &member).await.unwrap(),
        vec![ClaimAction::SubmitToHr]
    );

    h.settings.set_bool(h.client_id, BYPASS_HR_REVIEW, true);
    assert_eq!(
        h.service.available_actions(claim.id, &member).await.unwrap(),
        vec![ClaimAction::SubmitDirectToBroker]
    );
}

#[tokio::test]
async fn test_internal_comments_gated_both_ways() {
    let h = harness();
    let member = h.member.clone();
    let hr = ActorFixtures::hr_officer();

    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();

    // A member cannot write internal comments.
    let err = h
        .service
        .add_comment(claim.id, &member, "note", CommentVisibility::Internal)
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimError::PermissionDenied { .. }));

    h.service
        .add_comment(claim.id, &member, "receipts attached", CommentVisibility::General)
        .await
        .unwrap();
    h.service
        .add_comment(claim.id, &hr, "verify amounts", CommentVisibility::Internal)
        .await
        .unwrap();

    // Nor read them back.
    let member_view = h.service.comments(claim.id, &member).await.unwrap();
    assert_eq!(member_view.len(), 1);
    assert_eq!(member_view[0].message, "receipts attached");

    let staff_view = h.service.comments(claim.id, &hr).await.unwrap();
    assert_eq!(staff_view.len(), 2);
}

#[tokio::test]
async fn test_attachments_recorded_against_claim() {
    let h = harness();
    let member = h.member.clone();

    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();

    h.service
        .add_attachment(claim.id, &member, "invoice.pdf", Some("hospital invoice".into()))
        .await
        .unwrap();
    h.service
        .add_attachment(claim.id, &member, "lab-report.pdf", None)
        .await
        .unwrap();

    let attachments = h.service.attachments(claim.id, &member).await.unwrap();
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0].file_name, "invoice.pdf");
    assert_eq!(attachments[0].uploaded_by, member.user_id);
}

#[tokio::test]
async fn test_concurrent_transition_loses_cleanly() {
    let h = harness();
    let member = h.member.clone();
    let hr = ActorFixtures::hr_officer();

    let claim = h
        .service
        .create_claim(NewClaimBuilder::new().with_member(h.member_id).build(), &member)
        .await
        .unwrap();
    h.service.submit(claim.id, &member).await.unwrap();

    // First reviewer approves; a second racing approval must fail and
    // leave exactly the two log rows.
    h.service.hr_approve(claim.id, &hr).await.unwrap();
    let err = h.service.hr_approve(claim.id, &hr).await.unwrap_err();
    assert!(matches!(err, ClaimError::IllegalTransition { .. }));

    let logs = h.service.status_log(claim.id, &hr).await.unwrap();
    assert_eq!(logs.len(), 2);
}
