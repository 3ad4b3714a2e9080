//! Claims application service
//!
//! `ClaimService` orchestrates the engine against the ports: it loads the
//! claim, resolves the client's `bypass_hr_review` flag when the action
//! needs it, runs [`apply_transition`], and commits claim + log as one
//! atomic unit. It also owns the create-with-reference retry policy.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::{info, warn};

use core_kernel::{ClaimId, MemberId, Money};

use crate::actor::{Actor, Permission};
use crate::attachment::ClaimAttachment;
use crate::claim::{Claim, NewClaim};
use crate::comment::{ClaimComment, CommentVisibility};
use crate::engine::{apply_transition, TransitionPayload};
use crate::error::ClaimError;
use crate::log::ClaimStatusLog;
use crate::ports::{ClaimStore, ClientSettings, MemberDirectory, BYPASS_HR_REVIEW};
use crate::status::ClaimAction;
use crate::transition::{legal_actions, spec_for};

/// Result of a successful transition: the updated claim and its log row
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub claim: Claim,
    pub log: ClaimStatusLog,
}

/// Application service for the claims lifecycle
#[derive(Clone)]
pub struct ClaimService {
    store: Arc<dyn ClaimStore>,
    members: Arc<dyn MemberDirectory>,
    settings: Arc<dyn ClientSettings>,
}

impl ClaimService {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        members: Arc<dyn MemberDirectory>,
        settings: Arc<dyn ClientSettings>,
    ) -> Self {
        Self {
            store,
            members,
            settings,
        }
    }

    /// Creates a draft claim, allocating its `CLM-<year>-NNNNN` reference
    ///
    /// A reference collision (two creations racing in the same year) is
    /// retried once; a second collision is surfaced as fatal.
    pub async fn create_claim(&self, new: NewClaim, actor: &Actor) -> Result<Claim, ClaimError> {
        if !actor.has(Permission::CanSubmitClaim) {
            return Err(ClaimError::PermissionDenied {
                operation: "create_claim",
                permission: Permission::CanSubmitClaim,
            });
        }
        // Validates the member exists before touching the reference sequence.
        self.members.client_of(new.member_id).await?;

        match self.store.create_claim(&new).await {
            Ok(claim) => {
                info!(claim = %claim.claim_reference, member = %claim.member_id, "claim created");
                Ok(claim)
            }
            Err(err) if err.is_conflict() => {
                warn!(year = Utc::now().year(), "claim reference collision, retrying once");
                match self.store.create_claim(&new).await {
                    Ok(claim) => {
                        info!(claim = %claim.claim_reference, "claim created on retry");
                        Ok(claim)
                    }
                    Err(err) if err.is_conflict() => Err(ClaimError::ReferenceCollision),
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Applies a transition action to a claim
    pub async fn apply(
        &self,
        claim_id: ClaimId,
        action: ClaimAction,
        actor: &Actor,
        payload: TransitionPayload,
    ) -> Result<TransitionOutcome, ClaimError> {
        let mut claim = self.store.get_claim(claim_id).await?;

        // The bypass flag is only consulted by the condition-gated submit
        // actions; skip the directory round-trip otherwise.
        let bypass_hr_review = if spec_for(action).condition.is_some() {
            self.bypass_hr_review(claim.member_id).await?
        } else {
            false
        };

        let log = apply_transition(&mut claim, action, actor, bypass_hr_review, payload)?;

        self.store
            .commit_transition(&claim, &log)
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    // A concurrent transition won the compare-and-swap; this
                    // request's source status is no longer current.
                    ClaimError::illegal(
                        action,
                        log.from_status,
                        "claim was transitioned concurrently",
                    )
                } else {
                    err.into()
                }
            })?;

        Ok(TransitionOutcome { claim, log })
    }

    /// Submits a draft (or returned) claim, dispatching to `submit_to_hr`
    /// or `submit_direct_to_broker` per the client's bypass configuration
    ///
    /// The two actions' conditions are logical negations of one flag, so
    /// exactly one of them can be legal.
    pub async fn submit(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        let claim = self.store.get_claim(claim_id).await?;
        let action = if self.bypass_hr_review(claim.member_id).await? {
            ClaimAction::SubmitDirectToBroker
        } else {
            ClaimAction::SubmitToHr
        };
        self.apply(claim_id, action, actor, TransitionPayload::none())
            .await
    }

    pub async fn submit_to_hr(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(claim_id, ClaimAction::SubmitToHr, actor, TransitionPayload::none())
            .await
    }

    pub async fn submit_direct_to_broker(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::SubmitDirectToBroker,
            actor,
            TransitionPayload::none(),
        )
        .await
    }

    pub async fn hr_approve(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(claim_id, ClaimAction::HrApprove, actor, TransitionPayload::none())
            .await
    }

    pub async fn hr_return(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::HrReturn,
            actor,
            TransitionPayload::with_reason(reason),
        )
        .await
    }

    pub async fn broker_start_process(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::BrokerStartProcess,
            actor,
            TransitionPayload::none(),
        )
        .await
    }

    pub async fn broker_return(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::BrokerReturn,
            actor,
            TransitionPayload::with_reason(reason),
        )
        .await
    }

    pub async fn send_to_insurance(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::SentToInsurance,
            actor,
            TransitionPayload::none(),
        )
        .await
    }

    pub async fn insurance_query(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::InsuranceQuery,
            actor,
            TransitionPayload::none(),
        )
        .await
    }

    pub async fn answer_insurance_query(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::AnswerInsuranceQuery,
            actor,
            TransitionPayload::none(),
        )
        .await
    }

    pub async fn insurance_approve(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::InsuranceApprove,
            actor,
            TransitionPayload::none(),
        )
        .await
    }

    pub async fn insurance_reject(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::InsuranceReject,
            actor,
            TransitionPayload::with_reason(reason),
        )
        .await
    }

    pub async fn mark_as_paid(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
        approved_amount_sar: Money,
    ) -> Result<TransitionOutcome, ClaimError> {
        self.apply(
            claim_id,
            ClaimAction::MarkAsPaid,
            actor,
            TransitionPayload::with_approved_amount(approved_amount_sar),
        )
        .await
    }

    /// Retrieves a claim, visible to its owning member and staff
    pub async fn get_claim(&self, claim_id: ClaimId, actor: &Actor) -> Result<Claim, ClaimError> {
        let claim = self.store.get_claim(claim_id).await?;
        self.ensure_can_view(claim.member_id, actor).await?;
        Ok(claim)
    }

    /// All claims of a member, newest first
    pub async fn claims_for_member(
        &self,
        member_id: MemberId,
        actor: &Actor,
    ) -> Result<Vec<Claim>, ClaimError> {
        self.ensure_can_view(member_id, actor).await?;
        Ok(self.store.claims_for_member(member_id).await?)
    }

    /// The transition log of a claim, oldest first
    pub async fn status_log(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<Vec<ClaimStatusLog>, ClaimError> {
        let claim = self.store.get_claim(claim_id).await?;
        self.ensure_can_view(claim.member_id, actor).await?;
        Ok(self.store.status_log(claim_id).await?)
    }

    /// Actions currently available on a claim for the client's configuration
    pub async fn available_actions(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<Vec<ClaimAction>, ClaimError> {
        let claim = self.store.get_claim(claim_id).await?;
        self.ensure_can_view(claim.member_id, actor).await?;
        let bypass = self.bypass_hr_review(claim.member_id).await?;
        Ok(legal_actions(claim.status, bypass))
    }

    /// Adds a comment to a claim's thread
    pub async fn add_comment(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
        message: impl Into<String>,
        visibility: CommentVisibility,
    ) -> Result<ClaimComment, ClaimError> {
        if visibility == CommentVisibility::Internal && !actor.can_view_internal() {
            return Err(ClaimError::PermissionDenied {
                operation: "add_internal_comment",
                permission: Permission::CanViewAllClaims,
            });
        }
        let claim = self.store.get_claim(claim_id).await?;
        self.ensure_can_view(claim.member_id, actor).await?;
        let comment = ClaimComment::new(claim.id, actor.user_id, message, visibility);
        self.store.add_comment(&comment).await?;
        Ok(comment)
    }

    /// Comments on a claim; internal comments are filtered out for actors
    /// without staff visibility
    pub async fn comments(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<Vec<ClaimComment>, ClaimError> {
        let claim = self.store.get_claim(claim_id).await?;
        self.ensure_can_view(claim.member_id, actor).await?;
        Ok(self
            .store
            .comments(claim_id, actor.can_view_internal())
            .await?)
    }

    /// Records an attachment on a claim
    pub async fn add_attachment(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
        file_name: impl Into<String>,
        description: Option<String>,
    ) -> Result<ClaimAttachment, ClaimError> {
        let claim = self.store.get_claim(claim_id).await?;
        self.ensure_can_view(claim.member_id, actor).await?;
        let attachment = ClaimAttachment::new(claim.id, actor.user_id, file_name, description);
        self.store.add_attachment(&attachment).await?;
        Ok(attachment)
    }

    /// Attachments of a claim, oldest first
    pub async fn attachments(
        &self,
        claim_id: ClaimId,
        actor: &Actor,
    ) -> Result<Vec<ClaimAttachment>, ClaimError> {
        let claim = self.store.get_claim(claim_id).await?;
        self.ensure_can_view(claim.member_id, actor).await?;
        Ok(self.store.attachments(claim_id).await?)
    }

    /// Claims are visible to staff holding `can_view_all_claims` and to
    /// the member who owns them; everyone else is denied.
    async fn ensure_can_view(&self, member_id: MemberId, actor: &Actor) -> Result<(), ClaimError> {
        if actor.has(Permission::CanViewAllClaims) {
            return Ok(());
        }
        if self.members.member_of(actor.user_id).await? == Some(member_id) {
            return Ok(());
        }
        Err(ClaimError::PermissionDenied {
            operation: "view_claim",
            permission: Permission::CanViewAllClaims,
        })
    }

    async fn bypass_hr_review(&self, member_id: MemberId) -> Result<bool, ClaimError> {
        let client_id = self.members.client_of(member_id).await?;
        Ok(self
            .settings
            .claim_setting_bool(client_id, BYPASS_HR_REVIEW, false)
            .await?)
    }
}
