//! Claims DTOs
//!
//! Wire shapes for the claims routes. Statuses and actions travel as their
//! canonical wire strings; money travels as a decimal amount plus an ISO
//! currency code.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{Currency, Money};
use domain_claims::{
    Claim, ClaimAttachment, ClaimComment, ClaimStatusLog, CommentVisibility, NewClaim,
    TransitionPayload, TransitionOutcome,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateClaimRequest {
    pub member_id: Uuid,
    pub service_date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub is_in_patient: bool,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

impl CreateClaimRequest {
    pub fn into_new_claim(self) -> Result<NewClaim, ApiError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|_| ApiError::Validation(format!("unknown currency '{}'", self.currency)))?;
        Ok(NewClaim {
            member_id: self.member_id.into(),
            service_date: self.service_date,
            amount_original: Money::new(self.amount, currency),
            is_in_patient: self.is_in_patient,
            is_international: self.is_international,
            admin_notes: self.admin_notes,
        })
    }
}

/// Body for the transition routes; all fields optional, each action takes
/// what it needs
#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub approved_amount_sar: Option<Decimal>,
}

impl TransitionRequest {
    pub fn into_payload(self) -> TransitionPayload {
        TransitionPayload {
            reason: self.reason,
            approved_amount: self
                .approved_amount_sar
                .map(|amount| Money::new(amount, Currency::SAR)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub message: String,
    #[serde(default)]
    pub internal: bool,
}

impl CreateCommentRequest {
    pub fn visibility(&self) -> CommentVisibility {
        if self.internal {
            CommentVisibility::Internal
        } else {
            CommentVisibility::General
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAttachmentRequest {
    pub file_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub claim_reference: String,
    pub member_id: Uuid,
    pub status: String,
    pub service_date: NaiveDate,
    pub amount: Decimal,
    pub currency: String,
    pub approved_amount_sar: Option<Decimal>,
    pub is_in_patient: bool,
    pub is_international: bool,
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id.into(),
            claim_reference: claim.claim_reference.to_string(),
            member_id: claim.member_id.into(),
            status: claim.status.as_str().to_string(),
            service_date: claim.service_date,
            amount: claim.amount_original.amount(),
            currency: claim.amount_original.currency().code().to_string(),
            approved_amount_sar: claim.approved_amount_sar.map(|m| m.amount()),
            is_in_patient: claim.is_in_patient,
            is_international: claim.is_international,
            rejection_reason: claim.rejection_reason,
            admin_notes: claim.admin_notes,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub claim: ClaimResponse,
    pub log: StatusLogResponse,
}

impl From<TransitionOutcome> for TransitionResponse {
    fn from(outcome: TransitionOutcome) -> Self {
        Self {
            claim: outcome.claim.into(),
            log: outcome.log.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusLogResponse {
    pub id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub action: String,
    pub reason: Option<String>,
    pub actor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ClaimStatusLog> for StatusLogResponse {
    fn from(log: ClaimStatusLog) -> Self {
        Self {
            id: log.id.into(),
            from_status: log.from_status.as_str().to_string(),
            to_status: log.to_status.as_str().to_string(),
            action: log.action.as_str().to_string(),
            reason: log.reason,
            actor_id: log.actor_id.into(),
            created_at: log.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub message: String,
    pub internal: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ClaimComment> for CommentResponse {
    fn from(comment: ClaimComment) -> Self {
        Self {
            id: comment.id.into(),
            author_id: comment.author_id.into(),
            message: comment.message,
            internal: comment.visibility == CommentVisibility::Internal,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub id: Uuid,
    pub file_name: String,
    pub description: Option<String>,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ClaimAttachment> for AttachmentResponse {
    fn from(attachment: ClaimAttachment) -> Self {
        Self {
            id: attachment.id.into(),
            file_name: attachment.file_name,
            description: attachment.description,
            uploaded_by: attachment.uploaded_by.into(),
            uploaded_at: attachment.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub actions: Vec<String>,
}
