//! Claim comment thread

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, CommentId, UserId};

/// Who can read a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentVisibility {
    /// Member, HR, and broker
    General,
    /// HR and broker staff only
    Internal,
}

/// A comment on a claim
///
/// Comments may carry medical details; the persistence layer is expected to
/// encrypt the message at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimComment {
    pub id: CommentId,
    pub claim_id: ClaimId,
    pub author_id: UserId,
    pub message: String,
    pub visibility: CommentVisibility,
    pub created_at: DateTime<Utc>,
}

impl ClaimComment {
    /// Creates a new comment
    pub fn new(
        claim_id: ClaimId,
        author_id: UserId,
        message: impl Into<String>,
        visibility: CommentVisibility,
    ) -> Self {
        Self {
            id: CommentId::new_v7(),
            claim_id,
            author_id,
            message: message.into(),
            visibility,
            created_at: Utc::now(),
        }
    }
}
