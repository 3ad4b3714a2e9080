//! Claim attachments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AttachmentId, ClaimId, UserId};

/// A document attached to a claim
///
/// Only the file reference is modeled here; byte storage lives with the
/// file-storage collaborator, keyed by claim reference and file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAttachment {
    pub id: AttachmentId,
    pub claim_id: ClaimId,
    pub file_name: String,
    pub description: Option<String>,
    pub uploaded_by: UserId,
    pub uploaded_at: DateTime<Utc>,
}

impl ClaimAttachment {
    /// Creates a new attachment record
    pub fn new(
        claim_id: ClaimId,
        uploaded_by: UserId,
        file_name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: AttachmentId::new_v7(),
            claim_id,
            file_name: file_name.into(),
            description,
            uploaded_by,
            uploaded_at: Utc::now(),
        }
    }
}
