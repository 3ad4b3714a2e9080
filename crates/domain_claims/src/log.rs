//! Claim status audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, StatusLogId, UserId};

use crate::status::{ClaimAction, ClaimStatus};

/// One row of the append-only transition log
///
/// Exactly one row is recorded per successful transition; rows are never
/// mutated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimStatusLog {
    pub id: StatusLogId,
    pub claim_id: ClaimId,
    pub from_status: ClaimStatus,
    pub to_status: ClaimStatus,
    pub action: ClaimAction,
    pub reason: Option<String>,
    pub actor_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl ClaimStatusLog {
    /// Records a transition
    pub fn record(
        claim_id: ClaimId,
        from_status: ClaimStatus,
        to_status: ClaimStatus,
        action: ClaimAction,
        reason: Option<String>,
        actor_id: UserId,
    ) -> Self {
        Self {
            id: StatusLogId::new_v7(),
            claim_id,
            from_status,
            to_status,
            action,
            reason,
            actor_id,
            created_at: Utc::now(),
        }
    }
}
