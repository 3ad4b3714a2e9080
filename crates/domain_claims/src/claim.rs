//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, MemberId, Money};

use crate::reference::ClaimReference;
use crate::status::ClaimStatus;

/// A financial claim raised by a member against their coverage
///
/// `status` is mutated only by the transition engine; `claim_reference` is
/// assigned exactly once when the claim is first persisted and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Human-readable reference, `CLM-YYYY-NNNNN`
    pub claim_reference: ClaimReference,
    /// Owning member (claims are removed with the member)
    pub member_id: MemberId,
    /// Lifecycle status
    pub status: ClaimStatus,
    /// Date the medical service was received
    pub service_date: NaiveDate,
    /// Amount as submitted, in its original currency
    pub amount_original: Money,
    /// Approved settlement amount in SAR, set by `mark_as_paid`
    pub approved_amount_sar: Option<Money>,
    /// In-patient admission
    pub is_in_patient: bool,
    /// Treatment received outside KSA
    pub is_international: bool,
    /// Reason recorded by the last returning/rejecting transition
    pub rejection_reason: Option<String>,
    /// Internal notes, staff-visible only
    pub admin_notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Builds a new draft claim around an allocated reference
    ///
    /// Called by store adapters once a reference has been allocated inside
    /// their critical section; the claim starts in `DRAFT`.
    pub fn draft(claim_reference: ClaimReference, new: &NewClaim) -> Self {
        let now = Utc::now();
        Self {
            id: ClaimId::new_v7(),
            claim_reference,
            member_id: new.member_id,
            status: ClaimStatus::Draft,
            service_date: new.service_date,
            amount_original: new.amount_original,
            approved_amount_sar: None,
            is_in_patient: new.is_in_patient,
            is_international: new.is_international,
            rejection_reason: None,
            admin_notes: new.admin_notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the claim has reached a terminal status
    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Input for creating a claim; the reference and timestamps are assigned at
/// persistence time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClaim {
    pub member_id: MemberId,
    pub service_date: NaiveDate,
    pub amount_original: Money,
    #[serde(default)]
    pub is_in_patient: bool,
    #[serde(default)]
    pub is_international: bool,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_draft_starts_in_draft_status() {
        let reference = ClaimReference::new(2025, 1).unwrap();
        let new = NewClaim {
            member_id: MemberId::new(),
            service_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            amount_original: Money::new(dec!(850.00), Currency::SAR),
            is_in_patient: false,
            is_international: false,
            admin_notes: None,
        };

        let claim = Claim::draft(reference.clone(), &new);

        assert_eq!(claim.status, ClaimStatus::Draft);
        assert_eq!(claim.claim_reference, reference);
        assert!(claim.approved_amount_sar.is_none());
        assert!(claim.rejection_reason.is_none());
        assert!(!claim.is_settled());
    }
}
