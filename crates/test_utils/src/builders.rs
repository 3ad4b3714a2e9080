//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults, so
//! tests only spell out the fields they care about.

use chrono::NaiveDate;
use core_kernel::{MemberId, Money};
use domain_claims::NewClaim;

use crate::fixtures::MoneyFixtures;

/// Builder for new-claim input
pub struct NewClaimBuilder {
    member_id: MemberId,
    service_date: NaiveDate,
    amount_original: Money,
    is_in_patient: bool,
    is_international: bool,
    admin_notes: Option<String>,
}

impl Default for NewClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewClaimBuilder {
    /// Creates a builder with default values: a routine out-patient SAR
    /// claim for a fresh member
    pub fn new() -> Self {
        Self {
            member_id: MemberId::new(),
            service_date: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            amount_original: MoneyFixtures::sar_850(),
            is_in_patient: false,
            is_international: false,
            admin_notes: None,
        }
    }

    /// Sets the owning member
    pub fn with_member(mut self, member_id: MemberId) -> Self {
        self.member_id = member_id;
        self
    }

    /// Sets the service date
    pub fn with_service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = date;
        self
    }

    /// Sets the submitted amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount_original = amount;
        self
    }

    /// Marks the claim as an in-patient admission
    pub fn in_patient(mut self) -> Self {
        self.is_in_patient = true;
        self
    }

    /// Marks the claim as international treatment
    pub fn international(mut self) -> Self {
        self.is_international = true;
        self
    }

    /// Sets internal notes
    pub fn with_admin_notes(mut self, notes: impl Into<String>) -> Self {
        self.admin_notes = Some(notes.into());
        self
    }

    /// Builds the new-claim input
    pub fn build(self) -> NewClaim {
        NewClaim {
            member_id: self.member_id,
            service_date: self.service_date,
            amount_original: self.amount_original,
            is_in_patient: self.is_in_patient,
            is_international: self.is_international,
            admin_notes: self.admin_notes,
        }
    }
}
