//! Claim statuses and transition actions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Claim status
///
/// The status field is mutable only through the transition engine; the
/// variants serialize as the canonical wire strings used on printed
/// documents and in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Created by the member, not yet submitted
    Draft,
    /// Awaiting HR review at the client company
    SubmittedToHr,
    /// Returned by HR, member must amend and resubmit
    ReturnedByHr,
    /// In the broker's queue
    SubmittedToBroker,
    /// Broker actively processing
    BrokerProcessing,
    /// Returned by the broker, member must amend and resubmit
    ReturnedByBroker,
    /// Forwarded to the insurance company
    SentToInsurance,
    /// Insurer raised a query, broker to answer
    InsuranceQuery,
    /// Insurer approved, awaiting payment
    ApprovedByInsurance,
    /// Insurer rejected (terminal)
    RejectedByInsurance,
    /// Paid and settled (terminal)
    Paid,
}

impl ClaimStatus {
    /// Every status, in lifecycle order
    pub const ALL: [ClaimStatus; 11] = [
        ClaimStatus::Draft,
        ClaimStatus::SubmittedToHr,
        ClaimStatus::ReturnedByHr,
        ClaimStatus::SubmittedToBroker,
        ClaimStatus::BrokerProcessing,
        ClaimStatus::ReturnedByBroker,
        ClaimStatus::SentToInsurance,
        ClaimStatus::InsuranceQuery,
        ClaimStatus::ApprovedByInsurance,
        ClaimStatus::RejectedByInsurance,
        ClaimStatus::Paid,
    ];

    /// Returns the canonical wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "DRAFT",
            ClaimStatus::SubmittedToHr => "SUBMITTED_TO_HR",
            ClaimStatus::ReturnedByHr => "RETURNED_BY_HR",
            ClaimStatus::SubmittedToBroker => "SUBMITTED_TO_BROKER",
            ClaimStatus::BrokerProcessing => "BROKER_PROCESSING",
            ClaimStatus::ReturnedByBroker => "RETURNED_BY_BROKER",
            ClaimStatus::SentToInsurance => "SENT_TO_INSURANCE",
            ClaimStatus::InsuranceQuery => "INSURANCE_QUERY",
            ClaimStatus::ApprovedByInsurance => "APPROVED_BY_INSURANCE",
            ClaimStatus::RejectedByInsurance => "REJECTED_BY_INSURANCE",
            ClaimStatus::Paid => "PAID",
        }
    }

    /// True for statuses with no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Paid | ClaimStatus::RejectedByInsurance)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "claim status",
                value: s.to_string(),
            })
    }
}

/// A named transition action on a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimAction {
    SubmitToHr,
    SubmitDirectToBroker,
    HrApprove,
    HrReturn,
    BrokerStartProcess,
    BrokerReturn,
    SentToInsurance,
    InsuranceQuery,
    AnswerInsuranceQuery,
    InsuranceApprove,
    InsuranceReject,
    MarkAsPaid,
}

impl ClaimAction {
    /// Every action in the transition table
    pub const ALL: [ClaimAction; 12] = [
        ClaimAction::SubmitToHr,
        ClaimAction::SubmitDirectToBroker,
        ClaimAction::HrApprove,
        ClaimAction::HrReturn,
        ClaimAction::BrokerStartProcess,
        ClaimAction::BrokerReturn,
        ClaimAction::SentToInsurance,
        ClaimAction::InsuranceQuery,
        ClaimAction::AnswerInsuranceQuery,
        ClaimAction::InsuranceApprove,
        ClaimAction::InsuranceReject,
        ClaimAction::MarkAsPaid,
    ];

    /// Returns the canonical action name recorded in the audit trail
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimAction::SubmitToHr => "submit_to_hr",
            ClaimAction::SubmitDirectToBroker => "submit_direct_to_broker",
            ClaimAction::HrApprove => "hr_approve",
            ClaimAction::HrReturn => "hr_return",
            ClaimAction::BrokerStartProcess => "broker_start_process",
            ClaimAction::BrokerReturn => "broker_return",
            ClaimAction::SentToInsurance => "sent_to_insurance",
            ClaimAction::InsuranceQuery => "insurance_query",
            ClaimAction::AnswerInsuranceQuery => "answer_insurance_query",
            ClaimAction::InsuranceApprove => "insurance_approve",
            ClaimAction::InsuranceReject => "insurance_reject",
            ClaimAction::MarkAsPaid => "mark_as_paid",
        }
    }
}

impl fmt::Display for ClaimAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimAction::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "claim action",
                value: s.to_string(),
            })
    }
}

/// Parse error for status and action wire strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
