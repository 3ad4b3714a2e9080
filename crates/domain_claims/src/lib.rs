//! Claims Lifecycle Domain
//!
//! This crate implements the financial claim lifecycle for the brokerage:
//! submission through HR review (or client-configured bypass), broker
//! processing, insurer adjudication, and settlement.
//!
//! # Claim Lifecycle
//!
//! ```text
//! DRAFT -> SUBMITTED_TO_HR -> SUBMITTED_TO_BROKER -> BROKER_PROCESSING
//!       \__ (bypass_hr_review) __/                        |
//!                                                         v
//!                  PAID <- APPROVED_BY_INSURANCE <- SENT_TO_INSURANCE
//!                                                         |
//!                                                  REJECTED_BY_INSURANCE
//! ```
//!
//! The transition table lives in [`transition`] as data; [`engine`] is the
//! single dispatcher that interprets it. Every successful transition appends
//! exactly one [`log::ClaimStatusLog`] row.

pub mod actor;
pub mod attachment;
pub mod claim;
pub mod comment;
pub mod engine;
pub mod error;
pub mod log;
pub mod ports;
pub mod reference;
pub mod service;
pub mod status;
pub mod transition;

pub use actor::{Actor, Permission};
pub use attachment::ClaimAttachment;
pub use claim::{Claim, NewClaim};
pub use comment::{ClaimComment, CommentVisibility};
pub use engine::{apply_transition, TransitionPayload};
pub use error::ClaimError;
pub use log::ClaimStatusLog;
pub use ports::{ClaimStore, ClientSettings, MemberDirectory, BYPASS_HR_REVIEW};
pub use reference::{ClaimReference, ReferenceError};
pub use service::{ClaimService, TransitionOutcome};
pub use status::{ClaimAction, ClaimStatus};
pub use transition::{legal_actions, spec_for, Condition, TransitionSpec};
