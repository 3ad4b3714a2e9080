//! Claims domain ports
//!
//! The claims engine depends on three collaborators, each behind a trait so
//! adapters can be swapped (PostgreSQL, in-memory, mock):
//!
//! - [`ClaimStore`]: transactional persistence of claims, log rows, and
//!   child records, including serialized reference allocation.
//! - [`MemberDirectory`]: resolves a member to their client company.
//! - [`ClientSettings`]: per-client claim configuration, notably the
//!   `bypass_hr_review` flag.
//!
//! All port methods return [`PortError`]; the application service maps
//! these into the domain error taxonomy.

use async_trait::async_trait;

use core_kernel::{ClaimId, ClientId, DomainPort, MemberId, PortError, UserId};

use crate::attachment::ClaimAttachment;
use crate::claim::{Claim, NewClaim};
use crate::comment::ClaimComment;
use crate::log::ClaimStatusLog;

/// Configuration key for the HR-bypass flag (default: `false`)
pub const BYPASS_HR_REVIEW: &str = "bypass_hr_review";

/// Persistence port for claims and their child records
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Persists a new claim, allocating its reference inside one critical
    /// section ("read max reference for the year, compute next, insert")
    ///
    /// A reference uniqueness violation surfaces as [`PortError::Conflict`];
    /// the caller retries the whole creation once.
    async fn create_claim(&self, new: &NewClaim) -> Result<Claim, PortError>;

    /// Retrieves a claim by id
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// All claims of a member, newest first
    async fn claims_for_member(&self, member_id: MemberId) -> Result<Vec<Claim>, PortError>;

    /// Atomically persists a transitioned claim together with its log row
    ///
    /// Implementations compare-and-swap on the stored status against
    /// `log.from_status`; a stale status surfaces as
    /// [`PortError::Conflict`] and nothing is written.
    async fn commit_transition(
        &self,
        claim: &Claim,
        log: &ClaimStatusLog,
    ) -> Result<(), PortError>;

    /// The transition log of a claim, oldest first
    async fn status_log(&self, claim_id: ClaimId) -> Result<Vec<ClaimStatusLog>, PortError>;

    /// Appends a comment
    async fn add_comment(&self, comment: &ClaimComment) -> Result<(), PortError>;

    /// Comments of a claim, oldest first; internal comments only when
    /// `include_internal`
    async fn comments(
        &self,
        claim_id: ClaimId,
        include_internal: bool,
    ) -> Result<Vec<ClaimComment>, PortError>;

    /// Appends an attachment record
    async fn add_attachment(&self, attachment: &ClaimAttachment) -> Result<(), PortError>;

    /// Attachments of a claim, oldest first
    async fn attachments(&self, claim_id: ClaimId) -> Result<Vec<ClaimAttachment>, PortError>;
}

/// Resolves members to their client company and acting users to the
/// member record they own
#[async_trait]
pub trait MemberDirectory: DomainPort {
    async fn client_of(&self, member_id: MemberId) -> Result<ClientId, PortError>;

    /// The member record belonging to a user, if the user is a member
    /// (staff users have none)
    async fn member_of(&self, user_id: UserId) -> Result<Option<MemberId>, PortError>;
}

/// Per-client claim configuration
#[async_trait]
pub trait ClientSettings: DomainPort {
    /// Reads a boolean claim setting, falling back to `default` when the
    /// client has no explicit value
    async fn claim_setting_bool(
        &self,
        client_id: ClientId,
        key: &str,
        default: bool,
    ) -> Result<bool, PortError>;
}
