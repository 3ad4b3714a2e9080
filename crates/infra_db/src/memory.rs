//! In-memory port adapters
//!
//! Mutex-protected implementations of the claims domain ports, used by the
//! test suites and by local development without a database. They honor the
//! same contracts as the PostgreSQL repositories: serialized reference
//! allocation, compare-and-swap transition commits, and conflict errors on
//! both.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, Utc};

use core_kernel::{ClaimId, ClientId, DomainPort, MemberId, PortError, UserId};
use domain_claims::{
    Claim, ClaimAttachment, ClaimComment, ClaimReference, ClaimStatusLog, ClaimStore,
    ClientSettings, CommentVisibility, MemberDirectory, NewClaim,
};

#[derive(Default)]
struct StoreInner {
    claims: HashMap<ClaimId, Claim>,
    references: HashSet<ClaimReference>,
    logs: Vec<ClaimStatusLog>,
    comments: Vec<ClaimComment>,
    attachments: Vec<ClaimAttachment>,
    /// Number of upcoming creations to fail with a reference conflict
    injected_conflicts: usize,
}

/// In-memory implementation of the claims persistence port
///
/// The single mutex is the critical section: reference allocation and
/// transition commit each run under it in full, so the store exhibits the
/// same serialization the PostgreSQL adapter gets from its transactions.
#[derive(Default)]
pub struct InMemoryClaimStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` creations fail with a reference conflict,
    /// simulating an allocation race
    pub fn inject_reference_conflicts(&self, count: usize) {
        self.inner.lock().unwrap().injected_conflicts = count;
    }

    /// Number of log rows recorded across all claims
    pub fn log_count(&self) -> usize {
        self.inner.lock().unwrap().logs.len()
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn create_claim(&self, new: &NewClaim) -> Result<Claim, PortError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.injected_conflicts > 0 {
            inner.injected_conflicts -= 1;
            return Err(PortError::conflict("claim reference already allocated"));
        }

        let year = Utc::now().year();
        let last = inner
            .references
            .iter()
            .filter(|r| r.year() == year)
            .max()
            .cloned();
        let reference = ClaimReference::next_in_year(last.as_ref(), year)
            .map_err(|e| PortError::validation(e.to_string()))?;

        if !inner.references.insert(reference.clone()) {
            return Err(PortError::conflict(format!(
                "claim reference {reference} already allocated"
            )));
        }

        let claim = Claim::draft(reference, new);
        inner.claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        self.inner
            .lock()
            .unwrap()
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", id))
    }

    async fn claims_for_member(&self, member_id: MemberId) -> Result<Vec<Claim>, PortError> {
        let inner = self.inner.lock().unwrap();
        let mut claims: Vec<Claim> = inner
            .claims
            .values()
            .filter(|c| c.member_id == member_id)
            .cloned()
            .collect();
        claims.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.claim_reference.cmp(&a.claim_reference))
        });
        Ok(claims)
    }

    async fn commit_transition(
        &self,
        claim: &Claim,
        log: &ClaimStatusLog,
    ) -> Result<(), PortError> {
        let mut inner = self.inner.lock().unwrap();

        let stored = inner
            .claims
            .get(&claim.id)
            .ok_or_else(|| PortError::not_found("Claim", claim.id))?;
        if stored.status != log.from_status {
            return Err(PortError::conflict(format!(
                "claim {} is {}, not {}",
                claim.claim_reference, stored.status, log.from_status
            )));
        }

        inner.claims.insert(claim.id, claim.clone());
        inner.logs.push(log.clone());
        Ok(())
    }

    async fn status_log(&self, claim_id: ClaimId) -> Result<Vec<ClaimStatusLog>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .logs
            .iter()
            .filter(|l| l.claim_id == claim_id)
            .cloned()
            .collect())
    }

    async fn add_comment(&self, comment: &ClaimComment) -> Result<(), PortError> {
        self.inner.lock().unwrap().comments.push(comment.clone());
        Ok(())
    }

    async fn comments(
        &self,
        claim_id: ClaimId,
        include_internal: bool,
    ) -> Result<Vec<ClaimComment>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .comments
            .iter()
            .filter(|c| c.claim_id == claim_id)
            .filter(|c| include_internal || c.visibility == CommentVisibility::General)
            .cloned()
            .collect())
    }

    async fn add_attachment(&self, attachment: &ClaimAttachment) -> Result<(), PortError> {
        self.inner
            .lock()
            .unwrap()
            .attachments
            .push(attachment.clone());
        Ok(())
    }

    async fn attachments(&self, claim_id: ClaimId) -> Result<Vec<ClaimAttachment>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attachments
            .iter()
            .filter(|a| a.claim_id == claim_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct DirectoryInner {
    clients: HashMap<MemberId, ClientId>,
    users: HashMap<UserId, MemberId>,
}

/// In-memory member directory
#[derive(Default)]
pub struct InMemoryMemberDirectory {
    inner: Mutex<DirectoryInner>,
}

impl InMemoryMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a member under a client company
    pub fn register(&self, member_id: MemberId, client_id: ClientId) {
        self.inner
            .lock()
            .unwrap()
            .clients
            .insert(member_id, client_id);
    }

    /// Links an acting user to the member record they own
    pub fn link_user(&self, user_id: UserId, member_id: MemberId) {
        self.inner.lock().unwrap().users.insert(user_id, member_id);
    }
}

impl DomainPort for InMemoryMemberDirectory {}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn client_of(&self, member_id: MemberId) -> Result<ClientId, PortError> {
        self.inner
            .lock()
            .unwrap()
            .clients
            .get(&member_id)
            .copied()
            .ok_or_else(|| PortError::not_found("Member", member_id))
    }

    async fn member_of(&self, user_id: UserId) -> Result<Option<MemberId>, PortError> {
        Ok(self.inner.lock().unwrap().users.get(&user_id).copied())
    }
}

/// In-memory per-client settings
#[derive(Default)]
pub struct InMemoryClientSettings {
    values: Mutex<HashMap<(ClientId, String), bool>>,
}

impl InMemoryClientSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a boolean claim setting for a client
    pub fn set_bool(&self, client_id: ClientId, key: &str, value: bool) {
        self.values
            .lock()
            .unwrap()
            .insert((client_id, key.to_string()), value);
    }
}

impl DomainPort for InMemoryClientSettings {}

#[async_trait]
impl ClientSettings for InMemoryClientSettings {
    async fn claim_setting_bool(
        &self,
        client_id: ClientId,
        key: &str,
        default: bool,
    ) -> Result<bool, PortError> {
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&(client_id, key.to_string()))
            .copied()
            .unwrap_or(default))
    }
}
