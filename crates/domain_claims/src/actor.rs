//! Acting identity and capability set
//!
//! The engine never reads ambient request context: every operation takes an
//! [`Actor`] carrying the acting user and the permission set resolved by the
//! identity service.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use core_kernel::UserId;

use crate::status::UnknownVariant;

/// A capability required by a transition action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Member-side: create and submit claims
    CanSubmitClaim,
    /// HR staff: approve claims to the broker
    CanApproveHr,
    /// HR staff: return claims to the member
    CanRejectHr,
    /// Broker staff: process claims and relay insurer decisions
    CanProcessBroker,
    /// Broker/HR staff: read every claim of a client, internal notes included
    CanViewAllClaims,
    /// Finance: settle approved claims
    CanApprovePayment,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::CanSubmitClaim,
        Permission::CanApproveHr,
        Permission::CanRejectHr,
        Permission::CanProcessBroker,
        Permission::CanViewAllClaims,
        Permission::CanApprovePayment,
    ];

    /// Returns the permission codename as registered in the identity service
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanSubmitClaim => "can_submit_claim",
            Permission::CanApproveHr => "can_approve_hr",
            Permission::CanRejectHr => "can_reject_hr",
            Permission::CanProcessBroker => "can_process_broker",
            Permission::CanViewAllClaims => "can_view_all_claims",
            Permission::CanApprovePayment => "can_approve_payment",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "permission",
                value: s.to_string(),
            })
    }
}

/// The acting identity for an engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    permissions: HashSet<Permission>,
}

impl Actor {
    /// Creates an actor with the given permission set
    pub fn new(user_id: UserId, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            user_id,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Creates an actor with no permissions
    pub fn without_permissions(user_id: UserId) -> Self {
        Self {
            user_id,
            permissions: HashSet::new(),
        }
    }

    /// Returns true if the actor holds the permission
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Grants an additional permission
    pub fn grant(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Returns the permission set
    pub fn permissions(&self) -> impl Iterator<Item = Permission> + '_ {
        self.permissions.iter().copied()
    }

    /// True if the actor may read internal comments and notes
    pub fn can_view_internal(&self) -> bool {
        self.has(Permission::CanViewAllClaims)
            || self.has(Permission::CanApproveHr)
            || self.has(Permission::CanProcessBroker)
    }
}
