//! Claims domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::actor::Permission;
use crate::reference::ReferenceError;
use crate::status::{ClaimAction, ClaimStatus};

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The actor lacks the capability the operation requires; never retried
    #[error("permission denied: {operation} requires {permission}")]
    PermissionDenied {
        operation: &'static str,
        permission: Permission,
    },

    /// The claim's current status is not a legal source for the action, or
    /// the business condition does not hold
    #[error("illegal transition: {action} from {from} ({reason})")]
    IllegalTransition {
        action: ClaimAction,
        from: ClaimStatus,
        reason: String,
    },

    /// Action-specific input missing or malformed
    #[error("invalid payload for {action}: {message}")]
    InvalidPayload {
        action: ClaimAction,
        message: String,
    },

    /// Concurrent reference allocation raced twice; creation failed
    #[error("claim reference allocation collided after retry")]
    ReferenceCollision,

    /// Claim, member, or client missing
    #[error("not found: {0}")]
    NotFound(String),

    /// Reference format or sequence failure
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Underlying store or collaborator failure
    #[error("storage error: {0}")]
    Storage(PortError),
}

impl ClaimError {
    pub(crate) fn illegal(
        action: ClaimAction,
        from: ClaimStatus,
        reason: impl Into<String>,
    ) -> Self {
        ClaimError::IllegalTransition {
            action,
            from,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_payload(action: ClaimAction, message: impl Into<String>) -> Self {
        ClaimError::InvalidPayload {
            action,
            message: message.into(),
        }
    }
}

impl From<PortError> for ClaimError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ClaimError::NotFound(format!("{entity_type} {id}"))
            }
            other => ClaimError::Storage(other),
        }
    }
}
