//! Core Kernel - Foundational types for the brokerage administration system
//!
//! This crate provides the building blocks shared by the domain and
//! infrastructure layers:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed entity identifiers
//! - Port infrastructure for the hexagonal seams between domains

pub mod identifiers;
pub mod money;
pub mod ports;

pub use identifiers::{
    AttachmentId, ClaimId, ClientId, CommentId, MemberId, StatusLogId, UserId,
};
pub use money::{Currency, Money, MoneyError};
pub use ports::{DomainPort, PortError};
