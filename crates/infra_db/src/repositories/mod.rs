//! Repository implementations
//!
//! PostgreSQL-backed implementations of the claims domain ports. Each
//! repository owns a clone of the shared connection pool.

pub mod claims;
pub mod members;

pub use claims::PgClaimStore;
pub use members::{PgClientSettings, PgMemberDirectory};
