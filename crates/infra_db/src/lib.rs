//! Database Infrastructure Layer
//!
//! Adapters for the claims domain ports:
//!
//! - [`repositories`]: PostgreSQL implementations over SQLx
//! - [`memory`]: in-memory implementations for tests and local development
//! - [`pool`]: connection pool configuration and migrations
//!
//! Both adapter families honor the same contracts. Claim references are
//! allocated inside one critical section per store, and transition commits
//! compare-and-swap on the stored status, so a stale writer always loses.

pub mod error;
pub mod memory;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use memory::{InMemoryClaimStore, InMemoryClientSettings, InMemoryMemberDirectory};
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{PgClaimStore, PgClientSettings, PgMemberDirectory};
