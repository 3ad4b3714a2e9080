//! Test Utilities Crate
//!
//! Provides shared test infrastructure for the claims lifecycle test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built actors and amounts for common test scenarios
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Custom assertion helpers for domain types
//! - `database`: PostgreSQL test containers for repository tests

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
