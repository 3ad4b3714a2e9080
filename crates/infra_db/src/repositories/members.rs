//! Member directory and client settings backed by PostgreSQL
//!
//! Members belong to exactly one client company and may be linked to the
//! acting user who owns them; per-client claim configuration is a
//! key/value table with typed readers.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClientId, DomainPort, MemberId, PortError, UserId};
use domain_claims::{ClientSettings, MemberDirectory};

use crate::error::DatabaseError;

/// PostgreSQL implementation of the member directory port
#[derive(Debug, Clone)]
pub struct PgMemberDirectory {
    pool: PgPool,
}

impl PgMemberDirectory {
    /// Creates a new directory over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgMemberDirectory {}

#[async_trait]
impl MemberDirectory for PgMemberDirectory {
    async fn client_of(&self, member_id: MemberId) -> Result<ClientId, PortError> {
        let client: Option<Uuid> =
            sqlx::query_scalar("SELECT client_id FROM members WHERE id = $1")
                .bind(Uuid::from(member_id))
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from)?;

        client
            .map(ClientId::from)
            .ok_or_else(|| DatabaseError::not_found("Member", member_id).into())
    }

    async fn member_of(&self, user_id: UserId) -> Result<Option<MemberId>, PortError> {
        let member: Option<Uuid> = sqlx::query_scalar("SELECT id FROM members WHERE user_id = $1")
            .bind(Uuid::from(user_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(member.map(MemberId::from))
    }
}

/// PostgreSQL implementation of the per-client settings port
#[derive(Debug, Clone)]
pub struct PgClientSettings {
    pool: PgPool,
}

impl PgClientSettings {
    /// Creates a new settings reader over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgClientSettings {}

#[async_trait]
impl ClientSettings for PgClientSettings {
    async fn claim_setting_bool(
        &self,
        client_id: ClientId,
        key: &str,
        default: bool,
    ) -> Result<bool, PortError> {
        let value: Option<bool> = sqlx::query_scalar(
            "SELECT value_bool FROM client_claim_settings WHERE client_id = $1 AND key = $2",
        )
        .bind(Uuid::from(client_id))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(value.unwrap_or(default))
    }
}
