//! Claims store backed by PostgreSQL
//!
//! Implements [`ClaimStore`] over SQLx. The two operations with
//! concurrency requirements are handled here:
//!
//! - `create_claim` allocates the year-scoped reference inside a single
//!   transaction that locks the current maximum row; the unique index on
//!   `claim_reference` is the backstop, surfacing a race as a conflict the
//!   application service retries once.
//! - `commit_transition` compare-and-swaps on the stored status, so two
//!   actors racing the same transition cannot both win, and writes the
//!   claim and its log row in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{ClaimId, Currency, DomainPort, MemberId, Money, PortError};
use domain_claims::{
    Claim, ClaimAttachment, ClaimComment, ClaimReference, ClaimStatusLog, ClaimStore,
    CommentVisibility, NewClaim,
};

use crate::error::DatabaseError;

/// PostgreSQL implementation of the claims persistence port
#[derive(Debug, Clone)]
pub struct PgClaimStore {
    pool: PgPool,
}

impl PgClaimStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgClaimStore {}

#[async_trait]
impl ClaimStore for PgClaimStore {
    async fn create_claim(&self, new: &NewClaim) -> Result<Claim, PortError> {
        let year = Utc::now().year();
        let prefix = ClaimReference::year_prefix(year);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        // Lock the current maximum so sequential allocators queue up behind
        // us. A racing insert that slipped past the lock hits the unique
        // index instead and surfaces as a conflict.
        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT claim_reference FROM claims
            WHERE claim_reference LIKE $1
            ORDER BY claim_reference DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(format!("{prefix}%"))
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let last = last
            .map(|s| s.parse::<ClaimReference>())
            .transpose()
            .map_err(|e| PortError::internal(format!("stored reference unreadable: {e}")))?;
        let reference = ClaimReference::next_in_year(last.as_ref(), year)
            .map_err(|e| PortError::validation(e.to_string()))?;

        let claim = Claim::draft(reference, new);

        sqlx::query(
            r#"
            INSERT INTO claims (
                id, claim_reference, member_id, status, service_date,
                amount_original, currency_original, approved_amount_sar,
                is_in_patient, is_international, rejection_reason,
                admin_notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(Uuid::from(claim.id))
        .bind(claim.claim_reference.as_str())
        .bind(Uuid::from(claim.member_id))
        .bind(claim.status.as_str())
        .bind(claim.service_date)
        .bind(claim.amount_original.amount())
        .bind(claim.amount_original.currency().code())
        .bind(claim.approved_amount_sar.map(|m| m.amount()))
        .bind(claim.is_in_patient)
        .bind(claim.is_international)
        .bind(&claim.rejection_reason)
        .bind(&claim.admin_notes)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;

        debug!(claim = %claim.claim_reference, "claim persisted");
        Ok(claim)
    }

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        let row: Option<ClaimRow> = sqlx::query_as(
            r#"
            SELECT id, claim_reference, member_id, status, service_date,
                   amount_original, currency_original, approved_amount_sar,
                   is_in_patient, is_international, rejection_reason,
                   admin_notes, created_at, updated_at
            FROM claims
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let row = row.ok_or_else(|| DatabaseError::not_found("Claim", id))?;
        Ok(row.try_into()?)
    }

    async fn claims_for_member(&self, member_id: MemberId) -> Result<Vec<Claim>, PortError> {
        let rows: Vec<ClaimRow> = sqlx::query_as(
            r#"
            SELECT id, claim_reference, member_id, status, service_date,
                   amount_original, currency_original, approved_amount_sar,
                   is_in_patient, is_international, rejection_reason,
                   admin_notes, created_at, updated_at
            FROM claims
            WHERE member_id = $1
            ORDER BY created_at DESC, claim_reference DESC
            "#,
        )
        .bind(Uuid::from(member_id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| Ok(row.try_into()?))
            .collect()
    }

    async fn commit_transition(
        &self,
        claim: &Claim,
        log: &ClaimStatusLog,
    ) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let updated = sqlx::query(
            r#"
            UPDATE claims
            SET status = $1,
                approved_amount_sar = $2,
                rejection_reason = $3,
                updated_at = $4
            WHERE id = $5 AND status = $6
            "#,
        )
        .bind(claim.status.as_str())
        .bind(claim.approved_amount_sar.map(|m| m.amount()))
        .bind(&claim.rejection_reason)
        .bind(claim.updated_at)
        .bind(Uuid::from(claim.id))
        .bind(log.from_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        if updated.rows_affected() == 0 {
            let exists: Option<String> =
                sqlx::query_scalar("SELECT status FROM claims WHERE id = $1")
                    .bind(Uuid::from(claim.id))
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(DatabaseError::from)?;
            return Err(match exists {
                Some(current) => DatabaseError::StaleUpdate(format!(
                    "claim {} is {current}, not {}",
                    claim.claim_reference, log.from_status
                ))
                .into(),
                None => DatabaseError::not_found("Claim", claim.id).into(),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO claim_status_log (
                id, claim_id, from_status, to_status, action, reason,
                actor_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::from(log.id))
        .bind(Uuid::from(log.claim_id))
        .bind(log.from_status.as_str())
        .bind(log.to_status.as_str())
        .bind(log.action.as_str())
        .bind(&log.reason)
        .bind(Uuid::from(log.actor_id))
        .bind(log.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn status_log(&self, claim_id: ClaimId) -> Result<Vec<ClaimStatusLog>, PortError> {
        let rows: Vec<StatusLogRow> = sqlx::query_as(
            r#"
            SELECT id, claim_id, from_status, to_status, action, reason,
                   actor_id, created_at
            FROM claim_status_log
            WHERE claim_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(Uuid::from(claim_id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| Ok(row.try_into()?))
            .collect()
    }

    async fn add_comment(&self, comment: &ClaimComment) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO claim_comments (
                id, claim_id, author_id, message, visibility, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(comment.id))
        .bind(Uuid::from(comment.claim_id))
        .bind(Uuid::from(comment.author_id))
        .bind(&comment.message)
        .bind(visibility_str(comment.visibility))
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn comments(
        &self,
        claim_id: ClaimId,
        include_internal: bool,
    ) -> Result<Vec<ClaimComment>, PortError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, claim_id, author_id, message, visibility, created_at
            FROM claim_comments
            WHERE claim_id = $1 AND ($2 OR visibility = 'GENERAL')
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(Uuid::from(claim_id))
        .bind(include_internal)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| Ok(row.try_into()?))
            .collect()
    }

    async fn add_attachment(&self, attachment: &ClaimAttachment) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO claim_attachments (
                id, claim_id, file_name, description, uploaded_by, uploaded_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(attachment.id))
        .bind(Uuid::from(attachment.claim_id))
        .bind(&attachment.file_name)
        .bind(&attachment.description)
        .bind(Uuid::from(attachment.uploaded_by))
        .bind(attachment.uploaded_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn attachments(&self, claim_id: ClaimId) -> Result<Vec<ClaimAttachment>, PortError> {
        let rows: Vec<AttachmentRow> = sqlx::query_as(
            r#"
            SELECT id, claim_id, file_name, description, uploaded_by, uploaded_at
            FROM claim_attachments
            WHERE claim_id = $1
            ORDER BY uploaded_at ASC, id ASC
            "#,
        )
        .bind(Uuid::from(claim_id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(AttachmentRow::into_domain).collect())
    }
}

fn visibility_str(visibility: CommentVisibility) -> &'static str {
    match visibility {
        CommentVisibility::General => "GENERAL",
        CommentVisibility::Internal => "INTERNAL",
    }
}

fn parse_visibility(s: &str) -> Result<CommentVisibility, DatabaseError> {
    match s {
        "GENERAL" => Ok(CommentVisibility::General),
        "INTERNAL" => Ok(CommentVisibility::Internal),
        other => Err(DatabaseError::decode(format!(
            "unknown comment visibility '{other}'"
        ))),
    }
}

#[derive(sqlx::FromRow)]
struct ClaimRow {
    id: Uuid,
    claim_reference: String,
    member_id: Uuid,
    status: String,
    service_date: NaiveDate,
    amount_original: Decimal,
    currency_original: String,
    approved_amount_sar: Option<Decimal>,
    is_in_patient: bool,
    is_international: bool,
    rejection_reason: Option<String>,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let currency: Currency = row
            .currency_original
            .parse()
            .map_err(DatabaseError::decode)?;
        Ok(Claim {
            id: row.id.into(),
            claim_reference: row.claim_reference.parse().map_err(DatabaseError::decode)?,
            member_id: row.member_id.into(),
            status: row.status.parse().map_err(DatabaseError::decode)?,
            service_date: row.service_date,
            amount_original: Money::new(row.amount_original, currency),
            approved_amount_sar: row
                .approved_amount_sar
                .map(|amount| Money::new(amount, Currency::SAR)),
            is_in_patient: row.is_in_patient,
            is_international: row.is_international,
            rejection_reason: row.rejection_reason,
            admin_notes: row.admin_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatusLogRow {
    id: Uuid,
    claim_id: Uuid,
    from_status: String,
    to_status: String,
    action: String,
    reason: Option<String>,
    actor_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<StatusLogRow> for ClaimStatusLog {
    type Error = DatabaseError;

    fn try_from(row: StatusLogRow) -> Result<Self, Self::Error> {
        Ok(ClaimStatusLog {
            id: row.id.into(),
            claim_id: row.claim_id.into(),
            from_status: row.from_status.parse().map_err(DatabaseError::decode)?,
            to_status: row.to_status.parse().map_err(DatabaseError::decode)?,
            action: row.action.parse().map_err(DatabaseError::decode)?,
            reason: row.reason,
            actor_id: row.actor_id.into(),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    claim_id: Uuid,
    author_id: Uuid,
    message: String,
    visibility: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for ClaimComment {
    type Error = DatabaseError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(ClaimComment {
            id: row.id.into(),
            claim_id: row.claim_id.into(),
            author_id: row.author_id.into(),
            message: row.message,
            visibility: parse_visibility(&row.visibility)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AttachmentRow {
    id: Uuid,
    claim_id: Uuid,
    file_name: String,
    description: Option<String>,
    uploaded_by: Uuid,
    uploaded_at: DateTime<Utc>,
}

impl AttachmentRow {
    fn into_domain(self) -> ClaimAttachment {
        ClaimAttachment {
            id: self.id.into(),
            claim_id: self.claim_id.into(),
            file_name: self.file_name,
            description: self.description,
            uploaded_by: self.uploaded_by.into(),
            uploaded_at: self.uploaded_at,
        }
    }
}
