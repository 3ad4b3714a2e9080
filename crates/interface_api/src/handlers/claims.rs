//! Claims handlers
//!
//! Every handler turns the authenticated token claims into an [`Actor`] and
//! passes it into the application service; no handler touches claim state
//! directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use domain_claims::{Actor, ClaimAction};

use crate::auth::TokenClaims;
use crate::dto::claims::*;
use crate::error::ApiError;
use crate::AppState;

fn actor(claims: &TokenClaims) -> Result<Actor, ApiError> {
    claims.actor().map_err(|_| ApiError::Unauthorized)
}

/// Creates a new draft claim
pub async fn create_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let actor = actor(&claims)?;
    let new = request.into_new_claim()?;
    let claim = state.service.create_claim(new, &actor).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    pub member_id: Uuid,
}

/// Lists a member's claims, newest first; non-owners need
/// `can_view_all_claims`
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let actor = actor(&claims)?;
    let claims = state
        .service
        .claims_for_member(query.member_id.into(), &actor)
        .await?;
    Ok(Json(claims.into_iter().map(Into::into).collect()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let actor = actor(&claims)?;
    let claim = state.service.get_claim(id.into(), &actor).await?;
    Ok(Json(claim.into()))
}

/// The claim's transition log, oldest first
pub async fn get_status_log(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StatusLogResponse>>, ApiError> {
    let actor = actor(&claims)?;
    let logs = state.service.status_log(id.into(), &actor).await?;
    Ok(Json(logs.into_iter().map(Into::into).collect()))
}

/// Actions currently available on the claim
pub async fn get_actions(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionsResponse>, ApiError> {
    let actor = actor(&claims)?;
    let actions = state.service.available_actions(id.into(), &actor).await?;
    Ok(Json(ActionsResponse {
        actions: actions.iter().map(|a| a.as_str().to_string()).collect(),
    }))
}

/// Submits the claim, dispatching on the client's HR-bypass configuration
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let actor = actor(&claims)?;
    let outcome = state.service.submit(id.into(), &actor).await?;
    Ok(Json(outcome.into()))
}

/// Applies a named transition action to the claim
///
/// One route serves all twelve actions; the engine decides legality. An
/// unknown action name is a 404, mirroring a nonexistent route.
pub async fn transition(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path((id, action)): Path<(Uuid, String)>,
    body: Option<Json<TransitionRequest>>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let actor = actor(&claims)?;
    let action: ClaimAction = action
        .parse()
        .map_err(|_| ApiError::NotFound(format!("no such claim action '{action}'")))?;
    let payload = body.map(|Json(b)| b.into_payload()).unwrap_or_default();

    let outcome = state
        .service
        .apply(id.into(), action, &actor, payload)
        .await?;
    Ok(Json(outcome.into()))
}

/// Adds a comment to the claim's thread
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let actor = actor(&claims)?;
    let visibility = request.visibility();
    let comment = state
        .service
        .add_comment(id.into(), &actor, request.message, visibility)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// The claim's comment thread, internal comments filtered by permission
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let actor = actor(&claims)?;
    let comments = state.service.comments(id.into(), &actor).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Records an attachment on the claim
pub async fn add_attachment(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateAttachmentRequest>,
) -> Result<(StatusCode, Json<AttachmentResponse>), ApiError> {
    let actor = actor(&claims)?;
    let attachment = state
        .service
        .add_attachment(id.into(), &actor, request.file_name, request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(attachment.into())))
}

/// The claim's attachments, oldest first
pub async fn list_attachments(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttachmentResponse>>, ApiError> {
    let actor = actor(&claims)?;
    let attachments = state.service.attachments(id.into(), &actor).await?;
    Ok(Json(attachments.into_iter().map(Into::into).collect()))
}
