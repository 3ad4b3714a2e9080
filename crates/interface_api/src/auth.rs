//! Authentication and identity extraction
//!
//! Bearer tokens carry the acting user and their permission codenames; the
//! middleware validates the token and handlers turn the claims into an
//! explicit [`Actor`] that is passed into every engine operation. Nothing
//! below the HTTP layer reads ambient identity.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::UserId;
use domain_claims::{Actor, Permission};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Permission codenames granted to the user
    pub permissions: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl TokenClaims {
    /// Builds the engine-facing actor from the token
    ///
    /// Unknown permission codenames are skipped, so tokens minted by a
    /// newer identity service still authenticate here.
    pub fn actor(&self) -> Result<Actor, AuthError> {
        let user_id: UserId = self.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let permissions = self
            .permissions
            .iter()
            .filter_map(|p| p.parse::<Permission>().ok());
        Ok(Actor::new(user_id, permissions))
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Creates a new JWT token
pub fn create_token(
    user_id: UserId,
    permissions: &[Permission],
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = TokenClaims {
        sub: user_id.to_string(),
        permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims, AuthError> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
