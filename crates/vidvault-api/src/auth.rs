//! Bearer-token authentication.
//!
//! Every upload route requires a JWT signed with the shared HS256 secret.
//! The subject claim carries the user id; ownership of the target video is
//! checked later by the pipeline, this layer only establishes identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use vidvault_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a UUID string.
    pub sub: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Validate a bearer token and return its claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("invalid bearer token: {}", e)))
}

/// The authenticated caller, extracted from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("missing Authorization header".to_string())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Authorization header must use the Bearer scheme".to_string())
        })?;

        let claims = validate_token(token, &state.config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AppError::Unauthorized("token subject is not a valid user id".to_string())
        })?;

        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn token_for(sub: &str, exp: u64, secret: &str) -> String {
        encode(
            &Header::default(),
            &Claims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode token")
    }

    #[test]
    fn test_valid_token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = token_for(&user_id.to_string(), get_current_timestamp() + 3600, SECRET);
        let claims = validate_token(&token, SECRET).expect("valid token");
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = token_for(
            &Uuid::new_v4().to_string(),
            get_current_timestamp() - 3600,
            SECRET,
        );
        let err = validate_token(&token, SECRET).expect_err("must reject");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_for(
            &Uuid::new_v4().to_string(),
            get_current_timestamp() + 3600,
            "another-secret-another-secret-32",
        );
        let err = validate_token(&token, SECRET).expect_err("must reject");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = validate_token("not.a.jwt", SECRET).expect_err("must reject");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
