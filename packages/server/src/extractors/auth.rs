use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated caller extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require an identity. Ownership of the
/// course being touched is checked separately by the course guard.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Opaque caller identity issued by the identity provider.
    pub user_id: String,
}

impl AuthUser {
    /// Wrap an identity that was already authenticated elsewhere.
    ///
    /// Returns `TokenMissing` for a blank identity.
    pub fn from_identity(user_id: impl Into<String>) -> Result<Self, AppError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(AppError::TokenMissing);
        }
        Ok(Self { user_id })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims =
            jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

        AuthUser::from_identity(claims.sub).map_err(|_| AppError::TokenInvalid)
    }
}
