//! Bearer-token extractor for authenticated routes.

use axum::http::header::AUTHORIZATION;

use crate::error::AppError;
use crate::handlers::http::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor: authenticated subject email from a Bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser(pub String);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix(BEARER_PREFIX))
            .ok_or(AppError::TokenInvalid)?;
        let email = state.auth().tokens().validate(token)?;
        Ok(AuthUser(email))
    }
}
