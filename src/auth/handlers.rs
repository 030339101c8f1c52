//! Auth HTTP handlers: register, verify email, login, current account.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub email: String,
    pub verified: bool,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    state.auth().register(&body.email, &body.password).await?;
    Ok(Json(MessageResponse {
        message: "Registration successful. A verification code has been sent to your email."
            .to_string(),
    }))
}

/// POST /auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth().verify_email(&body.email, &body.code).await?;
    Ok(Json(MessageResponse {
        message: "Email verified.".to_string(),
    }))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let access_token = state.auth().login(&body.email, &body.password).await?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.auth().account(&email).await?;
    let verified = account.is_verified();
    Ok(Json(AccountResponse {
        email: account.email,
        verified,
    }))
}
