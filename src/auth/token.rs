//! Access token issue and validation.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account email
    pub exp: i64,
    pub iat: i64,
}

/// Issues and validates bearer tokens signed with a single process-wide
/// secret loaded at startup. Validation is pure: no store or network access.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    /// Sign a token asserting `subject`, expiring one TTL from now.
    pub fn issue(&self, subject: &str) -> AppResult<String> {
        let now = self.clock.now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("encode token: {}", e)))?;
        Ok(token)
    }

    /// Recover the subject. Bad structure or signature is `TokenInvalid`; a
    /// well-formed token past its expiry is `TokenExpired`.
    pub fn validate(&self, token: &str) -> AppResult<String> {
        let mut validation = Validation::default();
        // Expiry is checked against the injected clock below, not the
        // library's wall clock.
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::TokenInvalid)?;
        if self.clock.now().timestamp() > data.claims.exp {
            return Err(AppError::TokenExpired);
        }
        Ok(data.claims.sub)
    }
}
