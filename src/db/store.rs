//! Account persistence: the store contract and its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::DbPool;

/// A stored account. Treated as an immutable value: the password hash never
/// changes after creation, and the only transition in the account lifecycle
/// is clearing the verification code, done through the store.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// Present while the account is pending verification; `None` once verified.
    pub verification_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_verified(&self) -> bool {
        self.verification_code.is_none()
    }
}

/// Keyed persistence of accounts. The unique constraint on email is the only
/// concurrency guard registration relies on.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Persist a new pending account. Fails `AppError::AlreadyExists` when an
    /// account with this email exists, in any state.
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        verification_code: &str,
    ) -> AppResult<Account>;

    /// Clear the verification code if the committed row still holds exactly
    /// `expected_code`. Returns whether a row changed, so a caller racing an
    /// earlier clear sees `false` rather than a second success.
    async fn clear_verification_code(&self, id: Uuid, expected_code: &str) -> AppResult<bool>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, verification_code, created_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        verification_code: &str,
    ) -> AppResult<Account> {
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password_hash, verification_code)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, verification_code, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(verification_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // 23505: unique violation on accounts.email
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::AlreadyExists
            }
            _ => AppError::Db(e),
        })?;
        Ok(row)
    }

    async fn clear_verification_code(&self, id: Uuid, expected_code: &str) -> AppResult<bool> {
        let r = sqlx::query(
            "UPDATE accounts SET verification_code = NULL WHERE id = $1 AND verification_code = $2",
        )
        .bind(id)
        .bind(expected_code)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected() == 1)
    }
}
