//! In-process account store with the same contract as PostgreSQL.
//!
//! Backs the test suites and local runs that have no database at hand.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::{Account, AccountStore};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        verification_code: &str,
    ) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.email == email) {
            return Err(AppError::AlreadyExists);
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            verification_code: Some(verification_code.to_string()),
            created_at: Utc::now(),
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn clear_verification_code(&self, id: Uuid, expected_code: &str) -> AppResult<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get_mut(&id) {
            Some(account) if account.verification_code.as_deref() == Some(expected_code) => {
                account.verification_code = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
