//! Account state machine: register, verify email, login.

use std::sync::Arc;

use tracing::warn;

use crate::auth::code::CodeGenerator;
use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenIssuer;
use crate::db::{Account, AccountStore};
use crate::email::Notifier;
use crate::error::{AppError, AppResult};

const VERIFICATION_SUBJECT: &str = "Your verification code";

/// Orchestrates the account lifecycle `PendingVerification -> Verified` over
/// the credential store. Holds no state of its own; concurrent registrations
/// are arbitrated by the store's unique email constraint.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    codes: Arc<dyn CodeGenerator>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        codes: Arc<dyn CodeGenerator>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            store,
            notifier,
            codes,
            tokens,
        }
    }

    /// Create a pending account and mail it a verification code. Delivery is
    /// best-effort: a failed send is logged and the registration stands.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<()> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AppError::AlreadyExists);
        }

        let password_hash = PasswordHasher::hash(password)?;
        let code = self.codes.generate();
        // The insert can still race a concurrent registration; the store's
        // unique constraint reports the loser as AlreadyExists.
        let account = self.store.insert(email, &password_hash, &code).await?;

        let body = format!("Your verification code: {}", code);
        if let Err(err) = self
            .notifier
            .send(&account.email, VERIFICATION_SUBJECT, &body)
            .await
        {
            warn!(email = %account.email, error = %err, "failed to deliver verification code");
        }
        Ok(())
    }

    /// Clear the stored code on an exact match. The clear is conditional on
    /// the committed code, so a raced duplicate observes `InvalidCode`.
    pub async fn verify_email(&self, email: &str, code: &str) -> AppResult<()> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AppError::NotFound)?;

        match account.verification_code.as_deref() {
            Some(stored) if stored == code => {}
            _ => return Err(AppError::InvalidCode),
        }

        if !self.store.clear_verification_code(account.id, code).await? {
            return Err(AppError::InvalidCode);
        }
        Ok(())
    }

    /// Issue a bearer token for valid credentials. Unknown email and wrong
    /// password are indistinguishable to the caller. An account still pending
    /// verification may log in.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !PasswordHasher::verify(password, &account.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        self.tokens.issue(&account.email)
    }

    /// Look up the account backing an authenticated subject.
    pub async fn account(&self, email: &str) -> AppResult<Account> {
        self.store
            .find_by_email(email)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::db::MemoryAccountStore;
    use crate::email::MockNotifier;
    use chrono::Duration;

    /// Deterministic code source for exercising the verify path.
    struct FixedCodes(&'static str);

    impl CodeGenerator for FixedCodes {
        fn generate(&self) -> String {
            self.0.to_string()
        }
    }

    fn service_with(
        notifier: Arc<MockNotifier>,
        codes: Arc<dyn CodeGenerator>,
    ) -> (AuthService, Arc<MemoryAccountStore>) {
        let store = Arc::new(MemoryAccountStore::new());
        let tokens = TokenIssuer::new(
            "test-jwt-secret-min-32-chars!!",
            Duration::minutes(30),
            Arc::new(SystemClock),
        );
        let service = AuthService::new(store.clone(), notifier, codes, tokens);
        (service, store)
    }

    fn service() -> (AuthService, Arc<MemoryAccountStore>, Arc<MockNotifier>) {
        let notifier = Arc::new(MockNotifier::new());
        let (service, store) = service_with(notifier.clone(), Arc::new(FixedCodes("ABC123")));
        (service, store, notifier)
    }

    #[tokio::test]
    async fn register_stores_verifying_hash_and_mails_code() {
        let (service, store, notifier) = service();
        service
            .register("user@example.com", "password123")
            .await
            .unwrap();

        let account = store
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(account.password_hash, "password123");
        assert!(PasswordHasher::verify("password123", &account.password_hash));
        assert!(!account.is_verified());

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user@example.com");
        assert!(sent[0].body.contains("ABC123"));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_regardless_of_password() {
        let (service, _, _) = service();
        service
            .register("user@example.com", "password123")
            .await
            .unwrap();
        let err = service
            .register("user@example.com", "different-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists));
    }

    #[tokio::test]
    async fn register_survives_delivery_failure() {
        let notifier = Arc::new(MockNotifier::failing());
        let (service, store) = service_with(notifier, Arc::new(FixedCodes("ABC123")));
        service
            .register("user@example.com", "password123")
            .await
            .unwrap();
        assert!(store
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn verify_clears_code_exactly_once() {
        let (service, store, _) = service();
        service
            .register("user@example.com", "password123")
            .await
            .unwrap();

        service
            .verify_email("user@example.com", "ABC123")
            .await
            .unwrap();
        let account = store
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(account.is_verified());

        let err = service
            .verify_email("user@example.com", "ABC123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCode));
    }

    #[tokio::test]
    async fn verify_rejects_wrong_code_and_leaves_account_unchanged() {
        let (service, store, _) = service();
        service
            .register("user@example.com", "password123")
            .await
            .unwrap();

        let err = service
            .verify_email("user@example.com", "ZZZZZZ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCode));

        let account = store
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.verification_code.as_deref(), Some("ABC123"));
    }

    #[tokio::test]
    async fn verify_unknown_email_is_not_found() {
        let (service, _, _) = service();
        let err = service
            .verify_email("nobody@example.com", "ABC123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn login_pending_account_gets_valid_token() {
        let (service, _, _) = service();
        service
            .register("user@example.com", "password123")
            .await
            .unwrap();

        // Not verified yet; login is still permitted.
        let token = service
            .login("user@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(service.tokens().validate(&token).unwrap(), "user@example.com");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (service, _, _) = service();
        service
            .register("user@example.com", "password123")
            .await
            .unwrap();

        let wrong_password = service
            .login("user@example.com", "wrong-password")
            .await
            .unwrap_err();
        let unknown_email = service
            .login("nobody@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn concurrent_register_has_single_winner() {
        let (service, _, _) = service();
        let first = service.clone();
        let second = service.clone();

        let (a, b) = tokio::join!(
            first.register("race@example.com", "password-one"),
            second.register("race@example.com", "password-two"),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let err = if a.is_err() {
            a.unwrap_err()
        } else {
            b.unwrap_err()
        };
        assert!(matches!(err, AppError::AlreadyExists));
    }
}
