//! Authentication service.
//!
//! Password accounts and bearer tokens. [`AuthService`] registers users and
//! exchanges email/password for a signed token; [`IdentityVerifier`] turns
//! that token back into an [`Identity`](crate::models::Identity) on every
//! authenticated request.

mod error;
mod token;
mod verifier;

pub use error::AuthError;
pub use token::{Claims, TokenIssuer};
pub use verifier::IdentityVerifier;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use shoppy_globe_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Authentication service.
///
/// Handles user registration and password login.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Register a new user with name, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if the name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("Name is required".to_string()));
        }

        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&NewUser {
                name: name.to_owned(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, returning a fresh bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        // An unparseable email can't belong to anyone.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .find_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(user.id)?;
        Ok(LoginOutcome { token, user })
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::MemoryStore;

    const SECRET: &[u8] = b"k3J9vQ2mX7pL4wR8tY1zN6bH5cF0dG2s";

    fn service() -> (AuthService, IdentityVerifier) {
        let store = Arc::new(MemoryStore::default());
        let tokens = TokenIssuer::new(SECRET, Duration::from_secs(600));
        (
            AuthService::new(store.clone(), tokens),
            IdentityVerifier::new(SECRET, store),
        )
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("12345678").is_ok());
    }

    #[tokio::test]
    async fn test_register_then_login_yields_verifiable_token() {
        let (auth, verifier) = service();
        let user = auth
            .register("Grace", "Grace@Example.com", "hopper1906")
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "grace@example.com");

        let outcome = auth.login("grace@example.com", "hopper1906").await.unwrap();
        let identity = verifier
            .verify(Some(&format!("Bearer {}", outcome.token)))
            .await
            .unwrap();
        assert_eq!(identity.id, user.id);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (auth, _) = service();
        assert!(matches!(
            auth.register("  ", "a@example.com", "password1").await,
            Err(AuthError::MissingField(_))
        ));
        assert!(matches!(
            auth.register("A", "not-an-email", "password1").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register("A", "a@example.com", "pw").await,
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let (auth, _) = service();
        auth.register("A", "dup@example.com", "password1")
            .await
            .unwrap();
        assert!(matches!(
            auth.register("B", "DUP@example.com", "password2").await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (auth, _) = service();
        auth.register("A", "a@example.com", "password1")
            .await
            .unwrap();

        let wrong_password = auth.login("a@example.com", "password2").await.unwrap_err();
        let unknown_email = auth.login("b@example.com", "password1").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    }
}
