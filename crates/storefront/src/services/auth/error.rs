//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// The first three variants come from verifying a bearer credential and are
/// always answered with 401. Their messages never include the credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header, or it is not `Bearer <token>`.
    #[error("No token provided")]
    MissingCredential,

    /// Token is malformed, expired, or has a bad signature.
    #[error("Invalid or expired token")]
    InvalidCredential,

    /// Token is valid but its subject no longer exists.
    #[error("User not found")]
    UnknownSubject,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] shoppy_globe_core::EmailError),

    /// Registration field missing or blank.
    #[error("{0}")]
    MissingField(String),

    /// Wrong password or unknown email on login.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Signing a token failed.
    #[error("token signing error: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Whether this error rejects a bearer credential (as opposed to a login attempt).
    #[must_use]
    pub const fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::InvalidCredential | Self::UnknownSubject
        )
    }
}
