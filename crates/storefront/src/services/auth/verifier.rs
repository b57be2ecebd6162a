//! Bearer credential verification.
//!
//! Turns the raw `Authorization` header value into an [`Identity`]. Cart
//! endpoints call this before anything else; on failure the request is
//! rejected without touching the cart store.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tracing::debug;

use shoppy_globe_core::UserId;

use super::AuthError;
use super::token::Claims;
use crate::db::UserStore;
use crate::models::Identity;

const BEARER_PREFIX: &str = "Bearer ";

/// Verifies HS256 bearer tokens and resolves their subject.
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
    users: Arc<dyn UserStore>,
}

impl IdentityVerifier {
    #[must_use]
    pub fn new(secret: &[u8], users: Arc<dyn UserStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            users,
        }
    }

    /// Verify a credential taken from the `Authorization` header.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredential` if absent or not `Bearer <token>`
    /// - `AuthError::InvalidCredential` if the token fails decoding, signature or
    ///   expiry checks, or its subject is not a user ID
    /// - `AuthError::UnknownSubject` if the user no longer exists
    /// - `AuthError::Repository` if the user lookup fails
    pub async fn verify(&self, credential: Option<&str>) -> Result<Identity, AuthError> {
        let token = credential
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| {
                debug!(kind = ?e.kind(), "Bearer token rejected");
                AuthError::InvalidCredential
            })?;

        let user_id: UserId = data
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidCredential)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        Ok(Identity::from(&user))
    }
}
