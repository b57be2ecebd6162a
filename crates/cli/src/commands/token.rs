//! Development bearer tokens.
//!
//! Tokens are signed with `STOREFRONT_JWT_SECRET`, the same key the server
//! verifies with. The server still checks that the user exists, so the ID
//! must belong to a registered account.

use std::time::Duration;

use secrecy::ExposeSecret;

use shoppy_globe_core::UserId;
use shoppy_globe_storefront::services::TokenIssuer;

/// Print a signed token for `user_id` to stdout.
///
/// # Errors
///
/// Returns an error if the secret is not set or signing fails.
pub fn issue(user_id: i32, ttl_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let secret = std::env::var("STOREFRONT_JWT_SECRET")
        .map(secrecy::SecretString::from)
        .map_err(|_| "STOREFRONT_JWT_SECRET not set")?;

    let issuer = TokenIssuer::new(
        secret.expose_secret().as_bytes(),
        Duration::from_secs(ttl_secs),
    );
    let token = issuer.issue(UserId::new(user_id))?;

    tracing::info!(%user_id, ttl_secs, "Issued token");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
