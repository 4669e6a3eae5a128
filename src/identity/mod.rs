//! Identity provider seam.
//!
//! Credentials and bearer tokens belong to the identity provider; shop profiles (`users`
//! collection) only reference the provider's `uid`.

mod local;

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::StoreError;

pub use local::LocalIdentityProvider;

pub type Identity = Arc<dyn IdentityProvider>;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub uid: String,
}

/// Changes forwarded to the provider. `None` leaves a value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Email already in use")]
    EmailAlreadyExists,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password should be at least 6 characters")]
    WeakPassword,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token revoked")]
    TokenRevoked,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<IdentityUser, IdentityError>;

    /// Checks an email/password pair, returning the matching user.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, IdentityError>;

    async fn issue_token(&self, uid: &str) -> Result<String, IdentityError>;

    async fn verify_token(&self, token: &str) -> Result<TokenClaims, IdentityError>;

    async fn update_user(
        &self,
        uid: &str,
        update: &IdentityUpdate,
    ) -> Result<IdentityUser, IdentityError>;

    /// Revokes every outstanding token of the user.
    async fn revoke_tokens(&self, uid: &str) -> Result<(), IdentityError>;
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format_checks() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("j.doe+shop@mail.example.co.uk"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@localhost"));
        assert!(!is_valid_email("jane@example.com."));
        assert!(!is_valid_email("ja ne@example.com"));
        assert!(!is_valid_email("jane@ex@ample.com"));
    }
}
