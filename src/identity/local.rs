use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::store::{Collection, Repository, Store};

use super::{
    IdentityError, IdentityProvider, IdentityUpdate, IdentityUser, TokenClaims, is_valid_email,
};

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credential {
    #[serde(default, skip_serializing)]
    id: String,
    uid: String,
    email: String,
    display_name: String,
    password_hash: String,
}

impl From<Credential> for IdentityUser {
    fn from(credential: Credential) -> Self {
        IdentityUser {
            uid: credential.uid,
            email: credential.email,
            display_name: credential.display_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    #[serde(default, skip_serializing)]
    id: String,
    token: String,
    uid: String,
    expires_at: Timestamp,
    revoked: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
}

#[derive(Serialize)]
struct Revoked {
    revoked: bool,
}

/// Password credentials hashed with argon2 and opaque session tokens, both kept in the document
/// store next to the shop data.
#[derive(Clone)]
pub struct LocalIdentityProvider {
    credentials: Repository<Credential>,
    sessions: Repository<Session>,
    token_ttl: SignedDuration,
}

impl LocalIdentityProvider {
    pub fn new(store: &Store, token_ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(token_ttl_seconds).unwrap_or(i64::MAX);
        Self {
            credentials: Repository::new(store, Collection::Credentials),
            sessions: Repository::new(store, Collection::Sessions),
            token_ttl: SignedDuration::from_secs(ttl),
        }
    }

    async fn credential_for_uid(&self, uid: &str) -> Result<Credential, IdentityError> {
        self.credentials
            .get_by_field("uid", uid)
            .await?
            .ok_or(IdentityError::UserNotFound)
    }
}

fn check_password_strength(password: &str) -> Result<(), IdentityError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(IdentityError::WeakPassword);
    }
    Ok(())
}

async fn hash_password(password: &str) -> Result<String, IdentityError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IdentityError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| IdentityError::Hashing(e.to_string()))?
}

async fn password_matches(hash: &str, password: &str) -> Result<bool, IdentityError> {
    let hash = hash.to_owned();
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(|e| IdentityError::Hashing(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(IdentityError::Hashing(e.to_string())),
        }
    })
    .await
    .map_err(|e| IdentityError::Hashing(e.to_string()))?
}

fn new_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    #[instrument(skip(self, password))]
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<IdentityUser, IdentityError> {
        if !is_valid_email(email) {
            return Err(IdentityError::InvalidEmail);
        }
        check_password_strength(password)?;

        let uid = uuid::Uuid::new_v4().simple().to_string();
        let credential = Credential {
            id: String::new(),
            uid: uid.clone(),
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            password_hash: hash_password(password).await?,
        };
        let stored = self
            .credentials
            .upsert_by_field("email", email, &credential)
            .await?;
        if stored.uid != uid {
            return Err(IdentityError::EmailAlreadyExists);
        }
        debug!(%uid, "Registered identity");
        Ok(stored.into())
    }

    #[instrument(skip(self, password))]
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let Some(credential) = self.credentials.get_by_field("email", email).await? else {
            return Err(IdentityError::InvalidCredentials);
        };
        if !password_matches(&credential.password_hash, password).await? {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(credential.into())
    }

    async fn issue_token(&self, uid: &str) -> Result<String, IdentityError> {
        let session = Session {
            id: String::new(),
            token: new_token(),
            uid: uid.to_owned(),
            expires_at: Timestamp::now()
                .checked_add(self.token_ttl)
                .unwrap_or(Timestamp::MAX),
            revoked: false,
        };
        let session = self.sessions.create(&session).await?;
        Ok(session.token)
    }

    async fn verify_token(&self, token: &str) -> Result<TokenClaims, IdentityError> {
        let Some(session) = self.sessions.get_by_field("token", token).await? else {
            return Err(IdentityError::InvalidToken);
        };
        if session.revoked {
            return Err(IdentityError::TokenRevoked);
        }
        if Timestamp::now() >= session.expires_at {
            return Err(IdentityError::TokenExpired);
        }
        Ok(TokenClaims { uid: session.uid })
    }

    #[instrument(skip(self, update))]
    async fn update_user(
        &self,
        uid: &str,
        update: &IdentityUpdate,
    ) -> Result<IdentityUser, IdentityError> {
        let mut credential = self.credential_for_uid(uid).await?;

        let password_hash = match update.password.as_deref() {
            Some(password) => {
                check_password_strength(password)?;
                Some(hash_password(password).await?)
            }
            None => None,
        };

        match update.email.as_deref() {
            Some(email) if email != credential.email => {
                if !is_valid_email(email) {
                    return Err(IdentityError::InvalidEmail);
                }
                // The email is the credential's unique key, so a new email means a new document.
                let moved = Credential {
                    display_name: update
                        .display_name
                        .clone()
                        .unwrap_or(credential.display_name.clone()),
                    password_hash: password_hash
                        .clone()
                        .unwrap_or(credential.password_hash.clone()),
                    email: email.to_owned(),
                    ..credential.clone()
                };
                let stored = self
                    .credentials
                    .upsert_by_field("email", email, &moved)
                    .await?;
                if stored.uid != uid {
                    return Err(IdentityError::EmailAlreadyExists);
                }
                self.credentials.delete(&credential.id).await?;
                credential = stored;
            }
            _ => {
                let patch = CredentialPatch {
                    display_name: update.display_name.as_deref(),
                    password_hash: password_hash.clone(),
                };
                credential = self
                    .credentials
                    .update(&credential.id, &patch)
                    .await?
                    .ok_or(IdentityError::UserNotFound)?;
            }
        }

        if password_hash.is_some() {
            self.revoke_tokens(uid).await?;
        }
        Ok(credential.into())
    }

    async fn revoke_tokens(&self, uid: &str) -> Result<(), IdentityError> {
        for session in self.sessions.find_many_by_field("uid", uid).await? {
            if !session.revoked {
                self.sessions
                    .update(&session.id, &Revoked { revoked: true })
                    .await?;
            }
        }
        Ok(())
    }
}
