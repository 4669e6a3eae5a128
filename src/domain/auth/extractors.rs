use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::domain::{Entity, ShopError};
use crate::identity::Identity;
use crate::infra::ClientError;
use crate::store::Store;

use super::{User, find_by_user_id};

/// A request carrying a valid bearer token whose subject has a shop profile.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub profile: User,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ClientError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ClientError::Unauthorized("Authorization header is required".to_owned()))?;
    let header = header
        .to_str()
        .map_err(|_| ClientError::Unauthorized("Invalid token".to_owned()))?;
    header
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ClientError::Unauthorized("Token is required".to_owned()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Store: FromRef<S>,
    Identity: FromRef<S>,
{
    type Rejection = ClientError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = Identity::from_ref(state).verify_token(token).await?;
        let profile = find_by_user_id(&Store::from_ref(state), &claims.uid)
            .await?
            .ok_or(ShopError::NotFound(Entity::User))?;
        Ok(AuthUser {
            uid: claims.uid,
            profile,
        })
    }
}

/// An [`AuthUser`] whose profile has the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Store: FromRef<S>,
    Identity: FromRef<S>,
{
    type Rejection = ClientError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ClientError::Forbidden("Insufficient permissions".to_owned()));
        }
        Ok(AdminUser(user))
    }
}
