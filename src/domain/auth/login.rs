//! Login slice

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::domain::{ShopError, non_blank};
use crate::identity::{Identity, IdentityError};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{Role, find_by_email};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedInUser {
    pub id: String,
    pub uid: String,
    pub email: String,
    pub fullname: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Login {
    pub user: SignedInUser,
    pub token: String,
}

pub async fn login_endpoint(
    State(store): State<Store>,
    State(identity): State<Identity>,
    Payload(payload): Payload<LoginPayload>,
) -> Result<ApiResponse<Login>, ClientError> {
    let login = login(&store, &identity, payload).await?;
    Ok(ApiResponse::new("Login successful", login))
}

//----------------------- Implementation --------------------------

pub async fn login(
    store: &Store,
    identity: &Identity,
    payload: LoginPayload,
) -> Result<Login, ShopError> {
    let (Some(email), Some(password)) = (non_blank(payload.email), non_blank(payload.password))
    else {
        return Err(ShopError::invalid("Email and password are required"));
    };

    let Some(profile) = find_by_email(store, &email).await? else {
        return Err(IdentityError::InvalidCredentials.into());
    };
    let identity_user = identity.verify_credentials(&email, &password).await?;
    let token = identity.issue_token(&identity_user.uid).await?;

    Ok(Login {
        user: SignedInUser {
            id: profile.id,
            uid: identity_user.uid,
            email: profile.email,
            fullname: profile.fullname,
            role: profile.role,
        },
        token,
    })
}

//-------------------------- Tests -------------------------------
