//! Register slice

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{ShopError, non_blank};
use crate::identity::Identity;
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{NewUser, Role, User, find_by_email};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub fullname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredIdentity {
    pub uid: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub user: RegisteredIdentity,
    pub token: String,
}

pub async fn register_endpoint(
    State(store): State<Store>,
    State(identity): State<Identity>,
    Payload(payload): Payload<RegisterPayload>,
) -> Result<ApiResponse<Registration>, ClientError> {
    let registration = register(&store, &identity, payload).await?;
    Ok(ApiResponse::new("User registered successfully", registration))
}

//----------------------- Implementation --------------------------

pub async fn register(
    store: &Store,
    identity: &Identity,
    payload: RegisterPayload,
) -> Result<Registration, ShopError> {
    let (Some(email), Some(password), Some(fullname)) = (
        non_blank(payload.email),
        non_blank(payload.password),
        non_blank(payload.fullname),
    ) else {
        return Err(ShopError::invalid("Email, password, and name are required"));
    };

    if find_by_email(store, &email).await?.is_some() {
        return Err(ShopError::DuplicateUser);
    }

    let identity_user = identity.register(&email, &password, &fullname).await?;

    User::repository(store)
        .create(&NewUser {
            user_id: &identity_user.uid,
            email: &email,
            fullname: &fullname,
            role: Role::Customer,
        })
        .await?;

    let token = identity.issue_token(&identity_user.uid).await?;
    info!(uid = %identity_user.uid, "User registered");

    Ok(Registration {
        user: RegisteredIdentity {
            uid: identity_user.uid,
            email: identity_user.email,
            name: identity_user.display_name,
        },
        token,
    })
}

//-------------------------- Tests -------------------------------
