//! Shop user profiles. Credentials live with the identity provider; a profile links to it through
//! `userId`.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::{Entity, ShopError};
use crate::store::{Collection, Repository, Store};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub fullname: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<UserAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl User {
    pub fn repository(store: &Store) -> Repository<User> {
        Repository::new(store, Collection::Users)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub fullname: &'a str,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

pub async fn find_by_email(store: &Store, email: &str) -> Result<Option<User>, ShopError> {
    Ok(User::repository(store).get_by_field("email", email).await?)
}

pub async fn find_by_user_id(store: &Store, user_id: &str) -> Result<Option<User>, ShopError> {
    Ok(User::repository(store)
        .get_by_field("userId", user_id)
        .await?)
}

/// Promotes the profile registered under `email` to the admin role.
pub async fn grant_admin(store: &Store, email: &str) -> Result<User, ShopError> {
    let user = find_by_email(store, email)
        .await?
        .ok_or(ShopError::NotFound(Entity::User))?;
    let patch = UserPatch {
        role: Some(Role::Admin),
        ..Default::default()
    };
    User::repository(store)
        .update(&user.id, &patch)
        .await?
        .ok_or(ShopError::NotFound(Entity::User))
}
