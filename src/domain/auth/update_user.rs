//! Update identity user slice

use axum::extract::{Path, State};
use serde::Serialize;

use crate::domain::ShopError;
use crate::identity::{Identity, IdentityUpdate, IdentityUser};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{AuthUser, User, UserPatch, find_by_user_id};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedUser {
    pub user: IdentityUser,
}

pub async fn update_user_endpoint(
    State(store): State<Store>,
    State(identity): State<Identity>,
    caller: AuthUser,
    Path(uid): Path<String>,
    Payload(update): Payload<IdentityUpdate>,
) -> Result<ApiResponse<UpdatedUser>, ClientError> {
    if caller.uid != uid && !caller.is_admin() {
        return Err(ClientError::Forbidden("Insufficient permissions".to_owned()));
    }
    let user = update_user(&store, &identity, &uid, &update).await?;
    Ok(ApiResponse::new("User updated successfully", UpdatedUser { user }))
}

//----------------------- Implementation --------------------------

/// Forwards the update to the identity provider, then mirrors email and display name onto the
/// shop profile.
pub async fn update_user(
    store: &Store,
    identity: &Identity,
    uid: &str,
    update: &IdentityUpdate,
) -> Result<IdentityUser, ShopError> {
    let updated = identity.update_user(uid, update).await?;

    if update.email.is_some() || update.display_name.is_some() {
        if let Some(profile) = find_by_user_id(store, uid).await? {
            let patch = UserPatch {
                email: update.email.clone(),
                fullname: update.display_name.clone(),
                ..Default::default()
            };
            User::repository(store).update(&profile.id, &patch).await?;
        }
    }
    Ok(updated)
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::auth::{RegisterPayload, register};
    use crate::identity::LocalIdentityProvider;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn display_name_changes_reach_the_profile() {
        let store: Store = Arc::new(MemoryStore::new());
        let identity: Identity = Arc::new(LocalIdentityProvider::new(&store, 3600));
        let registration = register(
            &store,
            &identity,
            RegisterPayload {
                email: Some("jane@example.com".to_owned()),
                password: Some("secret-pw".to_owned()),
                fullname: Some("Jane".to_owned()),
            },
        )
        .await
        .unwrap();

        let updated = update_user(
            &store,
            &identity,
            &registration.user.uid,
            &IdentityUpdate {
                display_name: Some("Jane Doe".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.display_name, "Jane Doe");
        let profile = find_by_user_id(&store, &registration.user.uid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.fullname, "Jane Doe");
        assert_eq!(profile.email, "jane@example.com");
    }
}
