//! Mark Review Helpful slice

use axum::extract::{Path, State};
use serde::Deserialize;

use crate::domain::{Entity, ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::{CounterAdjustment, Store};

use super::Review;

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkHelpfulPayload {
    pub user_id: Option<String>,
}

pub async fn mark_helpful_endpoint(
    State(store): State<Store>,
    Path(id): Path<String>,
    Payload(payload): Payload<MarkHelpfulPayload>,
) -> Result<ApiResponse<Review>, ClientError> {
    let review = mark_helpful(&store, &id, payload).await?;
    Ok(ApiResponse::new("Review marked as helpful", review))
}

//----------------------- Implementation --------------------------

/// Repeat votes by the same user all count.
pub async fn mark_helpful(
    store: &Store,
    id: &str,
    payload: MarkHelpfulPayload,
) -> Result<Review, ShopError> {
    if non_blank(payload.user_id).is_none() {
        return Err(ShopError::invalid("User ID is required"));
    }
    let reviews = Review::repository(store);
    Review::find(store, id).await?;
    reviews
        .adjust_counters("helpfulCount", &[CounterAdjustment::new(id, 1)])
        .await?;
    reviews
        .get_by_id(id)
        .await?
        .ok_or(ShopError::NotFound(Entity::Review))
}

//-------------------------- Tests -------------------------------
