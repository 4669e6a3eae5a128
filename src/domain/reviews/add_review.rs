//! Add Review slice

use axum::extract::State;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::catalog::Product;
use crate::domain::{ShopError, non_blank};
use crate::infra::{ApiResponse, ClientError, Payload};
use crate::store::Store;

use super::{NewReview, Review, is_verified_purchase, refresh_product_rating};

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewPayload {
    pub product_id: Option<String>,
    pub user_id: Option<String>,
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

pub async fn add_review_endpoint(
    State(store): State<Store>,
    Payload(payload): Payload<AddReviewPayload>,
) -> Result<ApiResponse<Review>, ClientError> {
    let review = add_review(&store, payload).await?;
    Ok(ApiResponse::new("Review added successfully", review))
}

//----------------------- Implementation --------------------------

pub async fn add_review(store: &Store, payload: AddReviewPayload) -> Result<Review, ShopError> {
    let product_id = non_blank(payload.product_id);
    let user_id = non_blank(payload.user_id);
    let comment = non_blank(payload.comment);

    let missing: Vec<&str> = [
        ("productId", product_id.is_none()),
        ("userId", user_id.is_none()),
        ("rating", payload.rating.is_none()),
        ("comment", comment.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();

    let (Some(product_id), Some(user_id), Some(rating), Some(comment)) =
        (product_id, user_id, payload.rating, comment)
    else {
        return Err(ShopError::invalid(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    };

    let rating = u8::try_from(rating)
        .ok()
        .filter(|rating| (1..=5).contains(rating))
        .ok_or_else(|| ShopError::invalid("Rating must be an integer between 1 and 5"))?;

    Product::find(store, &product_id).await?;
    let is_verified = is_verified_purchase(store, &user_id, &product_id).await?;

    let review = Review::repository(store)
        .create(&NewReview {
            review_id: Uuid::new_v4().to_string(),
            product_id,
            user_id,
            rating,
            title: non_blank(payload.title),
            comment,
            is_verified,
            helpful_count: 0,
        })
        .await?;

    let summary = refresh_product_rating(store, &review.product_id).await?;
    info!(
        product_id = %review.product_id,
        ratings = %summary.ratings,
        review_count = summary.review_count,
        "Review added"
    );
    Ok(review)
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::Entity;
    use crate::domain::catalog::NewProduct;
    use crate::store::MemoryStore;

    fn payload(product_id: &str, rating: i64) -> AddReviewPayload {
        AddReviewPayload {
            product_id: Some(product_id.to_owned()),
            user_id: Some("u1".to_owned()),
            rating: Some(rating),
            title: Some("Nice".to_owned()),
            comment: Some("Does what it says".to_owned()),
        }
    }

    #[tokio::test]
    async fn reviews_update_the_product_aggregate() {
        let store: Store = Arc::new(MemoryStore::new());
        let product = Faker.fake::<NewProduct>().insert(&store).await.unwrap();

        let review = add_review(&store, payload(&product.id, 5)).await.unwrap();
        add_review(&store, payload(&product.id, 4)).await.unwrap();
        add_review(&store, payload(&product.id, 4)).await.unwrap();

        assert!(!review.is_verified);
        assert_eq!(review.helpful_count, 0);
        let product = Product::find(&store, &product.id).await.unwrap();
        assert_eq!(product.ratings, Decimal::new(43, 1));
        assert_eq!(product.review_count, 3);
    }

    #[tokio::test]
    async fn every_missing_field_is_reported() {
        let store: Store = Arc::new(MemoryStore::new());

        let result = add_review(
            &store,
            AddReviewPayload {
                user_id: Some("u1".to_owned()),
                comment: Some("Great".to_owned()),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ShopError::Validation(m)) if m == "Missing required fields: productId, rating"
        ));
    }

    #[tokio::test]
    async fn ratings_outside_one_to_five_are_rejected() {
        let store: Store = Arc::new(MemoryStore::new());
        let product = Faker.fake::<NewProduct>().insert(&store).await.unwrap();

        for rating in [0, 6, -1] {
            assert!(matches!(
                add_review(&store, payload(&product.id, rating)).await,
                Err(ShopError::Validation(_))
            ));
        }
        assert!(matches!(
            add_review(&store, payload("missing", 3)).await,
            Err(ShopError::NotFound(Entity::Product))
        ));
    }
}
