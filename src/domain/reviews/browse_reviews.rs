//! Browse Reviews slice

use std::cmp::Reverse;

use axum::extract::{Path, State};

use crate::domain::ShopError;
use crate::infra::{ApiResponse, ClientError};
use crate::store::Store;

use super::Review;

//------------------------- Web API ----------------------------

pub async fn product_reviews_endpoint(
    State(store): State<Store>,
    Path(product_id): Path<String>,
) -> Result<ApiResponse<Vec<Review>>, ClientError> {
    let reviews = product_reviews(&store, &product_id).await?;
    Ok(ApiResponse::new("Reviews retrieved successfully", reviews))
}

pub async fn get_review_endpoint(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Review>, ClientError> {
    let review = Review::find(&store, &id).await?;
    Ok(ApiResponse::new("Review retrieved successfully", review))
}

//----------------------- Implementation --------------------------

/// Newest first.
pub async fn product_reviews(store: &Store, product_id: &str) -> Result<Vec<Review>, ShopError> {
    let mut reviews = Review::for_product(store, product_id).await?;
    reviews.sort_by_key(|review| Reverse(review.created_at));
    Ok(reviews)
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fake::{Fake, Faker};

    use super::*;
    use crate::domain::Entity;
    use crate::domain::catalog::NewProduct;
    use crate::domain::reviews::{AddReviewPayload, add_review};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn only_the_products_reviews_are_listed() {
        let store: Store = Arc::new(MemoryStore::new());
        let reviewed = Faker.fake::<NewProduct>().insert(&store).await.unwrap();
        let other = Faker.fake::<NewProduct>().insert(&store).await.unwrap();
        let reviews = [
            (&reviewed, "first"),
            (&other, "elsewhere"),
            (&reviewed, "second"),
        ];
        for (product, comment) in reviews {
            add_review(
                &store,
                AddReviewPayload {
                    product_id: Some(product.id.clone()),
                    user_id: Some("u1".to_owned()),
                    rating: Some(3),
                    comment: Some(comment.to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let reviews = product_reviews(&store, &reviewed.id).await.unwrap();

        let mut comments: Vec<&str> = reviews.iter().map(|r| r.comment.as_str()).collect();
        comments.sort_unstable();
        assert_eq!(comments, ["first", "second"]);
        assert!(matches!(
            Review::find(&store, "missing").await,
            Err(ShopError::NotFound(Entity::Review))
        ));
    }
}
