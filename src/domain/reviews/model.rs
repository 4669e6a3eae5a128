use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Product;
use crate::domain::{Entity, ShopError, round_tenths};
use crate::store::{Collection, Repository, Store};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub review_id: String,
    pub product_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub comment: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub helpful_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub review_id: String,
    pub product_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub comment: String,
    pub is_verified: bool,
    pub helpful_count: i64,
}

impl Review {
    pub fn repository(store: &Store) -> Repository<Review> {
        Repository::new(store, Collection::Reviews)
    }

    pub async fn find(store: &Store, id: &str) -> Result<Review, ShopError> {
        Review::repository(store)
            .get_by_id(id)
            .await?
            .ok_or(ShopError::NotFound(Entity::Review))
    }

    pub async fn for_product(store: &Store, product_id: &str) -> Result<Vec<Review>, ShopError> {
        Ok(Review::repository(store)
            .find_many_by_field("productId", product_id)
            .await?)
    }
}

/// Mean rating to one decimal place and the number of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub ratings: Decimal,
    pub review_count: i64,
}

impl RatingSummary {
    pub fn of(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return RatingSummary {
                ratings: Decimal::ZERO,
                review_count: 0,
            };
        }
        let count = reviews.len() as i64;
        let sum: i64 = reviews.iter().map(|review| i64::from(review.rating)).sum();
        RatingSummary {
            ratings: round_tenths(Decimal::from(sum) / Decimal::from(count)),
            review_count: count,
        }
    }
}

/// Re-reads every review of the product and writes the aggregate back onto it.
pub async fn refresh_product_rating(
    store: &Store,
    product_id: &str,
) -> Result<RatingSummary, ShopError> {
    let summary = RatingSummary::of(&Review::for_product(store, product_id).await?);
    Product::repository(store)
        .update(product_id, &summary)
        .await?
        .ok_or(ShopError::NotFound(Entity::Product))?;
    Ok(summary)
}

/// Whether the user bought the product.
// TODO: look for a delivered order of this user that contains the product.
pub async fn is_verified_purchase(
    _store: &Store,
    _user_id: &str,
    _product_id: &str,
) -> Result<bool, ShopError> {
    Ok(false)
}
