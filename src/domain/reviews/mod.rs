mod add_review;
mod browse_reviews;
mod mark_helpful;
mod model;

pub use add_review::{AddReviewPayload, add_review, add_review_endpoint};
pub use browse_reviews::{get_review_endpoint, product_reviews, product_reviews_endpoint};
pub use mark_helpful::{MarkHelpfulPayload, mark_helpful, mark_helpful_endpoint};
pub use model::{
    NewReview, RatingSummary, Review, is_verified_purchase, refresh_product_rating,
};
