use fake::{Dummy, Fake, Faker, rand::seq::IteratorRandom};
use rust_decimal::Decimal;

use crate::domain::catalog::NewProduct;

pub struct Price;

impl Dummy<Price> for Decimal {
    fn dummy_with_rng<R: fake::Rng + ?Sized>(_config: &Price, rng: &mut R) -> Self {
        let cents = (100..10_000).choose(rng).unwrap_or(1999);
        Decimal::new(cents, 2)
    }
}

/// An active, in-stock product with a random name and price.
impl Dummy<Faker> for NewProduct {
    fn dummy_with_rng<R: fake::Rng + ?Sized>(_config: &Faker, rng: &mut R) -> Self {
        let words: Vec<String> = fake::faker::lorem::en::Words(2..4).fake_with_rng(rng);
        let image: u32 = (1..1000u32).fake_with_rng(rng);
        NewProduct {
            name: words.join(" "),
            description: fake::faker::lorem::en::Sentence(4..10).fake_with_rng(rng),
            price: Price.fake_with_rng(rng),
            stock: (5..50i64).fake_with_rng(rng),
            category: "General".to_owned(),
            images: vec![format!("https://img.example.com/{image}.jpg")],
            set_trending: false,
            is_active: true,
        }
    }
}
