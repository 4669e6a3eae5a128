use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::catalog::Product;
use crate::domain::{Entity, ShopError, round_cents};
use crate::store::{Collection, Repository, Store};

/// How often a cart mutation is retried when another request saved the cart in between.
const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price when the line was first added.
    pub price: Decimal,
    pub added_at: Timestamp,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub item_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartContents<'a> {
    items: &'a [CartItem],
    total_amount: Decimal,
    item_count: i64,
}

impl Cart {
    pub fn repository(store: &Store) -> Repository<Cart> {
        Repository::new(store, Collection::Carts)
    }

    /// The user's cart, created empty on first access.
    pub async fn get_or_create(store: &Store, user_id: &str) -> Result<Cart, ShopError> {
        let empty = CartContents {
            items: &[],
            total_amount: Decimal::ZERO,
            item_count: 0,
        };
        Ok(Cart::repository(store)
            .upsert_by_field("userId", user_id, &empty)
            .await?)
    }

    pub async fn find_for_user(store: &Store, user_id: &str) -> Result<Option<Cart>, ShopError> {
        Ok(Cart::repository(store)
            .get_by_field("userId", user_id)
            .await?)
    }

    pub async fn for_user(store: &Store, user_id: &str) -> Result<Cart, ShopError> {
        Cart::find_for_user(store, user_id)
            .await?
            .ok_or(ShopError::NotFound(Entity::Cart))
    }

    pub fn line(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Adds `quantity` of the product. An existing line keeps its original unit price.
    pub fn add(&mut self, product: &Product, quantity: i64) {
        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem {
                product_id: product.id.clone(),
                quantity,
                price: product.price,
                added_at: Timestamp::now(),
            }),
        }
        self.recalculate_totals();
    }

    /// Replaces the line quantity; zero or less removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), ShopError> {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or(ShopError::ItemNotInCart)?;
        item.quantity = quantity;
        self.recalculate_totals();
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> Result<(), ShopError> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)
            .ok_or(ShopError::ItemNotInCart)?;
        self.items.remove(index);
        self.recalculate_totals();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate_totals();
    }

    pub fn recalculate_totals(&mut self) {
        self.total_amount = round_cents(self.items.iter().map(CartItem::line_total).sum());
        self.item_count = self.items.iter().map(|item| item.quantity).sum();
    }

    /// Applies `change` and saves the cart, provided nobody else saved it since it was read.
    /// On a lost race the cart is re-read and `change` applied again.
    pub async fn modify<F>(mut self, store: &Store, mut change: F) -> Result<Cart, ShopError>
    where
        F: FnMut(&mut Cart) -> Result<(), ShopError> + Send,
    {
        let carts = Cart::repository(store);
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let read_at = self
                .updated_at
                .map(|at| Value::String(at.to_string()))
                .unwrap_or(Value::Null);
            change(&mut self)?;
            let contents = CartContents {
                items: &self.items,
                total_amount: self.total_amount,
                item_count: self.item_count,
            };
            if let Some(saved) = carts
                .update_if(&self.id, "updatedAt", read_at, &contents)
                .await?
            {
                return Ok(saved);
            }
            debug!(cart_id = %self.id, attempt, "Cart changed while updating, retrying");
            self = carts
                .get_by_id(&self.id)
                .await?
                .ok_or(ShopError::NotFound(Entity::Cart))?;
        }
        Err(ShopError::ConcurrentUpdate(Entity::Cart))
    }

    /// Empties the user's cart if there is one.
    pub async fn clear_for_user(store: &Store, user_id: &str) -> Result<(), ShopError> {
        if let Some(cart) = Cart::find_for_user(store, user_id).await? {
            cart.modify(store, |cart| {
                cart.clear();
                Ok(())
            })
            .await?;
        }
        Ok(())
    }
}

/// Live product details shown next to a cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<String>,
    pub current_price: Decimal,
    pub stock: i64,
    pub is_active: bool,
}

impl From<Product> for ProductSnapshot {
    fn from(product: Product) -> Self {
        ProductSnapshot {
            id: product.id,
            name: product.name,
            description: product.description,
            images: product.images,
            current_price: product.price,
            stock: product.stock,
            is_active: product.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    /// `None` once the product has been deleted.
    pub product: Option<ProductSnapshot>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartLineView>,
    pub total_amount: Decimal,
    pub item_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl CartView {
    /// Joins every line with the current product document. The stored cart is not changed.
    pub async fn populate(store: &Store, cart: Cart) -> Result<CartView, ShopError> {
        let products = Product::repository(store);
        let lookups = cart
            .items
            .iter()
            .map(|item| products.get_by_id(&item.product_id));
        let found = futures::future::try_join_all(lookups).await?;

        let items = cart
            .items
            .into_iter()
            .zip(found)
            .map(|(item, product)| CartLineView {
                total: item.line_total(),
                product: product.map(ProductSnapshot::from),
                item,
            })
            .collect();

        Ok(CartView {
            id: cart.id,
            user_id: cart.user_id,
            items,
            total_amount: cart.total_amount,
            item_count: cart.item_count,
            updated_at: cart.updated_at,
        })
    }
}
