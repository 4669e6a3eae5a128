//! Document store abstraction.
//!
//! The shop keeps every entity as a JSON document inside a named collection. Documents get an id
//! plus `createdAt`/`updatedAt` stamps from the store; everything else is owned by the domain.
//! Two backends are provided: Postgres (JSONB rows) for deployments and an in-process store used
//! by tests and local development.

mod memory;
mod postgres;
mod repository;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use repository::Repository;

/// Shared handle to whichever backend the service was started with.
pub type Store = Arc<dyn DocumentStore>;

pub type Fields = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Credentials,
    Sessions,
    Products,
    Categories,
    Reviews,
    Carts,
    Wishlists,
    Orders,
}

impl Collection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Credentials => "credentials",
            Collection::Sessions => "sessions",
            Collection::Products => "products",
            Collection::Categories => "categories",
            Collection::Reviews => "reviews",
            Collection::Carts => "carts",
            Collection::Wishlists => "wishlists",
            Collection::Orders => "orders",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: the store-assigned id and the JSON fields (which never contain `id`).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Deserialises the document into a domain model, exposing the id as an `id` field.
    pub fn into_model<T: serde::de::DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut fields = self.fields;
        fields.insert("id".to_owned(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: Option<usize>,
    /// Id of the last document of the previous page.
    pub page_token: Option<String>,
    pub include_total: bool,
}

/// One page of a collection listing, newest documents first.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            total: self.total,
            next_page_token: self.next_page_token,
        })
    }
}

/// Adds `delta` to an integer field of the document with the given id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterAdjustment {
    pub id: String,
    pub delta: i64,
}

impl CounterAdjustment {
    pub fn new(id: impl Into<String>, delta: i64) -> Self {
        Self {
            id: id.into(),
            delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjustOutcome {
    Applied,
    /// A counter would have dropped below zero. Nothing was written.
    Rejected { id: String, current: i64 },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document store backend failed: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("Document store migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Document (de)serialisation failed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Documents in {0} must be JSON objects.")]
    NotAnObject(Collection),
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Inserts a new document, stamping `createdAt` and `updatedAt`.
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// First document (in creation order) whose `field` equals `value`.
    async fn find_one(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<Document>, StoreError>;

    /// Every document whose `field` equals `value`, in creation order.
    async fn find_many(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    async fn list(
        &self,
        collection: Collection,
        options: &ListOptions,
    ) -> Result<Page<Document>, StoreError>;

    /// Shallow merges `patch` into the document and refreshes `updatedAt`.
    /// Returns `None` when the document does not exist.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Fields,
    ) -> Result<Option<Document>, StoreError>;

    /// Same as [`DocumentStore::update`] but only applies while `field` still equals `expected`.
    /// Returns `None` when the document is missing or the precondition no longer holds.
    async fn update_if(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        expected: &Value,
        patch: Fields,
    ) -> Result<Option<Document>, StoreError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError>;

    /// Returns the single document whose `field` equals `value`, creating it from `defaults`
    /// if there is none. Concurrent callers always observe the same document.
    async fn upsert_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        defaults: Fields,
    ) -> Result<Document, StoreError>;

    /// Applies every adjustment to the integer `field` atomically.
    /// Missing documents are skipped. If any counter would become negative nothing is written.
    async fn adjust_counters(
        &self,
        collection: Collection,
        field: &str,
        adjustments: &[CounterAdjustment],
    ) -> Result<AdjustOutcome, StoreError>;
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

pub(crate) fn timestamp_value(timestamp: jiff::Timestamp) -> Value {
    Value::String(timestamp.to_string())
}

pub(crate) fn counter_value(fields: &Fields, field: &str) -> i64 {
    fields.get(field).and_then(Value::as_i64).unwrap_or_default()
}
