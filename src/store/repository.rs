use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{
    AdjustOutcome, Collection, CounterAdjustment, Fields, ListOptions, Page, Store, StoreError,
};

/// Typed view over one collection. Models are (de)serialised through their camelCase JSON form;
/// the store-assigned id surfaces as the model's `id` field.
pub struct Repository<T> {
    store: Store,
    collection: Collection,
    model: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            collection: self.collection,
            model: PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: DeserializeOwned,
{
    pub fn new(store: &Store, collection: Collection) -> Self {
        Self {
            store: store.clone(),
            collection,
            model: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    fn to_fields(&self, value: &impl Serialize) -> Result<Fields, StoreError> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(fields),
            _ => Err(StoreError::NotAnObject(self.collection)),
        }
    }

    pub async fn create(&self, new: &impl Serialize) -> Result<T, StoreError> {
        let fields = self.to_fields(new)?;
        self.store
            .create(self.collection, fields)
            .await?
            .into_model()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .get(self.collection, id)
            .await?
            .map(|document| document.into_model())
            .transpose()
    }

    pub async fn get_by_field(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Option<T>, StoreError> {
        self.store
            .find_one(self.collection, field, &value.into())
            .await?
            .map(|document| document.into_model())
            .transpose()
    }

    pub async fn find_many_by_field(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<T>, StoreError> {
        self.store
            .find_many(self.collection, field, &value.into())
            .await?
            .into_iter()
            .map(|document| document.into_model())
            .collect()
    }

    pub async fn list(&self, options: &ListOptions) -> Result<Page<T>, StoreError> {
        self.store
            .list(self.collection, options)
            .await?
            .try_map(|document| document.into_model())
    }

    /// Shallow merges the serialised `patch` (fields that serialise to nothing are left alone).
    pub async fn update(&self, id: &str, patch: &impl Serialize) -> Result<Option<T>, StoreError> {
        let patch = self.to_fields(patch)?;
        self.store
            .update(self.collection, id, patch)
            .await?
            .map(|document| document.into_model())
            .transpose()
    }

    pub async fn update_if(
        &self,
        id: &str,
        field: &str,
        expected: impl Into<Value>,
        patch: &impl Serialize,
    ) -> Result<Option<T>, StoreError> {
        let patch = self.to_fields(patch)?;
        self.store
            .update_if(self.collection, id, field, &expected.into(), patch)
            .await?
            .map(|document| document.into_model())
            .transpose()
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(self.collection, id).await
    }

    pub async fn upsert_by_field(
        &self,
        field: &str,
        value: &str,
        defaults: &impl Serialize,
    ) -> Result<T, StoreError> {
        let defaults = self.to_fields(defaults)?;
        self.store
            .upsert_by_field(self.collection, field, value, defaults)
            .await?
            .into_model()
    }

    pub async fn adjust_counters(
        &self,
        field: &str,
        adjustments: &[CounterAdjustment],
    ) -> Result<AdjustOutcome, StoreError> {
        self.store
            .adjust_counters(self.collection, field, adjustments)
            .await
    }
}
