use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    AdjustOutcome, Collection, CounterAdjustment, Document, DocumentStore, Fields, ListOptions,
    Page, StoreError, counter_value, new_document_id, timestamp_value,
};

#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    fields: Fields,
}

#[derive(Debug, Default)]
struct Collections {
    next_seq: u64,
    documents: HashMap<Collection, HashMap<String, StoredDocument>>,
}

impl Collections {
    fn insert(&mut self, collection: Collection, mut fields: Fields) -> Document {
        let now = timestamp_value(jiff::Timestamp::now());
        fields.remove("id");
        fields.insert("createdAt".to_owned(), now.clone());
        fields.insert("updatedAt".to_owned(), now);

        self.next_seq += 1;
        let id = new_document_id();
        self.documents.entry(collection).or_default().insert(
            id.clone(),
            StoredDocument {
                seq: self.next_seq,
                fields: fields.clone(),
            },
        );
        Document { id, fields }
    }

    /// Documents of a collection in creation order.
    fn ordered(&self, collection: Collection) -> Vec<(&String, &StoredDocument)> {
        let mut documents: Vec<_> = self
            .documents
            .get(&collection)
            .map(|documents| documents.iter().collect())
            .unwrap_or_default();
        documents.sort_by_key(|(_, document)| document.seq);
        documents
    }

    fn matching(&self, collection: Collection, field: &str, value: &Value) -> Vec<Document> {
        self.ordered(collection)
            .into_iter()
            .filter(|(_, document)| document.fields.get(field) == Some(value))
            .map(|(id, document)| Document {
                id: id.clone(),
                fields: document.fields.clone(),
            })
            .collect()
    }

    fn merge(&mut self, collection: Collection, id: &str, patch: Fields) -> Option<Document> {
        let document = self.documents.get_mut(&collection)?.get_mut(id)?;
        for (key, value) in patch {
            if key != "id" {
                document.fields.insert(key, value);
            }
        }
        document.fields.insert(
            "updatedAt".to_owned(),
            timestamp_value(jiff::Timestamp::now()),
        );
        Some(Document {
            id: id.to_owned(),
            fields: document.fields.clone(),
        })
    }
}

/// Keeps every collection in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError> {
        Ok(self.collections.write().await.insert(collection, fields))
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .documents
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .map(|document| Document {
                id: id.to_owned(),
                fields: document.fields.clone(),
            }))
    }

    async fn find_one(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .matching(collection, field, value)
            .into_iter()
            .next())
    }

    async fn find_many(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.matching(collection, field, value))
    }

    async fn list(
        &self,
        collection: Collection,
        options: &ListOptions,
    ) -> Result<Page<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut newest_first = collections.ordered(collection);
        newest_first.reverse();
        let total = options.include_total.then_some(newest_first.len() as u64);

        let start = options
            .page_token
            .as_deref()
            .and_then(|token| newest_first.iter().position(|(id, _)| id.as_str() == token))
            .map(|position| position + 1)
            .unwrap_or_default();
        let remaining = newest_first.get(start..).unwrap_or_default();
        let take = options.limit.unwrap_or(remaining.len()).min(remaining.len());

        let items: Vec<Document> = remaining[..take]
            .iter()
            .map(|(id, document)| Document {
                id: (*id).clone(),
                fields: document.fields.clone(),
            })
            .collect();
        let next_page_token = if take < remaining.len() {
            items.last().map(|document| document.id.clone())
        } else {
            None
        };

        Ok(Page {
            items,
            total,
            next_page_token,
        })
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Fields,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.collections.write().await.merge(collection, id, patch))
    }

    async fn update_if(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        expected: &Value,
        patch: Fields,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let precondition_holds = collections
            .documents
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .is_some_and(|document| document.fields.get(field) == Some(expected));
        if !precondition_holds {
            return Ok(None);
        }
        Ok(collections.merge(collection, id, patch))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .documents
            .get_mut(&collection)
            .and_then(|documents| documents.remove(id))
            .is_some())
    }

    async fn upsert_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        mut defaults: Fields,
    ) -> Result<Document, StoreError> {
        let key = Value::String(value.to_owned());
        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.matching(collection, field, &key).into_iter().next() {
            return Ok(existing);
        }
        defaults.insert(field.to_owned(), key);
        Ok(collections.insert(collection, defaults))
    }

    async fn adjust_counters(
        &self,
        collection: Collection,
        field: &str,
        adjustments: &[CounterAdjustment],
    ) -> Result<AdjustOutcome, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.documents.get_mut(&collection) else {
            return Ok(AdjustOutcome::Applied);
        };

        let mut pending: HashMap<&str, i64> = HashMap::new();
        for adjustment in adjustments {
            let Some(document) = documents.get(&adjustment.id) else {
                continue;
            };
            let current = *pending
                .entry(adjustment.id.as_str())
                .or_insert_with(|| counter_value(&document.fields, field));
            let next = current + adjustment.delta;
            if next < 0 {
                return Ok(AdjustOutcome::Rejected {
                    id: adjustment.id.clone(),
                    current,
                });
            }
            pending.insert(adjustment.id.as_str(), next);
        }

        let now = timestamp_value(jiff::Timestamp::now());
        for (id, value) in pending {
            if let Some(document) = documents.get_mut(id) {
                document.fields.insert(field.to_owned(), Value::from(value));
                document.fields.insert("updatedAt".to_owned(), now.clone());
            }
        }
        Ok(AdjustOutcome::Applied)
    }
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("test fixture must be an object"),
        }
    }

    #[tokio::test]
    async fn created_documents_are_stamped_and_retrievable() {
        let store = MemoryStore::new();
        let created = store
            .create(Collection::Products, fields(json!({"name": "Lamp", "stock": 3})))
            .await
            .unwrap();

        assert!(created.fields.contains_key("createdAt"));
        assert!(created.fields.contains_key("updatedAt"));

        let found = store.get(Collection::Products, &created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn list_pages_newest_first() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store
                .create(Collection::Products, fields(json!({ "name": name })))
                .await
                .unwrap();
        }

        let first = store
            .list(
                Collection::Products,
                &ListOptions {
                    limit: Some(2),
                    include_total: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let names: Vec<_> = first.items.iter().map(|d| d.fields["name"].clone()).collect();
        assert_eq!(names, vec![json!("c"), json!("b")]);
        assert_eq!(first.total, Some(3));

        let second = store
            .list(
                Collection::Products,
                &ListOptions {
                    limit: Some(2),
                    page_token: first.next_page_token,
                    include_total: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].fields["name"], json!("a"));
        assert_eq!(second.next_page_token, None);
    }

    #[tokio::test]
    async fn upsert_returns_the_same_document_for_the_same_key() {
        let store = MemoryStore::new();
        let first = store
            .upsert_by_field(Collection::Carts, "userId", "u1", fields(json!({"items": []})))
            .await
            .unwrap();
        let second = store
            .upsert_by_field(Collection::Carts, "userId", "u1", fields(json!({"items": []})))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.fields["userId"], json!("u1"));
    }

    #[tokio::test]
    async fn counter_adjustments_are_all_or_nothing() {
        let store = MemoryStore::new();
        let a = store
            .create(Collection::Products, fields(json!({"stock": 5})))
            .await
            .unwrap();
        let b = store
            .create(Collection::Products, fields(json!({"stock": 1})))
            .await
            .unwrap();

        let outcome = store
            .adjust_counters(
                Collection::Products,
                "stock",
                &[
                    CounterAdjustment::new(&a.id, -2),
                    CounterAdjustment::new(&b.id, -2),
                ],
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AdjustOutcome::Rejected {
                id: b.id.clone(),
                current: 1
            }
        );

        let a_after = store.get(Collection::Products, &a.id).await.unwrap().unwrap();
        assert_eq!(a_after.fields["stock"], json!(5));

        let outcome = store
            .adjust_counters(
                Collection::Products,
                "stock",
                &[
                    CounterAdjustment::new(&a.id, -2),
                    CounterAdjustment::new("missing", -2),
                ],
            )
            .await
            .unwrap();
        assert_eq!(outcome, AdjustOutcome::Applied);
        let a_after = store.get(Collection::Products, &a.id).await.unwrap().unwrap();
        assert_eq!(a_after.fields["stock"], json!(3));
    }

    #[tokio::test]
    async fn conditional_update_only_applies_while_the_field_matches() {
        let store = MemoryStore::new();
        let order = store
            .create(Collection::Orders, fields(json!({"orderStatus": "pending"})))
            .await
            .unwrap();

        let cancelled = store
            .update_if(
                Collection::Orders,
                &order.id,
                "orderStatus",
                &json!("pending"),
                fields(json!({"orderStatus": "cancelled"})),
            )
            .await
            .unwrap();
        assert!(cancelled.is_some());

        let again = store
            .update_if(
                Collection::Orders,
                &order.id,
                "orderStatus",
                &json!("pending"),
                fields(json!({"orderStatus": "cancelled"})),
            )
            .await
            .unwrap();
        assert!(again.is_none());
    }
}
