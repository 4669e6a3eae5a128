use std::collections::HashMap;

use async_trait::async_trait;
use jiff_sqlx::ToSqlx;
use serde_json::Value;
use sqlx::{PgPool, types::Json};

use super::{
    AdjustOutcome, Collection, CounterAdjustment, Document, DocumentStore, Fields, ListOptions,
    Page, StoreError, counter_value, new_document_id, timestamp_value,
};

/// Documents live in a single `documents` table keyed by (collection, id) with the JSON fields in
/// a JSONB column. `unique_key` backs [`DocumentStore::upsert_by_field`].
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Fields>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            fields: row.data.0,
        }
    }
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn stamped(mut fields: Fields, now: jiff::Timestamp) -> Fields {
    fields.remove("id");
    fields.insert("createdAt".to_owned(), timestamp_value(now));
    fields.insert("updatedAt".to_owned(), timestamp_value(now));
    fields
}

fn with_updated_at(mut patch: Fields, now: jiff::Timestamp) -> Fields {
    patch.remove("id");
    patch.insert("updatedAt".to_owned(), timestamp_value(now));
    patch
}

fn containment(field: &str, value: &Value) -> Json<Value> {
    let mut filter = Fields::new();
    filter.insert(field.to_owned(), value.clone());
    Json(Value::Object(filter))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError> {
        let now = jiff::Timestamp::now();
        let id = new_document_id();
        let fields = stamped(fields, now);

        sqlx::query(
            r#"INSERT INTO documents (collection, id, data, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $4)"#,
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(Json(&fields))
        .bind(now.to_sqlx())
        .execute(&self.pool)
        .await?;

        Ok(Document { id, fields })
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<DocumentRow> =
            sqlx::query_as(r#"SELECT id, data FROM documents WHERE collection = $1 AND id = $2"#)
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    async fn find_one(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<Document>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"SELECT id, data FROM documents
               WHERE collection = $1 AND data @> $2
               ORDER BY seq
               LIMIT 1"#,
        )
        .bind(collection.as_str())
        .bind(containment(field, value))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_many(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"SELECT id, data FROM documents
               WHERE collection = $1 AND data @> $2
               ORDER BY seq"#,
        )
        .bind(collection.as_str())
        .bind(containment(field, value))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list(
        &self,
        collection: Collection,
        options: &ListOptions,
    ) -> Result<Page<Document>, StoreError> {
        let after_seq: Option<i64> = match options.page_token.as_deref() {
            Some(token) => {
                sqlx::query_scalar(r#"SELECT seq FROM documents WHERE collection = $1 AND id = $2"#)
                    .bind(collection.as_str())
                    .bind(token)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };
        let row_limit = fetch_limit(options.limit);

        let mut rows: Vec<DocumentRow> = sqlx::query_as(
            r#"SELECT id, data FROM documents
               WHERE collection = $1 AND ($2::BIGINT IS NULL OR seq < $2)
               ORDER BY seq DESC
               LIMIT $3"#,
        )
        .bind(collection.as_str())
        .bind(after_seq)
        .bind(row_limit)
        .fetch_all(&self.pool)
        .await?;

        let has_more = options.limit.is_some_and(|limit| rows.len() > limit);
        if let Some(limit) = options.limit {
            rows.truncate(limit);
        }
        let next_page_token = if has_more {
            rows.last().map(|row| row.id.clone())
        } else {
            None
        };

        let total = if options.include_total {
            let count: i64 =
                sqlx::query_scalar(r#"SELECT COUNT(*) FROM documents WHERE collection = $1"#)
                    .bind(collection.as_str())
                    .fetch_one(&self.pool)
                    .await?;
            Some(count as u64)
        } else {
            None
        };

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
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
        let now = jiff::Timestamp::now();
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"UPDATE documents
               SET data = data || $3, updated_at = $4
               WHERE collection = $1 AND id = $2
               RETURNING id, data"#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(with_updated_at(patch, now)))
        .bind(now.to_sqlx())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn update_if(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        expected: &Value,
        patch: Fields,
    ) -> Result<Option<Document>, StoreError> {
        let now = jiff::Timestamp::now();
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"UPDATE documents
               SET data = data || $3, updated_at = $4
               WHERE collection = $1 AND id = $2 AND data @> $5
               RETURNING id, data"#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(with_updated_at(patch, now)))
        .bind(now.to_sqlx())
        .bind(containment(field, expected))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"DELETE FROM documents WHERE collection = $1 AND id = $2"#)
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
        mut defaults: Fields,
    ) -> Result<Document, StoreError> {
        let now = jiff::Timestamp::now();
        let unique_key = format!("{field}:{value}");
        defaults.insert(field.to_owned(), Value::String(value.to_owned()));
        let fields = stamped(defaults, now);

        sqlx::query(
            r#"INSERT INTO documents (collection, id, unique_key, data, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $5)
               ON CONFLICT (collection, unique_key) DO NOTHING"#,
        )
        .bind(collection.as_str())
        .bind(new_document_id())
        .bind(&unique_key)
        .bind(Json(&fields))
        .bind(now.to_sqlx())
        .execute(&self.pool)
        .await?;

        let row: DocumentRow = sqlx::query_as(
            r#"SELECT id, data FROM documents WHERE collection = $1 AND unique_key = $2"#,
        )
        .bind(collection.as_str())
        .bind(&unique_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn adjust_counters(
        &self,
        collection: Collection,
        field: &str,
        adjustments: &[CounterAdjustment],
    ) -> Result<AdjustOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock rows in a stable order so concurrent adjustments cannot deadlock.
        let mut ids: Vec<&str> = adjustments.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut current: HashMap<&str, i64> = HashMap::new();
        for id in ids {
            let row: Option<DocumentRow> = sqlx::query_as(
                r#"SELECT id, data FROM documents
                   WHERE collection = $1 AND id = $2
                   FOR UPDATE"#,
            )
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
            if let Some(row) = row {
                current.insert(id, counter_value(&row.data.0, field));
            }
        }

        for adjustment in adjustments {
            let Some(value) = current.get_mut(adjustment.id.as_str()) else {
                continue;
            };
            let next = *value + adjustment.delta;
            if next < 0 {
                let rejected = AdjustOutcome::Rejected {
                    id: adjustment.id.clone(),
                    current: *value,
                };
                tx.rollback().await?;
                return Ok(rejected);
            }
            *value = next;
        }

        let now = jiff::Timestamp::now();
        for (id, value) in current {
            let mut patch = Fields::new();
            patch.insert(field.to_owned(), Value::from(value));
            sqlx::query(
                r#"UPDATE documents
                   SET data = data || $3, updated_at = $4
                   WHERE collection = $1 AND id = $2"#,
            )
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(with_updated_at(patch, now)))
            .bind(now.to_sqlx())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(AdjustOutcome::Applied)
    }
}

/// One row past `limit` tells us whether another page exists. Limits beyond `i64` fetch everything.
fn fetch_limit(limit: Option<usize>) -> Option<i64> {
    limit.and_then(|limit| i64::try_from(limit).ok()?.checked_add(1))
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

    #[test]
    fn fetch_limit_never_overflows() {
        assert_eq!(fetch_limit(Some(10)), Some(11));
        assert_eq!(fetch_limit(None), None);
        assert_eq!(fetch_limit(Some(i64::MAX as usize)), None);
        assert_eq!(fetch_limit(Some(usize::MAX)), None);
    }

    #[sqlx::test]
    #[ignore = "requires a Postgres database (DATABASE_URL)"]
    async fn field_queries_match_jsonb_values(pool: PgPool) {
        let store = PgDocumentStore::new(pool.clone());
        store
            .create(Collection::Products, fields(json!({"category": "Lamps", "stock": 1})))
            .await
            .expect("Product should be created.");
        store
            .create(Collection::Products, fields(json!({"category": "Desks", "stock": 1})))
            .await
            .expect("Product should be created.");

        let lamps = store
            .find_many(Collection::Products, "category", &json!("Lamps"))
            .await
            .expect("Query should succeed.");

        pool.close().await;

        assert_eq!(lamps.len(), 1);
        assert_eq!(lamps[0].fields["category"], json!("Lamps"));
    }

    #[sqlx::test]
    #[ignore = "requires a Postgres database (DATABASE_URL)"]
    async fn guarded_counters_reject_without_writing(pool: PgPool) {
        let store = PgDocumentStore::new(pool.clone());
        let product = store
            .create(Collection::Products, fields(json!({"stock": 2})))
            .await
            .expect("Product should be created.");

        let outcome = store
            .adjust_counters(
                Collection::Products,
                "stock",
                &[CounterAdjustment::new(&product.id, -3)],
            )
            .await
            .expect("Adjustment should run.");
        let after = store
            .get(Collection::Products, &product.id)
            .await
            .expect("Read should succeed.")
            .expect("Product should exist.");

        pool.close().await;

        assert_eq!(
            outcome,
            AdjustOutcome::Rejected {
                id: product.id,
                current: 2
            }
        );
        assert_eq!(after.fields["stock"], json!(2));
    }

    #[sqlx::test]
    #[ignore = "requires a Postgres database (DATABASE_URL)"]
    async fn upsert_by_field_is_idempotent(pool: PgPool) {
        let store = PgDocumentStore::new(pool.clone());
        let first = store
            .upsert_by_field(Collection::Wishlists, "userId", "u1", fields(json!({"productIds": []})))
            .await
            .expect("Upsert should succeed.");
        let second = store
            .upsert_by_field(Collection::Wishlists, "userId", "u1", fields(json!({"productIds": []})))
            .await
            .expect("Upsert should succeed.");

        pool.close().await;

        assert_eq!(first.id, second.id);
    }
}
