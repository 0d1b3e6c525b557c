//! Generic CRUD over the `documents` table.
//!
//! Reads are whole-collection scans ordered by creation time. Collections
//! are small; filtering happens in memory on the caller's side.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{instrument, warn};

use crate::{Collection, Entity, Record, StoreError};

/// Length of generated document ids.
pub const DOCUMENT_ID_LEN: usize = 20;

/// Generate a random alphanumeric document id.
#[must_use]
pub fn generate_document_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_record<E: Entity>(self) -> Result<Record<E>, StoreError> {
        let data = serde_json::from_value(self.data).map_err(|source| {
            StoreError::DataCorruption {
                collection: E::COLLECTION,
                id: self.id.clone(),
                source,
            }
        })?;
        Ok(Record {
            id: E::Id::from(self.id),
            data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Document access for one connection pool.
pub struct DocumentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentStore<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch every document in the entity's collection, oldest first.
    ///
    /// Documents that no longer deserialize are logged and skipped so one bad
    /// record does not take down a whole page.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    #[instrument(skip_all, fields(collection = %E::COLLECTION))]
    pub async fn list<E: Entity>(&self) -> Result<Vec<Record<E>>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1
            ORDER BY created_at, id
            ",
        )
        .bind(E::COLLECTION.name())
        .fetch_all(self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_record::<E>() {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "Skipping unreadable document"),
            }
        }
        Ok(records)
    }

    /// Fetch one document by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails or
    /// `StoreError::DataCorruption` if the document does not deserialize.
    #[instrument(skip_all, fields(collection = %E::COLLECTION, id = id.as_ref()))]
    pub async fn get<E: Entity>(&self, id: &E::Id) -> Result<Option<Record<E>>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(E::COLLECTION.name())
        .bind(id.as_ref())
        .fetch_optional(self.pool)
        .await?;

        row.map(DocumentRow::into_record::<E>).transpose()
    }

    /// Oldest document in the collection, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails or
    /// `StoreError::DataCorruption` if the document does not deserialize.
    pub async fn first<E: Entity>(&self) -> Result<Option<Record<E>>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1
            ORDER BY created_at, id
            LIMIT 1
            ",
        )
        .bind(E::COLLECTION.name())
        .fetch_optional(self.pool)
        .await?;

        row.map(DocumentRow::into_record::<E>).transpose()
    }

    /// Insert a document under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the document cannot be encoded
    /// or `StoreError::Database` if the insert fails.
    #[instrument(skip_all, fields(collection = %E::COLLECTION))]
    pub async fn insert<E: Entity>(&self, data: &E) -> Result<Record<E>, StoreError> {
        let body = serde_json::to_value(data)?;
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            RETURNING id, data, created_at, updated_at
            ",
        )
        .bind(E::COLLECTION.name())
        .bind(generate_document_id())
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        row.into_record::<E>()
    }

    /// Create or overwrite the document at a fixed id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the document cannot be encoded
    /// or `StoreError::Database` if the write fails.
    #[instrument(skip_all, fields(collection = %E::COLLECTION, id = id.as_ref()))]
    pub async fn set<E: Entity>(&self, id: &E::Id, data: &E) -> Result<Record<E>, StoreError> {
        let body = serde_json::to_value(data)?;
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            RETURNING id, data, created_at, updated_at
            ",
        )
        .bind(E::COLLECTION.name())
        .bind(id.as_ref())
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        row.into_record::<E>()
    }

    /// Overwrite an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no document has this id.
    #[instrument(skip_all, fields(collection = %E::COLLECTION, id = id.as_ref()))]
    pub async fn replace<E: Entity>(&self, id: &E::Id, data: &E) -> Result<Record<E>, StoreError> {
        let body = serde_json::to_value(data)?;
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            UPDATE documents
            SET data = $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            RETURNING id, data, created_at, updated_at
            ",
        )
        .bind(E::COLLECTION.name())
        .bind(id.as_ref())
        .bind(body)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or_else(|| StoreError::NotFound {
            collection: E::COLLECTION,
            id: id.as_ref().to_owned(),
        })?
        .into_record::<E>()
    }

    /// Shallow-merge top-level fields into a document, creating it when it
    /// does not exist yet. Returns `true` when an existing document was
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the write fails.
    #[instrument(skip(self, patch))]
    pub async fn merge(
        &self,
        collection: Collection,
        id: &str,
        patch: &Value,
    ) -> Result<bool, StoreError> {
        let updated: bool = sqlx::query_scalar(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = now()
            RETURNING NOT (xmax = 0)
            ",
        )
        .bind(collection.name())
        .bind(id)
        .bind(patch)
        .fetch_one(self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a document. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.name())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of documents in a collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
                .bind(collection.name())
                .fetch_one(self.pool)
                .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_alphanumeric() {
        let id = generate_document_id();
        assert_eq!(id.len(), DOCUMENT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_document_id());
    }
}
