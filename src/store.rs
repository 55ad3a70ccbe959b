//! Durable vector store backed by SQLite.
//!
//! One row per indexed file: the normalized content used for embedding, the
//! embedding vector as a little-endian f32 BLOB, and the model/dims it was
//! produced with. Nearest-neighbor search decodes every row and ranks by L2
//! distance in Rust; repositories small enough to review are small enough to
//! scan.

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::config::Config;
use crate::db;
use crate::embedding::{blob_to_vec, l2_distance, vec_to_blob};

/// A document owned by the store, immutable once written.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub id: i64,
    pub path: String,
    pub content: String,
    pub vector: Vec<f32>,
}

/// Handle to the vector store. Holds the connection pool for one run;
/// release it with [`VectorStore::close`] exactly once at the end.
pub struct VectorStore {
    pool: SqlitePool,
    model: String,
    dims: usize,
}

impl VectorStore {
    pub fn new(pool: SqlitePool, model: impl Into<String>, dims: usize) -> Self {
        Self {
            pool,
            model: model.into(),
            dims,
        }
    }

    /// Open the store for the configured database and embedding model.
    ///
    /// Connection failure here is fatal to the run — every other operation
    /// assumes an open pool.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = db::connect(&config.db.path).await?;
        Ok(Self::new(
            pool,
            config.embedding.resolved_model(),
            config.embedding.resolved_dims(),
        ))
    }

    /// Open the store at an explicit path (used by tests and tools).
    pub async fn open(db_path: &Path, model: impl Into<String>, dims: usize) -> Result<Self> {
        let pool = db::connect(db_path).await?;
        Ok(Self::new(pool, model, dims))
    }

    /// Durable write of one document, replacing any previous row for the
    /// same path. Re-indexing therefore never duplicates entries.
    pub async fn upsert(
        &self,
        path: &str,
        content: &str,
        content_hash: &str,
        vector: &[f32],
    ) -> Result<()> {
        if vector.len() != self.dims {
            bail!(
                "Vector dimensionality mismatch: got {}, store expects {} (model '{}')",
                vector.len(),
                self.dims,
                self.model
            );
        }

        let blob = vec_to_blob(vector);
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO repository_content (file_path, content, content_hash, model, dims, embedding, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(file_path) DO UPDATE SET
                content = excluded.content,
                content_hash = excluded.content_hash,
                model = excluded.model,
                dims = excluded.dims,
                embedding = excluded.embedding,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(path)
        .bind(content)
        .bind(content_hash)
        .bind(&self.model)
        .bind(self.dims as i64)
        .bind(blob)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stored content hash for a path, if the path has been indexed.
    /// Used to skip unchanged files on re-index.
    pub async fn content_hash(&self, path: &str) -> Result<Option<String>> {
        let hash: Option<String> = sqlx::query_scalar(
            "SELECT content_hash FROM repository_content WHERE file_path = ? AND model = ?",
        )
        .bind(path)
        .bind(&self.model)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    /// Eager bulk read of every document, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<IndexedDocument>> {
        let rows = sqlx::query(
            "SELECT id, file_path, content, embedding FROM repository_content ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_document).collect())
    }

    /// Up to `k` documents ordered by ascending L2 distance to `query`.
    /// Ties break by id ascending, so results are deterministic for a fixed
    /// store state.
    ///
    /// A query vector of the wrong dimensionality is a configuration error,
    /// not a recoverable condition — the store assumes a single embedding
    /// model for its whole lifetime.
    pub async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<IndexedDocument>> {
        if query.len() != self.dims {
            bail!(
                "Query dimensionality mismatch: got {}, store expects {} (model '{}')",
                query.len(),
                self.dims,
                self.model
            );
        }

        let rows = sqlx::query(
            "SELECT id, file_path, content, embedding FROM repository_content WHERE dims = ?",
        )
        .bind(self.dims as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<(f32, IndexedDocument)> = rows
            .iter()
            .map(|row| {
                let doc = row_to_document(row);
                (l2_distance(query, &doc.vector), doc)
            })
            .collect();

        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.id.cmp(&b.1.id))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, doc)| doc).collect())
    }

    /// True iff the store contains at least one document. Cheap global gate
    /// before attempting retrieval against a possibly empty index.
    pub async fn exists(&self) -> Result<bool> {
        let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM repository_content LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Release the connection pool. Call exactly once at the end of a run.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> IndexedDocument {
    let blob: Vec<u8> = row.get("embedding");
    IndexedDocument {
        id: row.get("id"),
        path: row.get("file_path"),
        content: row.get("content"),
        vector: blob_to_vec(&blob),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate;
    use tempfile::TempDir;

    async fn test_store(dims: usize) -> (TempDir, VectorStore) {
        let tmp = TempDir::new().unwrap();
        let store = VectorStore::open(&tmp.path().join("test.sqlite"), "test-model", dims)
            .await
            .unwrap();
        migrate::apply(&store.pool).await.unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn test_exists_false_on_empty_store() {
        let (_tmp, store) = test_store(3).await;
        assert!(!store.exists().await.unwrap());
        store.close().await;
    }

    #[tokio::test]
    async fn test_exists_true_after_insert() {
        let (_tmp, store) = test_store(3).await;
        store
            .upsert("a.py", "def add", "h1", &[1.0, 0.0, 0.0])
            .await
            .unwrap();
        assert!(store.exists().await.unwrap());
        store.close().await;
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_path() {
        let (_tmp, store) = test_store(3).await;
        store
            .upsert("a.py", "old", "h1", &[1.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .upsert("a.py", "new", "h2", &[0.0, 1.0, 0.0])
            .await
            .unwrap();

        let docs = store.list_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "new");
        assert_eq!(store.content_hash("a.py").await.unwrap().as_deref(), Some("h2"));
        store.close().await;
    }

    #[tokio::test]
    async fn test_upsert_rejects_wrong_dims() {
        let (_tmp, store) = test_store(3).await;
        let err = store.upsert("a.py", "x", "h", &[1.0, 2.0]).await;
        assert!(err.is_err());
        store.close().await;
    }

    #[tokio::test]
    async fn test_nearest_orders_by_distance() {
        let (_tmp, store) = test_store(2).await;
        store.upsert("far", "far", "h", &[10.0, 10.0]).await.unwrap();
        store.upsert("near", "near", "h", &[1.0, 1.0]).await.unwrap();
        store.upsert("mid", "mid", "h", &[5.0, 5.0]).await.unwrap();

        let results = store.nearest(&[0.0, 0.0], 3).await.unwrap();
        let paths: Vec<&str> = results.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["near", "mid", "far"]);
        store.close().await;
    }

    #[tokio::test]
    async fn test_nearest_respects_k_and_count() {
        let (_tmp, store) = test_store(2).await;
        store.upsert("a", "a", "h", &[1.0, 0.0]).await.unwrap();
        store.upsert("b", "b", "h", &[0.0, 1.0]).await.unwrap();

        assert_eq!(store.nearest(&[0.0, 0.0], 1).await.unwrap().len(), 1);
        // k beyond the document count returns everything, never more
        assert_eq!(store.nearest(&[0.0, 0.0], 10).await.unwrap().len(), 2);
        store.close().await;
    }

    #[tokio::test]
    async fn test_nearest_ties_break_by_insertion_order() {
        let (_tmp, store) = test_store(2).await;
        store.upsert("first", "1", "h", &[1.0, 0.0]).await.unwrap();
        store.upsert("second", "2", "h", &[0.0, 1.0]).await.unwrap();

        // Both are equidistant from the origin
        let results = store.nearest(&[0.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].path, "first");
        assert_eq!(results[1].path, "second");
        store.close().await;
    }

    #[tokio::test]
    async fn test_nearest_rejects_wrong_query_dims() {
        let (_tmp, store) = test_store(3).await;
        assert!(store.nearest(&[1.0], 5).await.is_err());
        store.close().await;
    }

    #[tokio::test]
    async fn test_list_all_roundtrips_vectors() {
        let (_tmp, store) = test_store(3).await;
        store
            .upsert("a.py", "content a", "h", &[0.5, -1.5, 2.0])
            .await
            .unwrap();

        let docs = store.list_all().await.unwrap();
        assert_eq!(docs[0].vector, vec![0.5, -1.5, 2.0]);
        store.close().await;
    }
}
