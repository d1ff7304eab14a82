use crate::sentiment::Sentiment;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const SELECT_REVIEWS: &str = "SELECT id, text, sentiment, created_at FROM reviews";

/// A stored review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: i64,
    pub text: String,
    pub sentiment: Sentiment,
    pub created_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("row {id} has invalid sentiment {value:?}")]
    InvalidRow { id: i64, value: String },

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// SQLite-backed review store.
///
/// One connection is shared behind a mutex. Every operation runs on the
/// blocking pool and holds the guard only for its own statement.
#[derive(Clone)]
pub struct ReviewStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewStore {
    /// Open (or create) the database at `path`. `":memory:"` opens a
    /// private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(StorageError::Open)?;
        info!(path = %path.display(), "Opened review database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on a blocking thread
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await?
    }

    /// Create the reviews table if it does not exist
    pub async fn initialize(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS reviews (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    text TEXT NOT NULL,
                    sentiment TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );",
            )?;
            Ok(())
        })
        .await
    }

    /// Insert a review and return its assigned id
    pub async fn insert(&self, text: &str, sentiment: Sentiment, created_at: &str) -> Result<i64> {
        let text = text.to_owned();
        let created_at = created_at.to_owned();
        let id = self
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO reviews (text, sentiment, created_at) VALUES (?1, ?2, ?3)",
                    params![text, sentiment.as_str(), created_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        debug!(id, %sentiment, "Inserted review");
        Ok(id)
    }

    /// All reviews, ordered by id
    pub async fn list_all(&self) -> Result<Vec<Review>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_REVIEWS} ORDER BY id"))?;
            let rows = stmt.query_map([], read_row)?;
            collect_reviews(rows)
        })
        .await
    }

    /// Reviews carrying the given sentiment, ordered by id
    pub async fn list_by_sentiment(&self, sentiment: Sentiment) -> Result<Vec<Review>> {
        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_REVIEWS} WHERE sentiment = ?1 ORDER BY id"))?;
            let rows = stmt.query_map(params![sentiment.as_str()], read_row)?;
            collect_reviews(rows)
        })
        .await
    }

    pub async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

type RawRow = (i64, String, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn collect_reviews(
    rows: impl Iterator<Item = rusqlite::Result<RawRow>>,
) -> Result<Vec<Review>> {
    rows.map(|row| {
        let (id, text, label, created_at) = row?;
        let sentiment = label
            .parse()
            .map_err(|_| StorageError::InvalidRow { id, value: label })?;
        Ok(Review {
            id,
            text,
            sentiment,
            created_at,
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> ReviewStore {
        let store = ReviewStore::open(":memory:").unwrap();
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let store = memory_store().await;
        store.initialize().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = memory_store().await;
        let first = store
            .insert("first", Sentiment::Neutral, "2024-01-01T00:00:00Z")
            .await
            .unwrap();
        let second = store
            .insert("second", Sentiment::Positive, "2024-01-01T00:00:01Z")
            .await
            .unwrap();
        assert!(second > first);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_all_returns_records_in_id_order() {
        let store = memory_store().await;
        store.insert("a", Sentiment::Positive, "t1").await.unwrap();
        store.insert("b", Sentiment::Negative, "t2").await.unwrap();
        store.insert("c", Sentiment::Neutral, "t3").await.unwrap();

        let reviews = store.list_all().await.unwrap();
        let texts: Vec<&str> = reviews.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert_eq!(reviews[1].sentiment, Sentiment::Negative);
        assert_eq!(reviews[2].created_at, "t3");
    }

    #[tokio::test]
    async fn list_by_sentiment_filters_exactly() {
        let store = memory_store().await;
        store.insert("good", Sentiment::Positive, "t1").await.unwrap();
        store.insert("bad", Sentiment::Negative, "t2").await.unwrap();
        store.insert("great", Sentiment::Positive, "t3").await.unwrap();

        let positive = store.list_by_sentiment(Sentiment::Positive).await.unwrap();
        assert_eq!(positive.len(), 2);
        assert!(positive.iter().all(|r| r.sentiment == Sentiment::Positive));

        let neutral = store.list_by_sentiment(Sentiment::Neutral).await.unwrap();
        assert!(neutral.is_empty());
    }

    #[tokio::test]
    async fn unknown_stored_label_is_reported() {
        let store = memory_store().await;
        {
            let conn = store.conn.lock().await;
            conn.execute(
                "INSERT INTO reviews (text, sentiment, created_at) VALUES ('x', 'happy', 't')",
                [],
            )
            .unwrap();
        }

        let err = store.list_all().await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidRow { ref value, .. } if value == "happy"));
    }

    #[tokio::test]
    async fn concurrent_inserts_get_distinct_ids() {
        let store = memory_store().await;
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(&format!("review {i}"), Sentiment::Neutral, "t")
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(store.count().await.unwrap(), 16);
    }

    #[tokio::test]
    async fn missing_table_surfaces_as_query_error() {
        let store = ReviewStore::open(":memory:").unwrap();
        let err = store.list_all().await.unwrap_err();
        assert!(matches!(err, StorageError::Query(_)));
    }
}
