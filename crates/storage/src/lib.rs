use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{DocumentSet, DocumentSetId, NewDocumentSet};

const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Persistence contract consumed by the request handlers.
#[async_trait]
pub trait DocumentSetStore: Send + Sync {
    /// Every stored document set in creation order. May be empty.
    async fn all(&self) -> Result<Vec<DocumentSet>>;
    /// Persists `record` and returns it with its assigned id.
    async fn create(&self, record: &NewDocumentSet) -> Result<DocumentSet>;
    /// Removes the record if present. Returns whether a row was deleted;
    /// a missing id is not an error.
    async fn delete(&self, id: DocumentSetId) -> Result<bool>;
    async fn health_check(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite database url '{database_url}'"))?
            .create_if_missing(true);

        // An in-memory database lives only as long as its connections, so it is
        // pinned to one connection that never expires.
        let pool_options = if database_url.starts_with(MEMORY_DATABASE_URL) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!(%database_url, "document set storage ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn find_document_set(&self, id: DocumentSetId) -> Result<Option<DocumentSet>> {
        let row = sqlx::query("SELECT id, name, query, created_at FROM document_sets WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(document_set_from_row))
    }

    pub async fn count_document_sets(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document_sets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl DocumentSetStore for Storage {
    async fn all(&self) -> Result<Vec<DocumentSet>> {
        let rows = sqlx::query("SELECT id, name, query, created_at FROM document_sets ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list document sets")?;
        Ok(rows.into_iter().map(document_set_from_row).collect())
    }

    async fn create(&self, record: &NewDocumentSet) -> Result<DocumentSet> {
        let row = sqlx::query(
            "INSERT INTO document_sets (name, query) VALUES (?, ?)
             RETURNING id, name, query, created_at",
        )
        .bind(record.name.as_str())
        .bind(record.query.as_deref())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert document set")?;
        Ok(document_set_from_row(row))
    }

    async fn delete(&self, id: DocumentSetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM document_sets WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete document set {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

fn document_set_from_row(r: SqliteRow) -> DocumentSet {
    DocumentSet {
        id: DocumentSetId(r.get::<i64, _>(0)),
        name: r.get::<String, _>(1),
        query: r.get::<Option<String>, _>(2),
        created_at: r.get::<DateTime<Utc>, _>(3),
    }
}

/// Creates the directory holding a file-backed SQLite database. In-memory
/// and non-sqlite URLs are left alone.
pub fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

pub fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with(MEMORY_DATABASE_URL) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
