use crate::constants::{MIRROR_COLLECTION, MIRROR_DOCUMENT};
use crate::error::Error;
use crate::models::{MergedSnapshot, PricesResponse};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Best-effort durable copy of the latest merged prices.
///
/// Every successful price refresh overwrites one document
/// (`prices/latest`). The service never reads it back; the in-memory cache
/// stays the source of truth.
#[derive(Debug)]
pub struct SnapshotMirror {
    pool: SqlitePool,
    database_path: PathBuf,
}

impl SnapshotMirror {
    /// Open the mirror database for a project: `<data_dir>/<project>.db`
    pub async fn connect(data_dir: &Path, project: &str) -> Result<Self, Error> {
        let project = project.trim();
        if project.is_empty()
            || !project
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::Config(format!(
                "Invalid mirror project id '{}': use letters, digits, '-' or '_'",
                project
            )));
        }

        Self::open(data_dir.join(format!("{}.db", project))).await
    }

    pub async fn open(database_path: PathBuf) -> Result<Self, Error> {
        info!("Opening snapshot mirror at: {:?}", database_path);

        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(&database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePool::connect_with(connect_options).await?;

        let mirror = Self { pool, database_path };
        mirror.initialize().await?;
        Ok(mirror)
    }

    async fn initialize(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Overwrite the `prices/latest` document with `{"data": ...}`
    pub async fn write_latest(&self, data: &MergedSnapshot, updated_at: i64) -> Result<(), Error> {
        let body = serde_json::to_string(&PricesResponse::borrowed(data))?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(MIRROR_COLLECTION)
        .bind(MIRROR_DOCUMENT)
        .bind(body)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read the mirrored document back (operator tooling only)
    pub async fn load_latest(&self) -> Result<Option<(PricesResponse<'static>, i64)>, Error> {
        let row = sqlx::query("SELECT body, updated_at FROM documents WHERE collection = ? AND id = ?")
            .bind(MIRROR_COLLECTION)
            .bind(MIRROR_DOCUMENT)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body")?;
                let updated_at: i64 = row.try_get("updated_at")?;
                Ok(Some((serde_json::from_str(&body)?, updated_at)))
            }
            None => Ok(None),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Connect the mirror when a project is configured.
///
/// A connection failure is not fatal: the process runs memory-only for its
/// whole lifetime.
pub async fn connect_optional(data_dir: &Path, project: Option<&str>) -> Option<SnapshotMirror> {
    let project = project?;

    match SnapshotMirror::connect(data_dir, project).await {
        Ok(mirror) => {
            info!(project, path = ?mirror.database_path(), "Connected snapshot mirror");
            Some(mirror)
        }
        Err(e) => {
            warn!(project, error = %e, "Snapshot mirror connection failed, using in-memory cache only");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MergedPriceRecord;
    use tempfile::tempdir;

    fn sample(high: i64) -> MergedSnapshot {
        let mut data = MergedSnapshot::new();
        data.insert(
            "2".to_string(),
            MergedPriceRecord { high, low: high - 1, ..MergedPriceRecord::default() },
        );
        data
    }

    #[tokio::test]
    async fn test_write_then_overwrite_latest() {
        let temp_dir = tempdir().unwrap();
        let mirror = SnapshotMirror::connect(temp_dir.path(), "flip-test").await.unwrap();
        assert!(mirror.database_path().ends_with("flip-test.db"));

        assert!(mirror.load_latest().await.unwrap().is_none());

        mirror.write_latest(&sample(200), 1_700_000_000).await.unwrap();
        mirror.write_latest(&sample(210), 1_700_000_060).await.unwrap();

        let (document, updated_at) = mirror.load_latest().await.unwrap().unwrap();
        assert_eq!(updated_at, 1_700_000_060);
        assert_eq!(document.data["2"].high, 210);
        assert_eq!(document.data.len(), 1);

        mirror.close().await;
    }

    #[tokio::test]
    async fn test_rejects_unsafe_project_id() {
        let temp_dir = tempdir().unwrap();
        let result = SnapshotMirror::connect(temp_dir.path(), "../escape").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_connect_optional() {
        let temp_dir = tempdir().unwrap();

        assert!(connect_optional(temp_dir.path(), None).await.is_none());
        assert!(connect_optional(temp_dir.path(), Some("bad/id")).await.is_none());

        let mirror = connect_optional(temp_dir.path(), Some("prod")).await;
        assert!(mirror.is_some());
    }
}
