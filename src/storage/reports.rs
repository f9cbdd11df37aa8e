//! Submitted reports, stored in SQLite.
//!
//! # Design Decisions
//! - `reports` holds the latest submission per object name; every submission
//!   is also kept in `report_history` under its timestamp
//! - Both writes of a submission share one transaction
//! - An in-memory database keeps a single pooled connection alive, since its
//!   data lives only as long as that connection
//! - Timestamps are UTC RFC 3339 with microseconds, so text order is time order

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;

/// In-memory database URL.
pub const MEMORY_URL: &str = "sqlite::memory:";

const CREATE_REPORTS: &str = "CREATE TABLE IF NOT EXISTS reports (
    object_name TEXT PRIMARY KEY,
    school TEXT,
    method TEXT,
    phone TEXT,
    time TEXT,
    transcription_text TEXT,
    submission_timestamp TEXT NOT NULL
)";

const CREATE_HISTORY: &str = "CREATE TABLE IF NOT EXISTS report_history (
    object_name TEXT NOT NULL,
    school TEXT,
    method TEXT,
    phone TEXT,
    time TEXT,
    transcription_text TEXT,
    submission_timestamp TEXT NOT NULL,
    PRIMARY KEY (object_name, submission_timestamp)
)";

const UPSERT_LATEST: &str = "INSERT OR REPLACE INTO reports
    (object_name, school, method, phone, time, transcription_text, submission_timestamp)
    VALUES (?, ?, ?, ?, ?, ?, ?)";

const APPEND_HISTORY: &str = "INSERT OR REPLACE INTO report_history
    (object_name, school, method, phone, time, transcription_text, submission_timestamp)
    VALUES (?, ?, ?, ?, ?, ?, ?)";

const COLUMNS: &str =
    "object_name, school, method, phone, time, transcription_text, submission_timestamp";

/// Errors from the report store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("缺少 'object_name' 字段")]
    MissingObjectName,
}

/// Body of `POST /api/submit-final-report`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportSubmission {
    pub object_name: Option<String>,
    pub school: Option<String>,
    pub method: Option<String>,
    pub phone: Option<String>,
    pub time: Option<String>,
    pub transcription_text: Option<String>,
}

/// One stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, sqlx::FromRow)]
pub struct ReportRecord {
    pub object_name: String,
    pub school: Option<String>,
    pub method: Option<String>,
    pub phone: Option<String>,
    pub time: Option<String>,
    pub transcription_text: Option<String>,
    pub submission_timestamp: String,
}

/// SQLite-backed report storage.
#[derive(Debug, Clone)]
pub struct ReportStore {
    pool: SqlitePool,
}

impl ReportStore {
    /// Open (creating when missing) the database at `url` and its tables.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        sqlx::query(CREATE_REPORTS).execute(&pool).await?;
        sqlx::query(CREATE_HISTORY).execute(&pool).await?;
        tracing::info!(url = %url, "Report store ready");

        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::connect(MEMORY_URL).await
    }

    /// Store a submission, replacing the latest one for its object name.
    pub async fn save(&self, submission: ReportSubmission) -> Result<ReportRecord, StorageError> {
        let object_name = submission
            .object_name
            .filter(|name| !name.is_empty())
            .ok_or(StorageError::MissingObjectName)?;

        let record = ReportRecord {
            object_name,
            school: submission.school,
            method: submission.method,
            phone: submission.phone,
            time: submission.time,
            transcription_text: submission.transcription_text,
            submission_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        let mut tx = self.pool.begin().await?;
        for statement in [UPSERT_LATEST, APPEND_HISTORY] {
            sqlx::query(statement)
                .bind(record.object_name.as_str())
                .bind(record.school.as_deref())
                .bind(record.method.as_deref())
                .bind(record.phone.as_deref())
                .bind(record.time.as_deref())
                .bind(record.transcription_text.as_deref())
                .bind(record.submission_timestamp.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(
            object_name = %record.object_name,
            timestamp = %record.submission_timestamp,
            "Report saved"
        );
        Ok(record)
    }

    /// Latest submission of every object, newest first.
    pub async fn all(&self) -> Result<Vec<ReportRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM reports ORDER BY submission_timestamp DESC",
            COLUMNS
        );
        Ok(sqlx::query_as::<_, ReportRecord>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Submission timestamps for `object_name`, newest first.
    pub async fn timestamps(&self, object_name: &str) -> Result<Vec<String>, StorageError> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT submission_timestamp FROM report_history
             WHERE object_name = ? ORDER BY submission_timestamp DESC",
        )
        .bind(object_name)
        .fetch_all(&self.pool)
        .await?)
    }

    /// The submission of `object_name` made at `timestamp`.
    pub async fn find(
        &self,
        object_name: &str,
        timestamp: &str,
    ) -> Result<Option<ReportRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM report_history WHERE object_name = ? AND submission_timestamp = ?",
            COLUMNS
        );
        Ok(sqlx::query_as::<_, ReportRecord>(&sql)
            .bind(object_name)
            .bind(timestamp)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Close the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn submission(object_name: &str, school: &str) -> ReportSubmission {
        ReportSubmission {
            object_name: Some(object_name.to_string()),
            school: Some(school.to_string()),
            phone: Some("13800000000".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_then_find() {
        let store = ReportStore::in_memory().await.unwrap();
        let saved = store.save(submission("a1.mp3", "一中")).await.unwrap();

        let found = store
            .find("a1.mp3", &saved.submission_timestamp)
            .await
            .unwrap();
        assert_eq!(found, Some(saved));
        assert_eq!(store.find("a1.mp3", "2000-01-01T00:00:00Z").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resubmission_replaces_latest_and_keeps_history() {
        let store = ReportStore::in_memory().await.unwrap();
        let first = store.save(submission("a1.mp3", "一中")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = store.save(submission("a1.mp3", "二中")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.save(submission("b2.mp3", "三中")).await.unwrap();

        let all = store.all().await.unwrap();
        let names: Vec<_> = all.iter().map(|r| r.object_name.as_str()).collect();
        assert_eq!(names, vec!["b2.mp3", "a1.mp3"]);
        assert_eq!(all[1].school.as_deref(), Some("二中"));

        let timestamps = store.timestamps("a1.mp3").await.unwrap();
        assert_eq!(
            timestamps,
            vec![second.submission_timestamp, first.submission_timestamp.clone()]
        );

        let old = store
            .find("a1.mp3", &first.submission_timestamp)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(old.school.as_deref(), Some("一中"));
    }

    #[tokio::test]
    async fn test_object_name_is_required() {
        let store = ReportStore::in_memory().await.unwrap();

        let err = store.save(ReportSubmission::default()).await.unwrap_err();
        assert!(matches!(err, StorageError::MissingObjectName));
        let err = store.save(submission("", "一中")).await.unwrap_err();
        assert!(matches!(err, StorageError::MissingObjectName));

        assert!(store.all().await.unwrap().is_empty());
        assert!(store.timestamps("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_database_survives_reconnect() {
        let path = std::env::temp_dir().join(format!("reports-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());

        let store = ReportStore::connect(&url).await.unwrap();
        store.save(submission("a1.mp3", "一中")).await.unwrap();
        store.close().await;

        let reopened = ReportStore::connect(&url).await.unwrap();
        assert_eq!(reopened.all().await.unwrap().len(), 1);
        reopened.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
