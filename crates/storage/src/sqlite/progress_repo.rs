use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::warn;

use crate::repository::{
    PROGRESS_STORAGE_KEY, ProgressRepository, StorageError, UserProgressRecord,
};
use progress_core::model::UserProgress;

use super::SqliteRepository;

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load(&self) -> Result<Option<UserProgress>, StorageError> {
        let row = sqlx::query("SELECT payload FROM progress_snapshots WHERE key = ?1")
            .bind(PROGRESS_STORAGE_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        // A snapshot that fails to parse or validate is treated the same as a
        // missing one. The caller starts from the zero-state.
        let record: UserProgressRecord = match serde_json::from_str(&payload) {
            Ok(record) => record,
            Err(err) => {
                warn!(key = PROGRESS_STORAGE_KEY, error = %err, "discarding unreadable progress snapshot");
                return Ok(None);
            }
        };
        match record.into_progress() {
            Ok(progress) => Ok(Some(progress)),
            Err(err) => {
                warn!(key = PROGRESS_STORAGE_KEY, error = %err, "discarding invalid progress snapshot");
                Ok(None)
            }
        }
    }

    async fn save(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let record = UserProgressRecord::from_progress(progress);
        let payload = serde_json::to_string(&record)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO progress_snapshots (key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(PROGRESS_STORAGE_KEY)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
