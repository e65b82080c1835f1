use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use progress_core::model::{Badge, MaterialId, MaterialProgress, UserProgress};

/// Fixed key the snapshot is stored under, shared with the web frontend's
/// browser storage.
pub const PROGRESS_STORAGE_KEY: &str = "user-progress";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for one material entry.
///
/// Field names (camelCase) and the RFC3339 timestamps match the JSON the
/// web frontend keeps in browser storage, so an exported snapshot loads
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialProgressRecord {
    pub id: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
    pub progress: u8,
}

impl MaterialProgressRecord {
    #[must_use]
    pub fn from_material(material: &MaterialProgress) -> Self {
        Self {
            id: material.id().as_str().to_owned(),
            completed: material.completed(),
            completed_at: material.completed_at(),
            time_spent: material.time_spent(),
            last_accessed: material.last_accessed(),
            progress: material.percent(),
        }
    }

    /// Convert the record back into a domain entry.
    ///
    /// # Errors
    ///
    /// Returns `progress_core::Error` if the stored values violate the
    /// material invariants.
    pub fn into_material(self) -> Result<MaterialProgress, progress_core::Error> {
        Ok(MaterialProgress::from_persisted(
            MaterialId::new(self.id),
            self.completed,
            self.completed_at,
            self.time_spent,
            self.last_accessed,
            self.progress,
        )?)
    }
}

/// Persisted shape for the whole aggregate, stored as a single JSON record
/// under [`PROGRESS_STORAGE_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressRecord {
    pub materials: HashMap<String, MaterialProgressRecord>,
    pub total_time_spent: u32,
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<DateTime<Utc>>,
    pub badges: Vec<String>,
    pub level: u32,
    pub xp: u32,
}

impl UserProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &UserProgress) -> Self {
        let materials = progress
            .materials()
            .iter()
            .map(|(id, material)| {
                (
                    id.as_str().to_owned(),
                    MaterialProgressRecord::from_material(material),
                )
            })
            .collect();

        Self {
            materials,
            total_time_spent: progress.total_time_spent(),
            streak: progress.streak(),
            last_active_date: progress.last_active_date(),
            badges: progress.badges().iter().map(Badge::to_string).collect(),
            level: progress.level(),
            xp: progress.xp(),
        }
    }

    /// Convert the record back into the domain aggregate.
    ///
    /// # Errors
    ///
    /// Returns `progress_core::Error` if any entry, badge name, or the
    /// level/xp pair fails validation. Callers treat the error as a malformed
    /// snapshot.
    pub fn into_progress(self) -> Result<UserProgress, progress_core::Error> {
        let mut materials = HashMap::with_capacity(self.materials.len());
        for (_, record) in self.materials {
            let material = record.into_material()?;
            materials.insert(material.id().clone(), material);
        }

        let mut badges = Vec::with_capacity(self.badges.len());
        for name in &self.badges {
            badges.push(name.parse::<Badge>()?);
        }

        Ok(UserProgress::from_persisted(
            materials,
            self.total_time_spent,
            self.streak,
            self.last_active_date,
            badges,
            self.level,
            self.xp,
        )?)
    }
}

/// Repository contract for the progress snapshot.
///
/// Loading is lenient: a missing or malformed snapshot comes back as `Ok(None)`
/// and the caller substitutes the default zero-state. Only infrastructure
/// failures surface as errors.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored snapshot, if a well-formed one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for infrastructure failures, never for
    /// malformed data.
    async fn load(&self) -> Result<Option<UserProgress>, StorageError>;

    /// Persist the snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(&self, progress: &UserProgress) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshot: Arc<Mutex<Option<UserProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load(&self) -> Result<Option<UserProgress>, StorageError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(progress.clone());
        Ok(())
    }
}

/// Aggregates the progress repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryRepository::new()),
        }
    }
}
