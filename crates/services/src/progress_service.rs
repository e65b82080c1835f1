use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use progress_core::catalog;
use progress_core::model::{Badge, CompletionOutcome, MaterialId, UserProgress};
use storage::repository::{ProgressRepository, Storage};

use crate::Clock;
use crate::error::ProgressServiceError;

/// Number of badges the dashboard surfaces as "recent".
const RECENT_BADGE_COUNT: usize = 5;

/// Aggregated dashboard numbers for profile and overview surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub streak: u32,
    pub total_minutes: u32,
    pub level: u32,
    pub xp: u32,
    pub xp_into_level: u32,
    pub next_level_xp: u32,
    pub recent_badges: Vec<Badge>,
}

/// Single source of truth for the user's progress.
///
/// Owns the authoritative in-memory snapshot and the persistence boundary.
/// Every write goes through [`mark_material_complete`](Self::mark_material_complete)
/// or [`update_material_progress`](Self::update_material_progress); both apply
/// the pure core mutation under the snapshot lock and then persist
/// best-effort. A failed save is logged and the in-memory snapshot stays
/// authoritative for the session, so neither write can fail.
pub struct ProgressService {
    clock: Clock,
    repository: Arc<dyn ProgressRepository>,
    snapshot: Mutex<UserProgress>,
}

impl ProgressService {
    /// Load the stored snapshot (or the zero-state) and build the service.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the backend cannot be read
    /// at all. A malformed snapshot is not an error; it loads as the
    /// zero-state.
    pub async fn load(clock: Clock, storage: &Storage) -> Result<Self, ProgressServiceError> {
        let snapshot = storage.progress.load().await?.unwrap_or_default();
        Ok(Self::with_state(
            clock,
            Arc::clone(&storage.progress),
            snapshot,
        ))
    }

    /// Build the service around an explicit initial state.
    ///
    /// Lets tests start from any snapshot without touching a backend.
    #[must_use]
    pub fn with_state(
        clock: Clock,
        repository: Arc<dyn ProgressRepository>,
        initial: UserProgress,
    ) -> Self {
        Self {
            clock,
            repository,
            snapshot: Mutex::new(initial),
        }
    }

    // ─── Write interface ───────────────────────────────────────────────────

    /// Record an explicit completion event for `material_id`.
    ///
    /// Awards XP, runs streak and badge bookkeeping, persists, and reports
    /// what changed.
    pub async fn mark_material_complete(&self, material_id: &MaterialId) -> CompletionOutcome {
        let now = self.clock.now();
        let (snapshot, outcome) = {
            let mut guard = self.lock_snapshot();
            let outcome = guard.mark_complete(material_id, now);
            (guard.clone(), outcome)
        };
        self.persist(&snapshot).await;
        outcome
    }

    /// Record a soft progress update for `material_id`.
    ///
    /// The stored percentage only rises, `minutes` accumulate when given, and
    /// no gamification bookkeeping runs.
    pub async fn update_material_progress(
        &self,
        material_id: &MaterialId,
        percent: u8,
        minutes: Option<u32>,
    ) {
        let now = self.clock.now();
        let snapshot = {
            let mut guard = self.lock_snapshot();
            guard.update_progress(material_id, percent, minutes, now);
            guard.clone()
        };
        self.persist(&snapshot).await;
    }

    // ─── Read interface ────────────────────────────────────────────────────

    /// The current snapshot as an immutable value.
    #[must_use]
    pub fn snapshot(&self) -> UserProgress {
        self.lock_snapshot().clone()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.lock_snapshot().completed_count()
    }

    /// Size of the full catalog, the fixed denominator for overall progress.
    #[must_use]
    pub fn total_count(&self) -> usize {
        catalog::TOTAL_MATERIALS
    }

    /// Overall completion percentage in 0..=100.
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        self.lock_snapshot()
            .progress_percentage(catalog::TOTAL_MATERIALS)
    }

    /// Aggregated numbers for dashboard/profile surfaces.
    #[must_use]
    pub fn dashboard(&self) -> DashboardView {
        let snapshot = self.lock_snapshot();
        DashboardView {
            completed: snapshot.completed_count(),
            total: catalog::TOTAL_MATERIALS,
            percentage: snapshot.progress_percentage(catalog::TOTAL_MATERIALS),
            streak: snapshot.streak(),
            total_minutes: snapshot.total_time_spent(),
            level: snapshot.level(),
            xp: snapshot.xp(),
            xp_into_level: snapshot.xp_into_level(),
            next_level_xp: snapshot.next_level_xp(),
            recent_badges: snapshot.recent_badges(RECENT_BADGE_COUNT).to_vec(),
        }
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, UserProgress> {
        // The held state is always a valid aggregate (mutations cannot panic
        // half-applied), so a poisoned lock still carries usable data.
        match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn persist(&self, snapshot: &UserProgress) {
        if let Err(err) = self.repository.save(snapshot).await {
            warn!(error = %err, "failed to persist progress snapshot, in-memory state stays authoritative");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> ProgressService {
        ProgressService::with_state(
            fixed_clock(),
            Arc::new(InMemoryRepository::new()),
            UserProgress::default(),
        )
    }

    #[tokio::test]
    async fn completion_updates_reads_and_persists() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ProgressService::with_state(
            fixed_clock(),
            Arc::clone(&repo) as Arc<dyn ProgressRepository>,
            UserProgress::default(),
        );

        let outcome = service
            .mark_material_complete(&MaterialId::new("git-fundamentals"))
            .await;

        assert_eq!(outcome.xp, 100);
        assert_eq!(service.completed_count(), 1);
        assert_eq!(service.total_count(), 8);
        assert_eq!(service.progress_percentage(), 13);

        let persisted = repo.load().await.unwrap().unwrap();
        assert_eq!(persisted, service.snapshot());
    }

    #[tokio::test]
    async fn soft_updates_do_not_touch_gamification() {
        let service = service();
        service
            .update_material_progress(&MaterialId::new("css-grid"), 45, Some(10))
            .await;

        let dashboard = service.dashboard();
        assert_eq!(dashboard.completed, 0);
        assert_eq!(dashboard.xp, 0);
        assert_eq!(dashboard.streak, 0);
        assert!(dashboard.recent_badges.is_empty());

        let entry = service.snapshot();
        let entry = entry.material(&MaterialId::new("css-grid")).unwrap();
        assert_eq!(entry.percent(), 45);
        assert_eq!(entry.time_spent(), 10);
    }

    #[tokio::test]
    async fn dashboard_reports_xp_window() {
        let service = service();
        for slug in ["a", "b", "c", "d", "e", "f"] {
            service.mark_material_complete(&MaterialId::new(slug)).await;
        }

        let dashboard = service.dashboard();
        assert_eq!(dashboard.xp, 600);
        assert_eq!(dashboard.level, 2);
        assert_eq!(dashboard.xp_into_level, 100);
        assert_eq!(dashboard.next_level_xp, 1000);
        assert_eq!(dashboard.recent_badges, vec![Badge::LevelAchiever(2)]);
    }

    #[tokio::test]
    async fn load_substitutes_zero_state_for_empty_backend() {
        let storage = Storage::in_memory();
        let service = ProgressService::load(fixed_clock(), &storage).await.unwrap();
        assert_eq!(service.snapshot(), UserProgress::default());
    }
}
