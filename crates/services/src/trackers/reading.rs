use std::sync::Arc;

use progress_core::model::{CompletionOutcome, MaterialId};

use crate::progress_service::ProgressService;

/// Scroll depth (percent) at which a text lesson counts as read.
pub const DEFAULT_COMPLETION_THRESHOLD: u8 = 80;

/// Average reading speed assumed for the estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated reading time for a lesson body, in whole minutes, at least 1.
#[must_use]
pub fn estimated_reading_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Tracks one text-lesson reading session and reports it to the store.
///
/// Scroll depth feeds the soft progress path; crossing the completion
/// threshold (or the explicit "mark as read" action) routes through
/// `mark_material_complete`, at most once per session.
pub struct ReadingTracker {
    service: Arc<ProgressService>,
    material_id: MaterialId,
    threshold: u8,
    completed: bool,
}

impl ReadingTracker {
    #[must_use]
    pub fn new(service: Arc<ProgressService>, material_id: MaterialId) -> Self {
        Self::with_threshold(service, material_id, DEFAULT_COMPLETION_THRESHOLD)
    }

    /// Tracker with a custom completion threshold (clamped to 1..=100).
    #[must_use]
    pub fn with_threshold(
        service: Arc<ProgressService>,
        material_id: MaterialId,
        threshold: u8,
    ) -> Self {
        Self {
            service,
            material_id,
            threshold: threshold.clamp(1, 100),
            completed: false,
        }
    }

    /// Feed the current scroll depth in percent.
    ///
    /// Reports the depth as soft progress; the first time the depth reaches
    /// the threshold, the lesson is marked complete and the outcome returned.
    pub async fn scroll_to(&mut self, depth_percent: u8) -> Option<CompletionOutcome> {
        let depth = depth_percent.min(100);
        self.service
            .update_material_progress(&self.material_id, depth, None)
            .await;

        if depth >= self.threshold && !self.completed {
            self.completed = true;
            return Some(
                self.service
                    .mark_material_complete(&self.material_id)
                    .await,
            );
        }
        None
    }

    /// The explicit "mark as read" action.
    ///
    /// Raises the soft progress to 100% and records the completion event,
    /// unless this session already completed the lesson.
    pub async fn mark_done(&mut self) -> Option<CompletionOutcome> {
        if self.completed {
            return None;
        }
        self.completed = true;
        self.service
            .update_material_progress(&self.material_id, 100, None)
            .await;
        Some(
            self.service
                .mark_material_complete(&self.material_id)
                .await,
        )
    }

    /// Report minutes spent reading, without touching the percentage.
    pub async fn log_reading_time(&self, minutes: u32) {
        if minutes == 0 {
            return;
        }
        self.service
            .update_material_progress(&self.material_id, 0, Some(minutes))
            .await;
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}
