use std::sync::Arc;

use progress_core::model::{CompletionOutcome, MaterialId};

use crate::progress_service::ProgressService;

/// Tracks one video playback session and reports it to the progress store.
///
/// Contract with the store: playback positions report a monotonic progress
/// percentage, each fully watched minute is reported exactly once, and the
/// natural end of playback marks the material complete exactly once. Seeking
/// backwards lowers the reported position but never the stored percentage
/// (the store keeps the monotonic floor).
pub struct VideoTracker {
    service: Arc<ProgressService>,
    material_id: MaterialId,
    watch_seconds: u32,
    reported_minutes: u32,
    ended: bool,
}

impl VideoTracker {
    #[must_use]
    pub fn new(service: Arc<ProgressService>, material_id: MaterialId) -> Self {
        Self {
            service,
            material_id,
            watch_seconds: 0,
            reported_minutes: 0,
            ended: false,
        }
    }

    /// Feed one second-granularity playback tick.
    ///
    /// `position_seconds`/`duration_seconds` come from the player; each call
    /// counts one second of watch time. Whole watched minutes are passed to
    /// the store as a delta, so a minute is never accumulated twice.
    pub async fn tick(&mut self, position_seconds: f64, duration_seconds: f64) {
        self.watch_seconds = self.watch_seconds.saturating_add(1);

        let percent = position_percent(position_seconds, duration_seconds);
        let whole_minutes = self.watch_seconds / 60;
        let minutes_delta = whole_minutes - self.reported_minutes;
        self.reported_minutes = whole_minutes;

        let minutes = (minutes_delta > 0).then_some(minutes_delta);
        self.service
            .update_material_progress(&self.material_id, percent, minutes)
            .await;
    }

    /// Playback reached its natural end.
    ///
    /// Marks the material complete; subsequent calls are ignored so one
    /// session produces at most one completion event.
    pub async fn finish(&mut self) -> Option<CompletionOutcome> {
        if self.ended {
            return None;
        }
        self.ended = true;
        Some(
            self.service
                .mark_material_complete(&self.material_id)
                .await,
        )
    }

    /// Seconds of playback observed in this session.
    #[must_use]
    pub fn watch_seconds(&self) -> u32 {
        self.watch_seconds
    }

    #[must_use]
    pub fn ended(&self) -> bool {
        self.ended
    }
}

fn position_percent(position_seconds: f64, duration_seconds: f64) -> u8 {
    if duration_seconds <= 0.0 {
        return 0;
    }
    let percent = (position_seconds / duration_seconds * 100.0).clamp(0.0, 100.0);
    // Truncate rather than round so 100% is only reported at the actual end.
    percent as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_percent_handles_edges() {
        assert_eq!(position_percent(30.0, 120.0), 25);
        assert_eq!(position_percent(119.5, 120.0), 99);
        assert_eq!(position_percent(120.0, 120.0), 100);
        assert_eq!(position_percent(10.0, 0.0), 0);
        assert_eq!(position_percent(-3.0, 120.0), 0);
        assert_eq!(position_percent(500.0, 120.0), 100);
    }
}
