use chrono::{DateTime, Utc};

use crate::model::ids::MaterialId;
use crate::model::progress::ProgressDataError;

/// Progress entry for a single lesson/material.
///
/// `percent` and `completed` are monotonic: a later update can only raise the
/// percentage, and a completed material never reverts. `time_spent` is
/// accumulated minutes and only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialProgress {
    id: MaterialId,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    time_spent: u32,
    last_accessed: Option<DateTime<Utc>>,
    percent: u8,
}

impl MaterialProgress {
    /// Fresh entry for a material that was just touched for the first time.
    pub(crate) fn started(id: MaterialId) -> Self {
        Self {
            id,
            completed: false,
            completed_at: None,
            time_spent: 0,
            last_accessed: None,
            percent: 0,
        }
    }

    /// Rehydrate an entry from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressDataError` if the percentage falls outside 0..=100 or
    /// a completed entry does not sit at 100%.
    pub fn from_persisted(
        id: MaterialId,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        time_spent: u32,
        last_accessed: Option<DateTime<Utc>>,
        percent: u8,
    ) -> Result<Self, ProgressDataError> {
        if percent > 100 {
            return Err(ProgressDataError::PercentOutOfRange { id, percent });
        }
        if completed && percent != 100 {
            return Err(ProgressDataError::CompletedBelowFull { id, percent });
        }

        Ok(Self {
            id,
            completed,
            completed_at,
            time_spent,
            last_accessed,
            percent,
        })
    }

    /// Marks the entry complete at `now`.
    ///
    /// `completed_at` is written only on the false-to-true transition, so the
    /// first completion moment survives repeated completion events.
    pub(crate) fn complete(&mut self, now: DateTime<Utc>) {
        if !self.completed {
            self.completed = true;
            self.completed_at = Some(now);
        }
        self.percent = 100;
        self.last_accessed = Some(now);
    }

    /// Applies a soft progress update at `now`.
    ///
    /// Incoming percentages above 100 are treated as 100; values below the
    /// stored percentage are ignored (monotonic floor). Reaching 100% flips
    /// `completed` but deliberately leaves `completed_at` unset: only an
    /// explicit completion event records the moment.
    pub(crate) fn advance(&mut self, percent: u8, minutes: Option<u32>, now: DateTime<Utc>) {
        self.percent = self.percent.max(percent.min(100));
        self.last_accessed = Some(now);
        if let Some(minutes) = minutes {
            self.time_spent = self.time_spent.saturating_add(minutes);
        }
        if self.percent == 100 {
            self.completed = true;
        }
    }

    #[must_use]
    pub fn id(&self) -> &MaterialId {
        &self.id
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Accumulated minutes spent on this material.
    #[must_use]
    pub fn time_spent(&self) -> u32 {
        self.time_spent
    }

    #[must_use]
    pub fn last_accessed(&self) -> Option<DateTime<Utc>> {
        self.last_accessed
    }

    /// Progress percentage in 0..=100.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn entry() -> MaterialProgress {
        MaterialProgress::started(MaterialId::new("css-flexbox"))
    }

    #[test]
    fn advance_applies_monotonic_floor() {
        let now = fixed_now();
        let mut progress = entry();
        progress.advance(50, None, now);
        assert_eq!(progress.percent(), 50);
        progress.advance(30, None, now);
        assert_eq!(progress.percent(), 50);
        progress.advance(50, None, now);
        assert_eq!(progress.percent(), 50);
        progress.advance(80, None, now);
        assert_eq!(progress.percent(), 80);
    }

    #[test]
    fn advance_clamps_overshoot_to_full() {
        let now = fixed_now();
        let mut progress = entry();
        progress.advance(250, None, now);
        assert_eq!(progress.percent(), 100);
        assert!(progress.completed());
        assert_eq!(progress.completed_at(), None);
    }

    #[test]
    fn advance_accumulates_minutes() {
        let now = fixed_now();
        let mut progress = entry();
        progress.advance(10, Some(3), now);
        progress.advance(20, None, now);
        progress.advance(30, Some(2), now);
        assert_eq!(progress.time_spent(), 5);
    }

    #[test]
    fn completed_at_is_written_once() {
        let first = fixed_now();
        let second = first + Duration::days(1);
        let mut progress = entry();
        progress.complete(first);
        progress.complete(second);
        assert_eq!(progress.completed_at(), Some(first));
        assert_eq!(progress.last_accessed(), Some(second));
    }

    #[test]
    fn complete_never_reverts_through_advance() {
        let now = fixed_now();
        let mut progress = entry();
        progress.complete(now);
        progress.advance(10, None, now);
        assert!(progress.completed());
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn from_persisted_rejects_out_of_range_percent() {
        let err = MaterialProgress::from_persisted(
            MaterialId::new("x"),
            false,
            None,
            0,
            None,
            140,
        )
        .unwrap_err();
        assert!(matches!(err, ProgressDataError::PercentOutOfRange { .. }));
    }

    #[test]
    fn from_persisted_rejects_incomplete_completed_entry() {
        let err = MaterialProgress::from_persisted(
            MaterialId::new("x"),
            true,
            Some(fixed_now()),
            0,
            None,
            70,
        )
        .unwrap_err();
        assert!(matches!(err, ProgressDataError::CompletedBelowFull { .. }));
    }
}
