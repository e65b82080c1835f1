use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::badge::Badge;
use crate::model::ids::MaterialId;
use crate::model::material::MaterialProgress;

/// XP awarded for every completion event.
pub const XP_PER_COMPLETION: u32 = 100;
/// XP span of one level: `level == xp / XP_PER_LEVEL + 1`.
pub const XP_PER_LEVEL: u32 = 500;
/// Streak length that earns `Badge::WeekWarrior`.
pub const WEEK_STREAK: u32 = 7;
/// Streak length that earns `Badge::MonthMaster`.
pub const MONTH_STREAK: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressDataError {
    #[error("material {id} has percent {percent} outside 0..=100")]
    PercentOutOfRange { id: MaterialId, percent: u8 },

    #[error("material {id} is completed but percent is {percent}")]
    CompletedBelowFull { id: MaterialId, percent: u8 },

    #[error("stored level {level} does not match xp {xp}")]
    LevelMismatch { level: u32, xp: u32 },

    #[error("duplicate badge: {0}")]
    DuplicateBadge(Badge),
}

/// What a single completion event changed, for callers that want to surface
/// level-ups or freshly earned badges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub xp: u32,
    pub level: u32,
    pub leveled_up: bool,
    pub streak: u32,
    pub new_badges: Vec<Badge>,
}

/// The whole per-user progress aggregate.
///
/// All mutation goes through [`mark_complete`](Self::mark_complete) and
/// [`update_progress`](Self::update_progress); everything else is a read over
/// the current snapshot. Neither operation can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    materials: HashMap<MaterialId, MaterialProgress>,
    total_time_spent: u32,
    streak: u32,
    last_active_date: Option<DateTime<Utc>>,
    badges: Vec<Badge>,
    level: u32,
    xp: u32,
}

impl Default for UserProgress {
    /// The zero-state a fresh browser/profile starts from.
    fn default() -> Self {
        Self {
            materials: HashMap::new(),
            total_time_spent: 0,
            streak: 0,
            last_active_date: None,
            badges: Vec::new(),
            level: 1,
            xp: 0,
        }
    }
}

fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

impl UserProgress {
    /// Rehydrate the aggregate from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressDataError` if the stored level disagrees with the
    /// stored XP or the badge list contains duplicates. Callers treat any
    /// error as a malformed snapshot and fall back to the default zero-state.
    pub fn from_persisted(
        materials: HashMap<MaterialId, MaterialProgress>,
        total_time_spent: u32,
        streak: u32,
        last_active_date: Option<DateTime<Utc>>,
        badges: Vec<Badge>,
        level: u32,
        xp: u32,
    ) -> Result<Self, ProgressDataError> {
        if level != level_for_xp(xp) {
            return Err(ProgressDataError::LevelMismatch { level, xp });
        }
        let mut seen = HashSet::new();
        for badge in &badges {
            if !seen.insert(*badge) {
                return Err(ProgressDataError::DuplicateBadge(*badge));
            }
        }

        Ok(Self {
            materials,
            total_time_spent,
            streak,
            last_active_date,
            badges,
            level,
            xp,
        })
    }

    /// Record an explicit completion event for `id` at `now`.
    ///
    /// Any id is accepted; unknown ids start a fresh entry. Repeating the
    /// event is idempotent for `completed`/`percent` but still awards XP and
    /// runs streak bookkeeping: every completion event counts.
    pub fn mark_complete(&mut self, id: &MaterialId, now: DateTime<Utc>) -> CompletionOutcome {
        let entry = self
            .materials
            .entry(id.clone())
            .or_insert_with(|| MaterialProgress::started(id.clone()));
        let banked_minutes = entry.time_spent();
        entry.complete(now);

        self.xp = self.xp.saturating_add(XP_PER_COMPLETION);
        self.total_time_spent = self.total_time_spent.saturating_add(banked_minutes);

        let mut new_badges = Vec::new();
        let new_level = level_for_xp(self.xp);
        let leveled_up = new_level > self.level;
        if leveled_up {
            self.level = new_level;
            self.push_badge(Badge::LevelAchiever(new_level), &mut new_badges);
        }

        // Streak over calendar days: consecutive day extends it, a gap (or
        // first-ever activity) resets it to 1, same-day repeats leave it be.
        let today = now.date_naive();
        match self.last_active_date.map(|at| at.date_naive()) {
            Some(day) if today.pred_opt() == Some(day) => {
                self.streak = self.streak.saturating_add(1);
            }
            Some(day) if day == today => {}
            _ => self.streak = 1,
        }
        self.last_active_date = Some(now);

        if self.streak == WEEK_STREAK {
            self.push_badge(Badge::WeekWarrior, &mut new_badges);
        }
        if self.streak == MONTH_STREAK {
            self.push_badge(Badge::MonthMaster, &mut new_badges);
        }

        CompletionOutcome {
            xp: self.xp,
            level: self.level,
            leveled_up,
            streak: self.streak,
            new_badges,
        }
    }

    /// Record a soft progress update for `id` at `now`.
    ///
    /// The stored percentage only ever rises (monotonic floor), `minutes`
    /// accumulate when given, and reaching 100% flips `completed`. This path
    /// awards no XP, counts no streak, and appends no badges; only
    /// [`mark_complete`](Self::mark_complete) does.
    pub fn update_progress(
        &mut self,
        id: &MaterialId,
        percent: u8,
        minutes: Option<u32>,
        now: DateTime<Utc>,
    ) {
        let entry = self
            .materials
            .entry(id.clone())
            .or_insert_with(|| MaterialProgress::started(id.clone()));
        entry.advance(percent, minutes, now);
        self.last_active_date = Some(now);
    }

    fn push_badge(&mut self, badge: Badge, new_badges: &mut Vec<Badge>) {
        if !self.badges.contains(&badge) {
            self.badges.push(badge);
            new_badges.push(badge);
        }
    }

    // ─── Derived reads ─────────────────────────────────────────────────────

    #[must_use]
    pub fn materials(&self) -> &HashMap<MaterialId, MaterialProgress> {
        &self.materials
    }

    #[must_use]
    pub fn material(&self, id: &MaterialId) -> Option<&MaterialProgress> {
        self.materials.get(id)
    }

    /// Number of materials with `completed == true`.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.materials.values().filter(|m| m.completed()).count()
    }

    /// Overall completion percentage against a fixed catalog size.
    ///
    /// Rounded half-up; 0 when `total` is 0. `total` is the catalog size,
    /// not the number of started materials.
    #[must_use]
    pub fn progress_percentage(&self, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        let rounded = (self.completed_count() * 100 + total / 2) / total;
        u8::try_from(rounded).unwrap_or(100)
    }

    /// Aggregate minutes banked through completion events.
    #[must_use]
    pub fn total_time_spent(&self) -> u32 {
        self.total_time_spent
    }

    /// Consecutive calendar days with at least one completion event.
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn last_active_date(&self) -> Option<DateTime<Utc>> {
        self.last_active_date
    }

    /// Earned badges, oldest first. Append-only, never contains duplicates.
    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// The most recently earned badges, oldest of them first.
    #[must_use]
    pub fn recent_badges(&self, count: usize) -> &[Badge] {
        let start = self.badges.len().saturating_sub(count);
        &self.badges[start..]
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// XP accumulated inside the current level, in 0..XP_PER_LEVEL.
    #[must_use]
    pub fn xp_into_level(&self) -> u32 {
        self.xp - (self.level - 1) * XP_PER_LEVEL
    }

    /// Total XP required to reach the next level.
    #[must_use]
    pub fn next_level_xp(&self) -> u32 {
        self.level * XP_PER_LEVEL
    }

    /// Materials ordered by most recent access, at most `count` of them.
    #[must_use]
    pub fn recently_accessed(&self, count: usize) -> Vec<&MaterialProgress> {
        let mut entries: Vec<&MaterialProgress> = self
            .materials
            .values()
            .filter(|m| m.last_accessed().is_some())
            .collect();
        entries.sort_by(|a, b| b.last_accessed().cmp(&a.last_accessed()));
        entries.truncate(count);
        entries
    }
}
