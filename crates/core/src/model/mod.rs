mod badge;
mod ids;
mod material;
mod progress;

pub use badge::{Badge, BadgeParseError};
pub use ids::{MaterialId, ParseIdError};
pub use material::MaterialProgress;
pub use progress::{
    CompletionOutcome, MONTH_STREAK, ProgressDataError, UserProgress, WEEK_STREAK,
    XP_PER_COMPLETION, XP_PER_LEVEL,
};
