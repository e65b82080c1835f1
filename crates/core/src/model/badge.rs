use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named, permanent achievement marker appended to the user's record.
///
/// Rendered badge names are part of the persisted snapshot format, so
/// `Display` and `FromStr` must stay exact inverses of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    /// Awarded when the user's level rises to the given value.
    LevelAchiever(u32),
    /// Awarded when the daily streak first reaches 7.
    WeekWarrior,
    /// Awarded when the daily streak first reaches 30.
    MonthMaster,
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Badge::LevelAchiever(level) => write!(f, "Level {level} Achiever"),
            Badge::WeekWarrior => write!(f, "Week Warrior"),
            Badge::MonthMaster => write!(f, "Month Master"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized badge name: {0}")]
pub struct BadgeParseError(pub String);

impl FromStr for Badge {
    type Err = BadgeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Week Warrior" => return Ok(Badge::WeekWarrior),
            "Month Master" => return Ok(Badge::MonthMaster),
            _ => {}
        }
        if let Some(level) = s
            .strip_prefix("Level ")
            .and_then(|rest| rest.strip_suffix(" Achiever"))
            .and_then(|level| level.parse::<u32>().ok())
        {
            return Ok(Badge::LevelAchiever(level));
        }
        Err(BadgeParseError(s.to_string()))
    }
}
