//! Consumer-side trackers: the surfaces that feed playback and reading
//! events into the progress store.

mod reading;
mod video;

pub use reading::{
    DEFAULT_COMPLETION_THRESHOLD, ReadingTracker, WORDS_PER_MINUTE, estimated_reading_minutes,
};
pub use video::VideoTracker;
