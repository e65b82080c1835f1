#![forbid(unsafe_code)]

pub mod error;
pub mod progress_service;
pub mod trackers;
pub mod views;

pub use progress_core::Clock;

pub use error::ProgressServiceError;
pub use progress_service::{DashboardView, ProgressService};
pub use trackers::{ReadingTracker, VideoTracker};
pub use views::{KindFilter, MaterialListItem};
