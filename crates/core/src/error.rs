use thiserror::Error;

use crate::model::{BadgeParseError, ProgressDataError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Data(#[from] ProgressDataError),
    #[error(transparent)]
    Badge(#[from] BadgeParseError),
}
