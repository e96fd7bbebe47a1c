//! Walk error taxonomy
//!
//! Only three kinds ever reach the caller: missing credentials, a blown time
//! budget, and fatal input/API failures. Everything that goes wrong below
//! the root folder is absorbed inside the walk.

use thiserror::Error;

use crate::types::WalkResult;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("missing or invalid folder id: {0:?}")]
    InvalidFolderId(String),

    #[error("not authenticated; connect a Google account first")]
    AuthRequired,

    /// The budget fired mid-walk. Carries whatever was aggregated before the
    /// cutoff, with `truncated` set, so the caller can still show it.
    #[error("the folder search took too long; try a smaller or more specific folder")]
    DeadlineExceeded { partial: WalkResult },

    #[error("folder enumeration failed: {0}")]
    Fatal(String),
}
