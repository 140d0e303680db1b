use thiserror::Error;

use crate::dao::error::RepositoryError;

/// Errors returned by user-initiated coordinator actions.
///
/// Background failures (polling, realtime, leaderboard refresh) never surface
/// here; they are logged and the snapshot keeps its last good value.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The backend call behind the action failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The gameday screen is not visible, so there is no session to apply results to.
    #[error("gameday session is not active")]
    Inactive,
}
