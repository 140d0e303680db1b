//! Narrow boundaries to the backend collaborators consumed by the coordinator.
//!
//! Every call returns a `'static` boxed future so implementations can be held
//! as `Arc<dyn ...>` and awaited from spawned tasks.

use futures::future::BoxFuture;

use crate::{
    dao::error::RepositoryResult,
    dto::{
        activation::BalanceUpdate,
        check_in::{CheckInProof, CheckInReceipt},
    },
    state::event::{Event, Leaderboard},
};

/// Source of full event documents.
pub trait EventRepository: Send + Sync {
    /// `GET /events/{id}`.
    fn fetch_event(&self, event_id: &str) -> BoxFuture<'static, RepositoryResult<Event>>;
}

/// Check-in submission endpoint.
pub trait CheckInRepository: Send + Sync {
    /// `POST /events/{id}/check-ins`.
    fn submit_check_in(
        &self,
        event_id: &str,
        proof: CheckInProof,
    ) -> BoxFuture<'static, RepositoryResult<CheckInReceipt>>;
}

/// Activation answer endpoints; both return the authoritative balance.
pub trait ActivationRepository: Send + Sync {
    /// `POST /activations/{id}/answers`.
    fn submit_answer(
        &self,
        activation_id: &str,
        option_id: &str,
    ) -> BoxFuture<'static, RepositoryResult<BalanceUpdate>>;
    /// `POST /activations/{id}/noise-meter`.
    fn submit_noise_meter(
        &self,
        activation_id: &str,
        level: f64,
    ) -> BoxFuture<'static, RepositoryResult<BalanceUpdate>>;
}

/// Leaderboard snapshots.
pub trait LeaderboardRepository: Send + Sync {
    /// `GET /events/{id}/leaderboard`.
    fn fetch_leaderboard(&self, event_id: &str) -> BoxFuture<'static, RepositoryResult<Leaderboard>>;
}
