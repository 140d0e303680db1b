//! Library crate for gameday-core, exposing the coordinator and its collaborators
//! to the runner binary and integration tests.

pub mod config;
/// Collaborator boundaries and their network implementations.
pub mod dao;
/// Wire types.
pub mod dto;
/// Errors of user-initiated actions.
pub mod error;
/// Session workers and the coordinator.
pub mod services;
/// Domain model, snapshot and pure transitions.
pub mod state;

pub use services::coordinator::{Collaborators, Coordinator, SharedCoordinator};
pub use state::GamedaySnapshot;
