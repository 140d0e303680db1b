/// Check-in attempt driver on top of the flow state machine.
pub mod check_in_flow;
/// Session lifecycle and public surface of the gameday screen.
pub mod coordinator;
/// Periodic event and leaderboard refresh.
pub mod fallback_poller;
/// Single-writer mutation queue for the snapshot.
pub mod funnel;
/// Push-message listen loop.
pub mod realtime_channel;
