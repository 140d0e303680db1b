/// Activation answer and noise-meter bodies.
pub mod activation;
/// Check-in proof, coordinates and receipt.
pub mod check_in;
/// Event document.
pub mod event;
/// Leaderboard payload.
pub mod leaderboard;
pub mod validation;
/// Realtime frames.
pub mod ws;
