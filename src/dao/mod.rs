/// Error types shared by every collaborator boundary.
pub mod error;
/// REST implementation of the repositories.
#[cfg(feature = "http-repos")]
pub mod http;
/// Location and beacon sensing boundary.
pub mod location;
/// Push connection boundary.
pub mod realtime;
/// Backend repository boundaries.
pub mod repository;
/// WebSocket implementation of the push connection.
#[cfg(feature = "ws-channel")]
pub mod websocket;
