use std::error::Error;
use thiserror::Error;

type BoxError = Box<dyn Error + Send + Sync>;

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error raised by any remote repository regardless of the transport behind it.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The request never produced a response (offline, timeout, TLS...).
    #[error("{message}")]
    Transport {
        /// What was being attempted.
        message: String,
        /// Client error behind the failure, when there is one.
        #[source]
        source: Option<BoxError>,
    },
    /// Token rejected; refreshing it is the auth layer's job.
    #[error("unauthorized")]
    Unauthorized,
    /// The resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other non-success status.
    #[error("unexpected response status {status} for `{path}`")]
    Status {
        /// Request path.
        path: String,
        /// HTTP status code received.
        status: u16,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response for `{path}`")]
    Decode {
        /// Request path.
        path: String,
        /// Deserialization error.
        #[source]
        source: BoxError,
    },
}

impl RepositoryError {
    /// Transport failure without an underlying error value.
    pub fn transport(message: impl Into<String>) -> Self {
        RepositoryError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Transport failure wrapping the client error that caused it.
    pub fn transport_caused_by(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        RepositoryError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Decoding failure for the response of `path`.
    pub fn decode(path: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        RepositoryError::Decode {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// Failure of the location collaborator.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The user denied location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// No fix could be obtained.
    #[error("location unavailable: {0}")]
    Unavailable(String),
    /// Beacon ranging could not be started.
    #[error("beacon ranging failed: {0}")]
    Ranging(String),
}

/// Failure of the realtime push connection.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The connection could not be opened.
    #[error("failed to connect to `{url}`")]
    Connect {
        /// Endpoint that was dialed.
        url: String,
        /// Handshake or transport error.
        #[source]
        source: BoxError,
    },
    /// The open connection failed while receiving.
    #[error("realtime transport error")]
    Transport(#[source] BoxError),
}
