use std::time::Duration;

/// Runtime configuration describing how to reach the gameday API.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Root of every resource path, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Access token sent as `Authorization: Bearer`.
    pub bearer_token: Option<String>,
    /// Upper bound for a whole request.
    pub request_timeout: Duration,
}

impl HttpConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Attach the access token issued by the auth layer.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
