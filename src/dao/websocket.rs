use std::sync::Arc;

use futures::{FutureExt, StreamExt, future::BoxFuture};
use tokio_tungstenite::tungstenite::{
    Message,
    client::IntoClientRequest,
    http::{HeaderValue, header::AUTHORIZATION},
};

use crate::dao::{
    error::ChannelError,
    realtime::{FrameStream, RealtimeConnector},
};

/// Push connection over WebSocket, one socket per event at
/// `{base_url}/events/{event_id}/live`.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl WebSocketConnector {
    /// Connector for `base_url` (`ws://` or `wss://`).
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: Arc::from(base_url.as_ref().trim_end_matches('/')),
            token: None,
        }
    }

    /// Send the access token in the upgrade request.
    pub fn with_bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.token = Some(Arc::from(token.as_ref()));
        self
    }

    fn endpoint(&self, event_id: &str) -> String {
        format!("{}/events/{}/live", self.base_url, event_id)
    }
}

impl RealtimeConnector for WebSocketConnector {
    fn connect(&self, event_id: &str) -> BoxFuture<'static, Result<FrameStream, ChannelError>> {
        let url = self.endpoint(event_id);
        let token = self.token.clone();

        async move {
            let connect_error = |source: tokio_tungstenite::tungstenite::Error| ChannelError::Connect {
                url: url.clone(),
                source: Box::new(source),
            };

            let mut request = url.as_str().into_client_request().map_err(connect_error)?;
            if let Some(token) = token {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|source| {
                    ChannelError::Connect {
                        url: url.clone(),
                        source: Box::new(source),
                    }
                })?;
                request.headers_mut().insert(AUTHORIZATION, value);
            }

            let (socket, _response) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(connect_error)?;

            let frames = socket.filter_map(|message| async move {
                match message {
                    Ok(Message::Text(text)) => Some(Ok(text)),
                    Ok(Message::Binary(bytes)) => Some(
                        String::from_utf8(bytes)
                            .map_err(|source| ChannelError::Transport(Box::new(source))),
                    ),
                    // Control frames are answered by tungstenite; the stream ends after close.
                    Ok(Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_)) => None,
                    Err(source) => Some(Err(ChannelError::Transport(Box::new(source)))),
                }
            });

            Ok(frames.boxed())
        }
        .boxed()
    }
}
