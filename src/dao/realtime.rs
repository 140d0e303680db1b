use futures::{future::BoxFuture, stream::BoxStream};

use crate::dao::error::ChannelError;

/// Text frames received on an open push connection. A `None` means the peer closed it.
pub type FrameStream = BoxStream<'static, Result<String, ChannelError>>;

/// Opens the push connection for one event.
pub trait RealtimeConnector: Send + Sync {
    /// Open the connection; the returned stream ends when the peer closes it.
    fn connect(&self, event_id: &str) -> BoxFuture<'static, Result<FrameStream, ChannelError>>;
}
