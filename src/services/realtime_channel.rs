use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    dao::realtime::RealtimeConnector,
    dto::ws::RealtimeMessage,
    services::funnel::MutationSink,
    state::Mutation,
};

/// Lifecycle of the push connection for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    /// No session has started the channel yet.
    #[default]
    Idle,
    /// Opening the connection.
    Connecting,
    /// Receiving frames.
    Listening,
    /// Loop ended; it is never restarted within the session.
    Terminated,
}

/// Listen loop feeding decoded push messages into the mutation funnel.
///
/// Any connect, transport or decode failure ends the loop for good; freshness
/// then rests on the fallback poller.
pub struct RealtimeChannel {
    event_id: String,
    connector: Arc<dyn RealtimeConnector>,
    state: Arc<watch::Sender<ChannelState>>,
}

impl RealtimeChannel {
    /// Channel for `event_id`, publishing its lifecycle on `state`.
    pub fn new(
        event_id: String,
        connector: Arc<dyn RealtimeConnector>,
        state: Arc<watch::Sender<ChannelState>>,
    ) -> Self {
        Self {
            event_id,
            connector,
            state,
        }
    }

    /// Run until the connection fails, closes, or the session is torn down.
    pub async fn run(self, sink: MutationSink) {
        self.state.send_replace(ChannelState::Connecting);
        self.listen(&sink).await;
        self.state.send_replace(ChannelState::Terminated);
    }

    async fn listen(&self, sink: &MutationSink) {
        let event_id = self.event_id.as_str();

        let mut frames = match sink.until_cancelled(self.connector.connect(event_id)).await {
            None => return,
            Some(Ok(frames)) => frames,
            Some(Err(err)) => {
                warn!(event_id, error = %err, "realtime connect failed; relying on fallback polling");
                return;
            }
        };

        self.state.send_replace(ChannelState::Listening);
        info!(event_id, "realtime channel listening");

        loop {
            let raw = match sink.until_cancelled(frames.next()).await {
                None => {
                    debug!(event_id, "realtime channel cancelled");
                    return;
                }
                Some(None) => {
                    info!(event_id, "realtime connection closed by peer");
                    return;
                }
                Some(Some(Err(err))) => {
                    warn!(event_id, error = %err, "realtime transport failed; relying on fallback polling");
                    return;
                }
                Some(Some(Ok(raw))) => raw,
            };

            let message = match RealtimeMessage::from_json_str(&raw) {
                Ok(message) => message,
                Err(err) => {
                    warn!(event_id, error = %err, "undecodable realtime frame; ending listen loop");
                    return;
                }
            };

            if message.event_id() != event_id {
                debug!(event_id, other = message.event_id(), "skipping frame for another event");
                continue;
            }

            debug!(event_id, ?message, "realtime message");
            if !sink.submit(Mutation::Realtime(message)).await {
                return;
            }
        }
    }
}
