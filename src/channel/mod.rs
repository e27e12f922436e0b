
pub mod websocket;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::client::endpoint::RoomEndpoint;
use crate::error::Result;

pub const ID_EVENT: &str = "id";
pub const MESSAGE_EVENT: &str = "message";
pub const READY_TO_STREAM_EVENT: &str = "readyToStream";

/// Inbound notifications surfaced by a channel binding.
///
/// A binding forwards exactly two named events, the identity assignment and
/// the generic signaling message; everything else it observes ends the event
/// stream as either a clean close or a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    IdAssigned(String),
    Message(serde_json::Value),
    Closed,
    Failed(String),
}

/// Outbound half of an open channel, exclusively owned by the session
/// controller once the channel is up.
#[async_trait]
pub trait ChannelSink: Send {
    /// Emits one named event carrying a structured payload.
    async fn emit(&mut self, event: &str, payload: serde_json::Value) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

/// Opens a channel to a resolved room endpoint.
///
/// The binding performs no buffering, retry, or reconnection; a broken
/// channel is reported once through the event receiver and stays broken.
#[async_trait]
pub trait SignalChannel: Send + Sync {
    async fn open(
        &self,
        endpoint: &RoomEndpoint,
    ) -> Result<(Box<dyn ChannelSink>, mpsc::UnboundedReceiver<ChannelEvent>)>;
}
