//! WebSocket binding of the signaling channel.
//!
//! Each named event travels as one JSON text frame of the form
//! `{"event": <name>, "data": <payload>}`.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{ChannelEvent, ChannelSink, SignalChannel, ID_EVENT, MESSAGE_EVENT};
use crate::client::endpoint::RoomEndpoint;
use crate::error::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Serialize, Deserialize)]
struct EventFrame {
    event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn failure(e: tokio_tungstenite::tungstenite::Error) -> Error {
    Error::ChannelFailure(e.to_string())
}

/// Channel binding over a plain WebSocket connection.
#[derive(Default, Debug, Clone, Copy)]
pub struct WebSocketChannel;

#[async_trait]
impl SignalChannel for WebSocketChannel {
    async fn open(
        &self,
        endpoint: &RoomEndpoint,
    ) -> Result<(Box<dyn ChannelSink>, mpsc::UnboundedReceiver<ChannelEvent>)> {
        let url = format!("ws://{endpoint}/");
        log::info!("opening signaling channel {url}");

        let (stream, _) = connect_async(&url).await.map_err(failure)?;
        let (writer, reader) = stream.split();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        tokio::spawn(read_loop(reader, event_tx));

        Ok((Box::new(WebSocketSink { writer }), event_rx))
    }
}

struct WebSocketSink {
    writer: SplitSink<WsStream, Message>,
}

#[async_trait]
impl ChannelSink for WebSocketSink {
    async fn emit(&mut self, event: &str, payload: serde_json::Value) -> Result<()> {
        let frame = EventFrame {
            event: event.to_owned(),
            data: Some(payload),
        };
        let text = serde_json::to_string(&frame)?;
        self.writer
            .send(Message::Text(text.into()))
            .await
            .map_err(failure)
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.close().await.map_err(failure)
    }
}

async fn read_loop(
    mut reader: SplitStream<WsStream>,
    event_tx: mpsc::UnboundedSender<ChannelEvent>,
) {
    while let Some(msg) = reader.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                let _ = event_tx.send(ChannelEvent::Failed(e.to_string()));
                return;
            }
        };

        let frame = match serde_json::from_str::<EventFrame>(&text) {
            Ok(frame) => frame,
            Err(e) => {
                let _ = event_tx.send(ChannelEvent::Failed(format!("bad event frame: {e}")));
                return;
            }
        };

        let event = match frame.event.as_str() {
            ID_EVENT => {
                let id = match frame.data {
                    Some(serde_json::Value::String(s)) => s,
                    Some(v) => v.to_string(),
                    None => String::new(),
                };
                ChannelEvent::IdAssigned(id)
            }
            MESSAGE_EVENT => {
                ChannelEvent::Message(frame.data.unwrap_or(serde_json::Value::Null))
            }
            other => {
                log::debug!("ignoring channel event {other}");
                continue;
            }
        };

        if event_tx.send(event).is_err() {
            return;
        }
    }

    let _ = event_tx.send(ChannelEvent::Closed);
}
