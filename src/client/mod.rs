#[cfg(test)]
mod endpoint_test;

pub mod config;
pub mod endpoint;
pub mod events;

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use crate::channel::websocket::WebSocketChannel;
use crate::channel::{
    ChannelEvent, ChannelSink, SignalChannel, MESSAGE_EVENT, READY_TO_STREAM_EVENT,
};
use crate::client::config::RoomConfig;
use crate::client::endpoint::RoomEndpoint;
use crate::client::events::{SignalingEvents, SignalingParameters};
use crate::error::Error;
use crate::message::{
    IceCandidate, InboundMessage, OutboundEnvelope, SessionDescription, SignalMessage,
};

const NEW_STR: &str = "new";
const CONNECTED_STR: &str = "connected";
const CLOSED_STR: &str = "closed";
const ERROR_STR: &str = "error";

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum ConnectionState {
    New,
    Connected,
    Closed,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConnectionState::New => write!(f, "{NEW_STR}"),
            ConnectionState::Connected => write!(f, "{CONNECTED_STR}"),
            ConnectionState::Closed => write!(f, "{CLOSED_STR}"),
            ConnectionState::Error => write!(f, "{ERROR_STR}"),
        }
    }
}

#[derive(Debug)]
enum Request {
    Connect(RoomConfig),
    Disconnect,
    SendOfferSdp(SessionDescription),
    SendAnswerSdp(SessionDescription),
    SendLocalIceCandidate(IceCandidate),
    SendLocalIceCandidateRemovals(Vec<IceCandidate>),
    StartToOffer,
    Channel(ChannelEvent),
}

/// Signaling client for direct rooms, where the room id is the literal
/// address of the peer to call.
///
/// All operations are fire-and-forget: they enqueue work for a single
/// session worker, and outcomes are observed only through the
/// `SignalingEvents` callbacks. The worker serializes every state
/// transition, so a caller's successive requests and concurrently arriving
/// channel events are handled in one total order.
///
/// Dropping the handle does not end the session; call
/// `disconnect_from_room`.
#[derive(Clone)]
pub struct DirectSignalClient {
    request_tx: mpsc::UnboundedSender<Request>,
}

impl DirectSignalClient {
    /// Creates a client over the WebSocket channel binding and spawns its
    /// session worker on the current runtime.
    pub fn new(events: Arc<dyn SignalingEvents>) -> Self {
        Self::with_channel(events, Arc::new(WebSocketChannel))
    }

    /// Creates a client over a custom channel binding.
    pub fn with_channel(events: Arc<dyn SignalingEvents>, channel: Arc<dyn SignalChannel>) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let session = Session {
            events,
            channel,
            request_tx: request_tx.clone(),
            state: ConnectionState::New,
            remote_peer: None,
            endpoint: None,
            client_name: config::DEFAULT_CLIENT_NAME.to_owned(),
            sink: None,
        };
        tokio::spawn(session.run(request_rx));

        DirectSignalClient { request_tx }
    }

    /// Connects to the room named by `config.room_id`. Completion is
    /// signaled by `on_connected_to_room` once the first inbound init or
    /// offer arrives, or by `on_channel_error`.
    pub fn connect_to_room(&self, config: RoomConfig) {
        self.request(Request::Connect(config));
    }

    /// Closes the channel and ends the session. Idempotent; any request
    /// enqueued after this one is dropped.
    pub fn disconnect_from_room(&self) {
        self.request(Request::Disconnect);
    }

    pub fn send_offer_sdp(&self, sdp: SessionDescription) {
        self.request(Request::SendOfferSdp(sdp));
    }

    pub fn send_answer_sdp(&self, sdp: SessionDescription) {
        self.request(Request::SendAnswerSdp(sdp));
    }

    pub fn send_local_ice_candidate(&self, candidate: IceCandidate) {
        self.request(Request::SendLocalIceCandidate(candidate));
    }

    pub fn send_local_ice_candidate_removals(&self, candidates: Vec<IceCandidate>) {
        self.request(Request::SendLocalIceCandidateRemovals(candidates));
    }

    /// Moves a fresh session to connected as the initiator without waiting
    /// for an inbound init, for peers known to never send one.
    pub fn start_to_offer(&self) {
        self.request(Request::StartToOffer);
    }

    fn request(&self, request: Request) {
        if self.request_tx.send(request).is_err() {
            log::debug!("session worker is gone, request dropped");
        }
    }
}

/// All session state, owned by the worker task and mutated only there.
struct Session {
    events: Arc<dyn SignalingEvents>,
    channel: Arc<dyn SignalChannel>,
    request_tx: mpsc::UnboundedSender<Request>,
    state: ConnectionState,
    remote_peer: Option<String>,
    endpoint: Option<RoomEndpoint>,
    client_name: String,
    sink: Option<Box<dyn ChannelSink>>,
}

impl Session {
    async fn run(mut self, mut request_rx: mpsc::UnboundedReceiver<Request>) {
        while let Some(request) = request_rx.recv().await {
            match request {
                Request::Connect(room_config) => self.connect_to_room(room_config).await,
                Request::Disconnect => {
                    self.disconnect_from_room().await;
                    break;
                }
                Request::SendOfferSdp(sdp) => self.send_offer_sdp(sdp).await,
                Request::SendAnswerSdp(sdp) => self.send_answer_sdp(sdp).await,
                Request::SendLocalIceCandidate(candidate) => {
                    self.send_local_ice_candidate(candidate).await
                }
                Request::SendLocalIceCandidateRemovals(candidates) => {
                    self.send_local_ice_candidate_removals(candidates).await
                }
                Request::StartToOffer => self.start_to_offer(),
                Request::Channel(event) => self.handle_channel_event(event).await,
            }
        }
        // Dropping the receiver here rejects everything enqueued later.
    }

    async fn connect_to_room(&mut self, room_config: RoomConfig) {
        if self.state != ConnectionState::New || self.sink.is_some() {
            self.report_error(&Error::SessionActive);
            return;
        }
        if room_config.loopback {
            self.report_error(&Error::LoopbackUnsupported);
            return;
        }

        let room_endpoint = match RoomEndpoint::resolve(&room_config.room_id) {
            Ok(room_endpoint) => room_endpoint,
            Err(err) => {
                self.report_error(&err);
                return;
            }
        };

        log::info!("connecting to room {room_endpoint}");
        match self.channel.open(&room_endpoint).await {
            Ok((sink, mut channel_rx)) => {
                self.sink = Some(sink);
                self.endpoint = Some(room_endpoint);
                self.client_name = room_config.client_name;

                // Pump channel events into the request queue so they are
                // ordered with caller requests.
                let request_tx = self.request_tx.clone();
                tokio::spawn(async move {
                    while let Some(event) = channel_rx.recv().await {
                        if request_tx.send(Request::Channel(event)).is_err() {
                            break;
                        }
                    }
                });
            }
            Err(err) => self.report_error(&err),
        }
    }

    async fn disconnect_from_room(&mut self) {
        if let Some(endpoint) = &self.endpoint {
            log::info!("disconnecting from room {endpoint} in {} state", self.state);
        } else {
            log::info!("disconnecting from room in {} state", self.state);
        }
        self.state = ConnectionState::Closed;
        if let Some(mut sink) = self.sink.take() {
            if let Err(err) = sink.close().await {
                log::warn!("closing signaling channel: {err}");
            }
        }
    }

    async fn send_offer_sdp(&mut self, sdp: SessionDescription) {
        if self.state != ConnectionState::Connected {
            self.report_error(&Error::SendInNonConnectedState("offer sdp".to_owned()));
            return;
        }
        self.send_signal_message(SignalMessage::Offer { sdp: sdp.sdp }).await;
    }

    async fn send_answer_sdp(&mut self, sdp: SessionDescription) {
        if self.state != ConnectionState::Connected {
            self.report_error(&Error::SendInNonConnectedState("answer sdp".to_owned()));
            return;
        }
        self.send_signal_message(SignalMessage::Answer { sdp: sdp.sdp }).await;
    }

    async fn send_local_ice_candidate(&mut self, candidate: IceCandidate) {
        if self.state != ConnectionState::Connected {
            self.report_error(&Error::SendInNonConnectedState("ice candidate".to_owned()));
            return;
        }
        self.send_signal_message(SignalMessage::Candidate(candidate)).await;
    }

    async fn send_local_ice_candidate_removals(&mut self, candidates: Vec<IceCandidate>) {
        if self.state != ConnectionState::Connected {
            self.report_error(&Error::SendInNonConnectedState(
                "ice candidate removals".to_owned(),
            ));
            return;
        }
        self.send_signal_message(SignalMessage::RemoveCandidates { candidates })
            .await;
    }

    fn start_to_offer(&mut self) {
        if self.state != ConnectionState::New {
            self.report_error(&Error::SessionActive);
            return;
        }
        self.connected_to_room(true, None);
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::IdAssigned(id) => {
                log::info!("assigned id {id}");
                self.emit(READY_TO_STREAM_EVENT, json!({ "name": self.client_name }))
                    .await;
            }
            ChannelEvent::Message(value) => self.handle_inbound_message(value),
            ChannelEvent::Closed => self.report_error(&Error::ChannelClosed),
            ChannelEvent::Failed(description) => {
                self.report_error(&Error::ChannelFailure(description))
            }
        }
    }

    fn handle_inbound_message(&mut self, value: serde_json::Value) {
        log::trace!("inbound message: {value}");

        let inbound = match InboundMessage::from_value(&value) {
            Ok(inbound) => inbound,
            Err(err) => {
                self.report_error(&err);
                return;
            }
        };
        // Every inbound message refreshes the destination of later sends.
        self.remote_peer = Some(inbound.from);

        match inbound.message {
            SignalMessage::Init => {
                if self.state != ConnectionState::New {
                    self.report_unexpected_message("init");
                    return;
                }
                self.connected_to_room(true, None);
            }
            SignalMessage::Offer { sdp } => {
                if self.state != ConnectionState::New {
                    self.report_unexpected_message("offer");
                    return;
                }
                let offer = SessionDescription::offer(sdp);
                self.connected_to_room(false, Some(offer));
            }
            SignalMessage::Answer { sdp } => {
                if self.state != ConnectionState::Connected {
                    self.report_unexpected_message("answer");
                    return;
                }
                self.events
                    .on_remote_description(SessionDescription::answer(sdp));
            }
            SignalMessage::Candidate(candidate) => {
                if self.state != ConnectionState::Connected {
                    self.report_unexpected_message("candidate");
                    return;
                }
                self.events.on_remote_ice_candidate(candidate);
            }
            SignalMessage::RemoveCandidates { candidates } => {
                if self.state != ConnectionState::Connected {
                    self.report_unexpected_message("remove-candidates");
                    return;
                }
                self.events.on_remote_ice_candidates_removed(candidates);
            }
            SignalMessage::Unknown => {
                self.report_error(&Error::UnknownMessageType(value.to_string()));
            }
        }
    }

    fn connected_to_room(&mut self, initiator: bool, offer_sdp: Option<SessionDescription>) {
        self.state = ConnectionState::Connected;
        self.events.on_connected_to_room(SignalingParameters {
            // Direct connections need no relay hints.
            ice_servers: vec![],
            initiator,
            offer_sdp,
        });
    }

    async fn send_signal_message(&mut self, message: SignalMessage) {
        log::debug!("sending {} message", message.kind());
        let envelope = OutboundEnvelope {
            to: self.remote_peer.clone(),
            message,
        };
        match envelope.to_value() {
            Ok(payload) => self.emit(MESSAGE_EVENT, payload).await,
            Err(err) => self.report_error(&err),
        }
    }

    async fn emit(&mut self, event: &str, payload: serde_json::Value) {
        let result = match self.sink.as_mut() {
            Some(sink) => sink.emit(event, payload).await,
            None => Err(Error::ChannelClosed),
        };
        if let Err(err) = result {
            self.report_error(&err);
        }
    }

    fn report_unexpected_message(&mut self, kind: &str) {
        self.report_error(&Error::UnexpectedMessage {
            kind: kind.to_owned(),
            state: self.state.to_string(),
        });
    }

    /// Logs every error; notifies upstream and enters the terminal error
    /// state only for the first one, and never once closed.
    fn report_error(&mut self, err: &Error) {
        log::error!("{err}");
        if self.state == ConnectionState::Error || self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Error;
        self.events.on_channel_error(err.to_string());
    }
}
