use crate::message::{IceCandidate, SessionDescription};

/// Connectivity server hint handed to the upstream layer. Direct rooms never
/// populate these; the list exists so the upstream contract matches richer
/// signaling backends.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct IceServer {
    pub urls: Vec<String>,
    pub username: String,
    pub credential: String,
}

/// Everything the upstream layer needs to start call control once the
/// session is connected.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SignalingParameters {
    pub ice_servers: Vec<IceServer>,
    /// Whether this endpoint creates the offer.
    pub initiator: bool,
    /// Remote offer to answer, present only on the responder side.
    pub offer_sdp: Option<SessionDescription>,
}

/// Callback interface toward the upstream call-control layer.
///
/// Callbacks fire on the session worker task; implementations should hand
/// work off rather than block.
pub trait SignalingEvents: Send + Sync {
    /// The session reached the connected state and negotiation may start.
    fn on_connected_to_room(&self, params: SignalingParameters);

    /// The remote peer sent a session description.
    fn on_remote_description(&self, sdp: SessionDescription);

    /// The remote peer sent a connectivity candidate.
    fn on_remote_ice_candidate(&self, candidate: IceCandidate);

    /// The remote peer withdrew a batch of candidates.
    fn on_remote_ice_candidates_removed(&self, candidates: Vec<IceCandidate>);

    /// The session failed. Fires at most once; no further events follow.
    fn on_channel_error(&self, description: String);
}
