
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single connectivity candidate exchanged over the signaling channel.
///
/// Wire field names follow the channel schema: `id` for the media stream
/// identification tag, `label` for the media line index, `candidate` for the
/// candidate string itself.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    #[serde(rename = "id")]
    pub sdp_mid: String,
    #[serde(rename = "label")]
    pub sdp_mline_index: u16,
    pub candidate: String,
}

impl fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}",
            self.sdp_mid, self.sdp_mline_index, self.candidate
        )
    }
}

const SDP_TYPE_OFFER_STR: &str = "offer";
const SDP_TYPE_ANSWER_STR: &str = "answer";
const UNSPECIFIED_STR: &str = "Unspecified";

/// The kind of a session description in the offer/answer model.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum SdpType {
    #[default]
    Unspecified = 0,

    #[serde(rename = "offer")]
    Offer,

    #[serde(rename = "answer")]
    Answer,
}

impl From<&str> for SdpType {
    fn from(raw: &str) -> Self {
        match raw {
            SDP_TYPE_OFFER_STR => SdpType::Offer,
            SDP_TYPE_ANSWER_STR => SdpType::Answer,
            _ => SdpType::Unspecified,
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SdpType::Offer => write!(f, "{SDP_TYPE_OFFER_STR}"),
            SdpType::Answer => write!(f, "{SDP_TYPE_ANSWER_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

/// A session description handed to or received from the upstream layer.
///
/// Serializes to the canonical `{"type": ..., "sdp": ...}` interchange shape.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type: {}, sdp:\n{}",
            self.sdp_type,
            self.sdp.replace("\r\n", "\n")
        )
    }
}

impl SessionDescription {
    pub fn offer(sdp: String) -> Self {
        SessionDescription {
            sdp_type: SdpType::Offer,
            sdp,
        }
    }

    pub fn answer(sdp: String) -> Self {
        SessionDescription {
            sdp_type: SdpType::Answer,
            sdp,
        }
    }
}

const INIT_KIND_STR: &str = "init";
const OFFER_KIND_STR: &str = "offer";
const ANSWER_KIND_STR: &str = "answer";
const CANDIDATE_KIND_STR: &str = "candidate";
const REMOVE_CANDIDATES_KIND_STR: &str = "remove-candidates";
const UNKNOWN_KIND_STR: &str = "unknown";

/// Body of one signaling message, selected by the wire `type` field with the
/// message-specific content under `payload`.
///
/// `Init` carries no payload. Inbound decoding maps types outside this set
/// to `Unknown`, which the session controller treats as a protocol error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum SignalMessage {
    Init,
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate(IceCandidate),
    RemoveCandidates { candidates: Vec<IceCandidate> },
    #[serde(other)]
    Unknown,
}

impl SignalMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Init => INIT_KIND_STR,
            SignalMessage::Offer { .. } => OFFER_KIND_STR,
            SignalMessage::Answer { .. } => ANSWER_KIND_STR,
            SignalMessage::Candidate(_) => CANDIDATE_KIND_STR,
            SignalMessage::RemoveCandidates { .. } => REMOVE_CANDIDATES_KIND_STR,
            SignalMessage::Unknown => UNKNOWN_KIND_STR,
        }
    }

    fn known_kind(kind: &str) -> bool {
        matches!(
            kind,
            INIT_KIND_STR
                | OFFER_KIND_STR
                | ANSWER_KIND_STR
                | CANDIDATE_KIND_STR
                | REMOVE_CANDIDATES_KIND_STR
        )
    }
}

/// One decoded inbound wire unit: the sender identity plus the message body.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub from: String,
    pub message: SignalMessage,
}

impl InboundMessage {
    /// Decodes one payload of the named "message" channel event.
    ///
    /// `from` and `type` are required; keys beyond the schema are tolerated
    /// so peers that duplicate the discriminator inside payloads still parse.
    /// Unrecognized `type` values decode as `Unknown` with or without a
    /// payload present.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let from = value
            .get("from")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::MalformedMessage("missing from field".to_owned()))?
            .to_owned();
        // Foreign kinds stay Unknown no matter what payload they carry; the
        // content decode runs only for kinds the schema names.
        let message = match value.get("type").and_then(serde_json::Value::as_str) {
            Some(kind) if !SignalMessage::known_kind(kind) => SignalMessage::Unknown,
            _ => serde_json::from_value(value.clone())?,
        };
        Ok(InboundMessage { from, message })
    }
}

/// Outbound wire unit: the message body addressed to the last-seen sender.
///
/// `to` is omitted until the first inbound message reveals the remote peer.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(flatten)]
    pub message: SignalMessage,
}

impl OutboundEnvelope {
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
