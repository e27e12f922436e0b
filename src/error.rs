use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the direct signaling client.
///
/// All of them are reported to the upstream layer through
/// SignalingEvents::on_channel_error rather than returned from the
/// fire-and-forget client operations.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    // configuration
    #[error("loopback connections are not supported for direct rooms")]
    LoopbackUnsupported,
    #[error("room id must be a literal ip address or localhost: {0}")]
    InvalidEndpoint(String),
    #[error("invalid port number: {0}")]
    InvalidPort(String),

    // protocol
    #[error("unexpected signaling message: {0}")]
    UnknownMessageType(String),
    #[error("unexpected {kind} message in {state} state")]
    UnexpectedMessage { kind: String, state: String },
    #[error("malformed signaling message: {0}")]
    MalformedMessage(String),
    #[error("sending {0} in non connected state")]
    SendInNonConnectedState(String),
    #[error("session is already active")]
    SessionActive,

    // channel
    #[error("signaling channel failure: {0}")]
    ChannelFailure(String),
    #[error("signaling channel is closed")]
    ChannelClosed,
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedMessage(e.to_string())
    }
}
