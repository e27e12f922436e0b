pub const DEFAULT_CLIENT_NAME: &str = "direct-client";

/// Connection parameters for a direct room.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Room id: a literal IP address or "localhost", with an optional
    /// `:port` suffix (port 8888 when omitted).
    pub room_id: String,
    /// Loopback sessions are not supported by the direct client; requesting
    /// one fails the connect.
    pub loopback: bool,
    /// Label announced on the readyToStream event once the channel assigns
    /// this endpoint an identity.
    pub client_name: String,
}

impl RoomConfig {
    pub fn new(room_id: String) -> Self {
        RoomConfig {
            room_id,
            loopback: false,
            client_name: DEFAULT_CLIENT_NAME.to_owned(),
        }
    }
}
