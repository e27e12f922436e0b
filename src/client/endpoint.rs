use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 8888;

lazy_static! {
    // Room ids must look like a literal IP address or "localhost", with an
    // optional port. Anchored; group `addr` is the address as written,
    // group `port` the trailing digits.
    static ref IP_PATTERN: Regex = Regex::new(concat!(
        "^(?P<addr>",
        // IPv4
        r"((\d+\.){3}\d+)|",
        // IPv6
        r"\[((([0-9a-fA-F]{1,4}:)*[0-9a-fA-F]{1,4})?::(([0-9a-fA-F]{1,4}:)*[0-9a-fA-F]{1,4})?)\]|",
        r"\[(([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4})\]|",
        // IPv6 without []
        r"((([0-9a-fA-F]{1,4}:)*[0-9a-fA-F]{1,4})?::(([0-9a-fA-F]{1,4}:)*[0-9a-fA-F]{1,4})?)|",
        r"(([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4})|",
        // literals
        "localhost",
        ")",
        // optional port number
        r"(:(?P<port>\d+))?$",
    ))
    .unwrap();
}

/// Host and port resolved from a room id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEndpoint {
    pub host: String,
    pub port: u16,
}

impl RoomEndpoint {
    /// Resolves a room id of the form `<address>[:<port>]`.
    ///
    /// The address must be a literal IPv4 or IPv6 address (bracketed or
    /// unbracketed) or `localhost`; anything else is a configuration error.
    /// The port defaults to `DEFAULT_PORT` when absent. Brackets around an
    /// IPv6 address are stripped from the resolved host.
    pub fn resolve(room_id: &str) -> Result<Self> {
        let caps = IP_PATTERN
            .captures(room_id)
            .ok_or_else(|| Error::InvalidEndpoint(room_id.to_owned()))?;

        let addr = caps.name("addr").map(|m| m.as_str()).unwrap_or_default();
        let host = if addr.starts_with('[') && addr.ends_with(']') {
            addr[1..addr.len() - 1].to_owned()
        } else {
            addr.to_owned()
        };

        let port = match caps.name("port") {
            Some(m) => m
                .as_str()
                .parse::<u16>()
                .map_err(|_| Error::InvalidPort(m.as_str().to_owned()))?,
            None => DEFAULT_PORT,
        };

        Ok(RoomEndpoint { host, port })
    }
}

impl fmt::Display for RoomEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
