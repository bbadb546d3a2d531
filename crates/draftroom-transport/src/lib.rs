//! Transport abstraction layer for the draft room.
//!
//! The gateway talks to clients through the [`Transport`] and
//! [`Connection`] traits, never through the socket library directly. A
//! connection is anything that can move frames both ways and report the
//! query string it was opened with.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingConnection, WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Server-assigned identifier for one socket, unique for the life of the
/// process. Sent to the client in `welcome` as `conn-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a raw counter value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw counter value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that hands out upgraded connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client and completes its upgrade.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Stops accepting new clients.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that can send and receive frames.
///
/// Sending and receiving must not block each other: a connection handler
/// reads in one task while a writer task pushes broadcasts.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends binary data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Sends a text frame to the remote peer.
    ///
    /// Defaults to a binary send of the UTF-8 bytes.
    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        self.send(text.as_bytes()).await
    }

    /// Waits for the next data frame. Control frames are handled
    /// internally and never returned.
    ///
    /// `Ok(None)` means the peer closed the socket.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Starts the closing handshake.
    async fn close(&self) -> Result<(), Self::Error>;

    /// The id assigned when the connection was accepted.
    fn id(&self) -> ConnectionId;

    /// Returns the raw query string of the request that opened the
    /// connection (without the leading `?`), if there was one.
    fn query(&self) -> Option<&str>;
}

/// Looks up a single parameter in a raw `a=1&b=2` query string.
///
/// Returns the first match. Values are not percent-decoded; bearer tokens
/// and league identifiers are URL-safe.
pub fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_round_trips_raw_value() {
        assert_eq!(ConnectionId::new(9).into_inner(), 9);
    }

    #[test]
    fn test_connection_id_welcome_format() {
        assert_eq!(ConnectionId::new(12).to_string(), "conn-12");
    }

    #[test]
    fn test_connection_id_orders_by_counter() {
        let mut ids = vec![ConnectionId::new(3), ConnectionId::new(1), ConnectionId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ConnectionId::new(1), ConnectionId::new(2), ConnectionId::new(3)]);
    }

    #[test]
    fn test_query_param_finds_value() {
        let q = "token=abc.def.ghi&leagueId=league-1";
        assert_eq!(query_param(q, "token"), Some("abc.def.ghi"));
        assert_eq!(query_param(q, "leagueId"), Some("league-1"));
    }

    #[test]
    fn test_query_param_missing_key() {
        assert_eq!(query_param("token=abc", "leagueId"), None);
        assert_eq!(query_param("", "token"), None);
    }

    #[test]
    fn test_query_param_ignores_bare_keys() {
        // "debug" has no '=' and must not be mistaken for a token.
        assert_eq!(query_param("debug&token=t1", "token"), Some("t1"));
        assert_eq!(query_param("token", "token"), None);
    }

    #[test]
    fn test_query_param_empty_value() {
        assert_eq!(query_param("token=", "token"), Some(""));
    }
}
