//! Error types for the session layer.

use draftroom_transport::ConnectionId;

/// Errors that can occur while authenticating or tracking connections.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The bearer token was missing, malformed, expired, or rejected by the
    /// [`Authenticator`](crate::Authenticator).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No session is registered for the connection.
    #[error("no session for connection {0}")]
    NotFound(ConnectionId),

    /// The connection already has a session. Connection ids are never
    /// reused, so this points at a double registration.
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}
