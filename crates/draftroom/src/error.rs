//! Unified error type for the draft room server.

use draftroom_protocol::ProtocolError;
use draftroom_room::{RoomError, StoreError};
use draftroom_session::SessionError;
use draftroom_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DraftRoomError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (auth, registry).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (unknown league, invalid config, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The persistence bridge failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The liveness listener failed.
    #[error("health listener: {0}")]
    Health(#[source] std::io::Error),
}
