//! Error types for the room layer.

use draftroom_protocol::LeagueId;
use draftroom_transport::ConnectionId;

/// Errors that can occur during room operations.
///
/// Rejected auction actions are not errors; see
/// [`Rejection`](crate::Rejection).
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room is running for the league.
    #[error("no room for league {0}")]
    NotFound(LeagueId),

    /// A room is already running for the league.
    #[error("room for league {0} already exists")]
    AlreadyExists(LeagueId),

    /// The connection has already joined this room.
    #[error("connection {0} already in room {1}")]
    AlreadyJoined(ConnectionId, LeagueId),

    /// The connection is not in this room.
    #[error("connection {0} not in room {1}")]
    NotInRoom(ConnectionId, LeagueId),

    /// The league configuration contradicts itself.
    #[error("invalid league config: {0}")]
    InvalidConfig(String),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(LeagueId),
}
