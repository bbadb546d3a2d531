//! Wire protocol for the draft room.
//!
//! - **Types** ([`TeamId`], [`UserId`], [`LeagueId`], [`PlayerId`]):
//!   identifiers shared by every layer.
//! - **State** ([`DraftRoomState`], [`TeamDraftState`], ...): the
//!   authoritative snapshot the room broadcasts.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`], [`Envelope`]):
//!   what travels over the socket.
//! - **Codec** ([`Codec`], [`JsonCodec`]): bytes in, messages out.
//!
//! The protocol crate knows nothing about connections or rooms.

mod codec;
mod error;
mod message;
mod state;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientMessage, Envelope, Nomination, ServerMessage};
pub use state::{
    AuctionPhase, BID_HISTORY_LIMIT, Bid, DraftPhase, DraftRoomState,
    DraftType, DraftedPlayer, Player, TeamDraftState, max_bid_for,
};
pub use types::{LeagueId, PlayerId, TeamId, UserId};
