//! # Draftroom
//!
//! Live auction draft room server for fantasy leagues.
//!
//! Every league gets one room: an actor that owns the draft state and
//! applies nominations, bids, and the going-once / going-twice / sold
//! countdown in a single serialized order. Clients connect over WebSocket
//! with a bearer token, and every accepted change is broadcast to the
//! whole room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use draftroom::prelude::*;
//!
//! # async fn run() -> Result<(), DraftRoomError> {
//! let league = LeagueConfig {
//!     teams: vec![
//!         TeamConfig { id: TeamId::from("t1"), name: "Sluggers".into() },
//!         TeamConfig { id: TeamId::from("t2"), name: "Aces".into() },
//!     ],
//!     ..LeagueConfig::default()
//! };
//!
//! let server = DraftRoomServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .health_bind("0.0.0.0:8081")
//!     .league(league)
//!     .build(JwtAuthenticator::new(b"secret"))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::DraftRoomError;
pub use server::{DraftRoomServer, DraftRoomServerBuilder, health_router};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{DraftRoomError, DraftRoomServer, DraftRoomServerBuilder};

    pub use draftroom_protocol::{
        AuctionPhase, Bid, ClientMessage, Codec, DraftPhase, DraftRoomState,
        DraftType, Envelope, JsonCodec, LeagueId, Nomination, Player,
        PlayerId, ServerMessage, TeamId, UserId,
    };
    pub use draftroom_room::{
        DraftEvent, DraftStore, LeagueConfig, MemoryStore, NominationPolicy,
        RoomHandle, SnakeBoundary, StoreError, TeamConfig,
    };
    pub use draftroom_session::{
        Authenticator, Identity, JwtAuthenticator, SessionError,
    };
}
