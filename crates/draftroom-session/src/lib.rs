//! Who is connected to the draft room, and who they are.
//!
//! 1. **Authentication**: turning a bearer token into an [`Identity`]
//!    ([`Authenticator`] trait, [`JwtAuthenticator`]).
//! 2. **Registry**: one [`Session`] per live connection
//!    ([`ConnectionRegistry`]).
//!
//! ```text
//! Gateway (above)   ← authenticates sockets, registers sessions
//!     ↕
//! Session (this crate)
//!     ↕
//! Protocol / Transport (below)   ← UserId, LeagueId, ConnectionId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod registry;

pub use auth::{Authenticator, Claims, Identity, JwtAuthenticator};
pub use error::SessionError;
pub use registry::{ConnectionRegistry, Session};
