//! The draft room: one actor per league owning the authoritative auction.
//!
//! Each room runs as an isolated Tokio task with its own draft state,
//! member list, and countdown.
//!
//! # Key types
//!
//! - [`RoomManager`]: creates, finds, and destroys rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`LeagueConfig`]: budgets, roster size, draft type, owners
//! - [`rules`]: validation and state transitions, as pure functions
//! - [`DraftStore`]: hydration source and event sink

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod manager;
pub mod order;
mod room;
pub mod rules;
mod store;

pub use config::{LeagueConfig, NominationPolicy, SnakeBoundary, TeamConfig};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{ConnectionSender, Origin, RoomHandle, RoomInfo};
pub use rules::{HydrationOutcome, Rejection, Sale};
pub use store::{
    DraftEvent, DraftStore, EventSender, MemoryStore, StoreError,
    spawn_recorder,
};
