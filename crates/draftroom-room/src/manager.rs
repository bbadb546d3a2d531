//! Room manager: one room per league, created from its configuration.

use std::collections::HashMap;
use std::sync::Arc;

use draftroom_protocol::LeagueId;

use crate::room::spawn_room;
use crate::store::spawn_recorder;
use crate::{DraftStore, LeagueConfig, RoomError, RoomHandle, RoomInfo};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages every running room.
///
/// This is the entry point for room operations from the gateway.
pub struct RoomManager<S: DraftStore> {
    rooms: HashMap<LeagueId, RoomHandle>,
    store: Arc<S>,
    channel_size: usize,
}

impl<S: DraftStore> RoomManager<S> {
    /// Creates a manager whose rooms persist through `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            rooms: HashMap::new(),
            store,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Starts a room for the league and hydrates it from the store.
    ///
    /// A store that fails to answer is logged and the room starts from the
    /// league defaults.
    ///
    /// # Errors
    /// - [`RoomError::InvalidConfig`] if the configuration is inconsistent.
    /// - [`RoomError::AlreadyExists`] if the league already has a room.
    pub async fn create_room(
        &mut self,
        config: LeagueConfig,
    ) -> Result<RoomHandle, RoomError> {
        config.validate()?;
        let league_id = config.league_id.clone();
        if self.rooms.contains_key(&league_id) {
            return Err(RoomError::AlreadyExists(league_id));
        }

        let events = spawn_recorder(Arc::clone(&self.store));
        let handle = spawn_room(config, events, self.channel_size);

        match self.store.load_snapshot(&league_id).await {
            Ok(Some(snapshot)) => {
                let outcome = handle.hydrate(snapshot).await?;
                tracing::info!(room_id = %league_id, ?outcome, "room hydrated from store");
            }
            Ok(None) => {
                tracing::debug!(room_id = %league_id, "no stored snapshot");
            }
            Err(e) => {
                tracing::warn!(
                    room_id = %league_id,
                    error = %e,
                    "snapshot load failed, starting from league defaults"
                );
            }
        }

        self.rooms.insert(league_id.clone(), handle.clone());
        tracing::info!(room_id = %league_id, "room created");
        Ok(handle)
    }

    /// Looks up a league's room.
    pub fn get(&self, league_id: &LeagueId) -> Option<RoomHandle> {
        self.rooms.get(league_id).cloned()
    }

    /// The league to use when a client names none: only defined while
    /// exactly one room is running.
    pub fn sole_league(&self) -> Option<LeagueId> {
        if self.rooms.len() == 1 {
            self.rooms.keys().next().cloned()
        } else {
            None
        }
    }

    /// Shuts down a league's room.
    pub async fn destroy_room(
        &mut self,
        league_id: &LeagueId,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(league_id)
            .ok_or_else(|| RoomError::NotFound(league_id.clone()))?;

        let _ = handle.shutdown().await;
        tracing::info!(room_id = %league_id, "room destroyed");
        Ok(())
    }

    /// Summaries of every running room, sorted by league.
    ///
    /// Rooms that fail to respond (shutting down) are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut infos = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(info) = handle.get_info().await {
                infos.push(info);
            }
        }
        infos.sort_by(|a, b| a.league_id.cmp(&b.league_id));
        infos
    }

    /// Number of running rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Leagues with a running room, sorted.
    pub fn league_ids(&self) -> Vec<LeagueId> {
        let mut ids: Vec<LeagueId> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }
}
