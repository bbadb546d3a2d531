//! The bridge to the persistence service.
//!
//! A room reads at most one snapshot when it is created and emits a
//! [`DraftEvent`] for every state-changing transition. Events travel over
//! an unbounded channel to a recorder task, so a slow or failing store
//! never holds up the auction.

use std::collections::HashMap;
use std::sync::Arc;

use draftroom_protocol::{DraftRoomState, DraftedPlayer, LeagueId, TeamId};
use tokio::sync::{Mutex, mpsc};

/// Something the persistence service should know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEvent {
    /// Any transition other than the ones below.
    StateChanged {
        league_id: LeagueId,
        state: DraftRoomState,
    },
    /// A player was awarded; `state` is the state after the pick.
    PlayerSold {
        league_id: LeagueId,
        team_id: TeamId,
        player: DraftedPlayer,
        state: DraftRoomState,
    },
    /// The draft was reset to the league defaults.
    DraftReset {
        league_id: LeagueId,
        state: DraftRoomState,
    },
    /// Every roster is full.
    DraftCompleted {
        league_id: LeagueId,
        state: DraftRoomState,
    },
}

impl DraftEvent {
    pub fn league_id(&self) -> &LeagueId {
        match self {
            Self::StateChanged { league_id, .. }
            | Self::PlayerSold { league_id, .. }
            | Self::DraftReset { league_id, .. }
            | Self::DraftCompleted { league_id, .. } => league_id,
        }
    }

    /// The state after the transition.
    pub fn state(&self) -> &DraftRoomState {
        match self {
            Self::StateChanged { state, .. }
            | Self::PlayerSold { state, .. }
            | Self::DraftReset { state, .. }
            | Self::DraftCompleted { state, .. } => state,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::PlayerSold { .. } => "player_sold",
            Self::DraftReset { .. } => "draft_reset",
            Self::DraftCompleted { .. } => "draft_completed",
        }
    }
}

/// Errors reported by a [`DraftStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing service could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored snapshot could not be parsed.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The system of record between drafts.
pub trait DraftStore: Send + Sync + 'static {
    /// The last known state for a league, if any.
    fn load_snapshot(
        &self,
        league_id: &LeagueId,
    ) -> impl std::future::Future<Output = Result<Option<DraftRoomState>, StoreError>>
    + Send;

    /// Records a transition.
    fn record(
        &self,
        event: DraftEvent,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process [`DraftStore`].
///
/// Keeps the latest state per league and a log of every event. Useful for
/// tests and single-node development; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<LeagueId, DraftRoomState>>,
    events: Mutex<Vec<DraftEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `state` as the league's snapshot.
    pub async fn seed(&self, league_id: LeagueId, state: DraftRoomState) {
        self.snapshots.lock().await.insert(league_id, state);
    }

    /// Parses a JSON snapshot document and stores it for the league.
    ///
    /// # Errors
    /// Returns [`StoreError::Malformed`] if the document is not a valid
    /// draft state.
    pub async fn seed_json(
        &self,
        league_id: LeagueId,
        json: &str,
    ) -> Result<(), StoreError> {
        let state: DraftRoomState = serde_json::from_str(json)?;
        self.seed(league_id, state).await;
        Ok(())
    }

    /// The league's latest recorded state.
    pub async fn snapshot(&self, league_id: &LeagueId) -> Option<DraftRoomState> {
        self.snapshots.lock().await.get(league_id).cloned()
    }

    /// Every event recorded so far, oldest first.
    pub async fn events(&self) -> Vec<DraftEvent> {
        self.events.lock().await.clone()
    }
}

impl DraftStore for MemoryStore {
    async fn load_snapshot(
        &self,
        league_id: &LeagueId,
    ) -> Result<Option<DraftRoomState>, StoreError> {
        Ok(self.snapshot(league_id).await)
    }

    async fn record(&self, event: DraftEvent) -> Result<(), StoreError> {
        self.snapshots
            .lock()
            .await
            .insert(event.league_id().clone(), event.state().clone());
        self.events.lock().await.push(event);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Sender half of a room's event channel.
pub type EventSender = mpsc::UnboundedSender<DraftEvent>;

/// Spawns a task that forwards events to `store` in order.
///
/// Failures are logged and the event is dropped. The task ends once every
/// sender is gone.
pub fn spawn_recorder<S: DraftStore>(store: Arc<S>) -> EventSender {
    let (tx, mut rx) = mpsc::unbounded_channel::<DraftEvent>();

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let league_id = event.league_id().clone();
            let kind = event.kind();
            if let Err(e) = store.record(event).await {
                tracing::warn!(
                    room_id = %league_id,
                    event = kind,
                    error = %e,
                    "failed to record draft event"
                );
            } else {
                tracing::trace!(room_id = %league_id, event = kind, "draft event recorded");
            }
        }
    });

    tx
}
