//! The authoritative draft room state and the records it is built from.
//!
//! Every type here is sent to clients as-is, so field names follow the
//! camelCase wire format. The room actor is the only writer; everything
//! else receives cloned snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{PlayerId, TeamId};

/// Number of bids kept in [`DraftRoomState::bid_history`].
pub const BID_HISTORY_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Where the active nomination is in the going-once/going-twice countdown.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum AuctionPhase {
    #[default]
    Idle,
    GoingOnce,
    GoingTwice,
    Sold,
}

/// How the nomination order advances from round to round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum DraftType {
    /// Direction reverses every round (1,2,3,4 then 4,3,2,1).
    #[default]
    Snake,
    /// Same order every round.
    Linear,
}

/// Coarse lifecycle of the draft as a whole.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum DraftPhase {
    /// Configured but not yet started.
    #[default]
    Scheduled,
    /// Started; nominations and bids are accepted.
    Live,
    /// Every roster is full.
    Completed,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A player put up for auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    /// Real-world team abbreviation.
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub position: String,
}

impl Player {
    /// "First Last", as recorded on a roster.
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (true, _) => self.last_name.clone(),
            (_, true) => self.first_name.clone(),
        }
    }
}

/// A bid: `amount` dollars from `team_id`. Also the shape of the inbound
/// `bid` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub amount: u32,
    pub team_id: TeamId,
}

/// A player already won by a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftedPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub cost: u32,
}

/// Budget and roster bookkeeping for one team.
///
/// Unsigned fields make negative budgets and roster counts
/// unrepresentable; `max_bid` is derived and refreshed by
/// [`TeamDraftState::refresh_max_bid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDraftState {
    pub team_id: TeamId,
    #[serde(default)]
    pub name: String,
    pub starting_budget: u32,
    pub remaining_budget: u32,
    pub total_roster_spots: u32,
    pub remaining_roster_spots: u32,
    #[serde(default)]
    pub players_drafted: Vec<DraftedPlayer>,
    #[serde(default)]
    pub max_bid: u32,
}

impl TeamDraftState {
    /// A team at the start of a draft: full budget, empty roster.
    pub fn new(
        team_id: TeamId,
        name: impl Into<String>,
        budget: u32,
        roster_spots: u32,
    ) -> Self {
        Self {
            team_id,
            name: name.into(),
            starting_budget: budget,
            remaining_budget: budget,
            total_roster_spots: roster_spots,
            remaining_roster_spots: roster_spots,
            players_drafted: Vec::new(),
            max_bid: max_bid_for(budget, roster_spots),
        }
    }

    /// Recomputes `max_bid` from the remaining budget and roster spots.
    pub fn refresh_max_bid(&mut self) {
        self.max_bid =
            max_bid_for(self.remaining_budget, self.remaining_roster_spots);
    }

    /// `true` while the team still has an open roster spot.
    pub fn has_open_spot(&self) -> bool {
        self.remaining_roster_spots > 0
    }
}

/// The highest legal bid for a team that must still be able to fill every
/// other open spot at $1 each.
///
/// `max(1, budget - (spots - 1))` when `spots > 0`; a team with no open
/// spots cannot bid at all, which is reported as `0`.
pub fn max_bid_for(remaining_budget: u32, remaining_spots: u32) -> u32 {
    if remaining_spots == 0 {
        return 0;
    }
    let reserve = i64::from(remaining_spots) - 1;
    let max = (i64::from(remaining_budget) - reserve).max(1);
    // `max` is in 1..=remaining_budget (or 1), so it fits back into u32.
    u32::try_from(max).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// DraftRoomState
// ---------------------------------------------------------------------------

/// Everything a client needs to render the draft room.
///
/// `#[serde(default)]` lets hydration documents omit fields: a persisted
/// snapshot only has to carry what distinguishes a fresh draft from a
/// resumed one (`draftPhase`, `totalPicks`, `teams`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftRoomState {
    pub draft_started: bool,
    pub draft_paused: bool,
    pub draft_phase: DraftPhase,
    pub draft_type: DraftType,

    /// Team ids in nomination order, fixed for the life of a draft.
    pub nomination_order: Vec<TeamId>,
    /// Index into `nomination_order`; always in range when it is non-empty.
    pub current_nomination_index: usize,
    /// Mirror of `nomination_order[current_nomination_index]`.
    pub current_nominator_team_id: Option<TeamId>,

    pub nominated_player: Option<Player>,
    pub current_bid: Option<Bid>,
    /// Most recent bids on the active nomination, oldest first.
    pub bid_history: Vec<Bid>,
    pub auction_phase: AuctionPhase,
    /// Seconds each countdown phase lasts, while a countdown is running.
    pub bid_timer: Option<u32>,
    /// Unix milliseconds of the next countdown transition.
    pub bid_timer_expires_at: Option<i64>,

    pub current_round: u32,
    pub current_pick: u32,
    pub total_picks: u32,

    pub teams: BTreeMap<TeamId, TeamDraftState>,
}

impl Default for DraftRoomState {
    fn default() -> Self {
        Self {
            draft_started: false,
            draft_paused: false,
            draft_phase: DraftPhase::Scheduled,
            draft_type: DraftType::Snake,
            nomination_order: Vec::new(),
            current_nomination_index: 0,
            current_nominator_team_id: None,
            nominated_player: None,
            current_bid: None,
            bid_history: Vec::new(),
            auction_phase: AuctionPhase::Idle,
            bid_timer: None,
            bid_timer_expires_at: None,
            current_round: 1,
            current_pick: 1,
            total_picks: 0,
            teams: BTreeMap::new(),
        }
    }
}

impl DraftRoomState {
    /// Number of teams taking part in the nomination order.
    pub fn team_count(&self) -> usize {
        self.nomination_order.len()
    }

    /// The team whose turn it is to nominate, if the order is non-empty.
    pub fn nominator(&self) -> Option<&TeamId> {
        self.nomination_order.get(self.current_nomination_index)
    }

    /// Looks up a team's bookkeeping.
    pub fn team(&self, team_id: &TeamId) -> Option<&TeamDraftState> {
        self.teams.get(team_id)
    }

    /// `true` when a player is up for auction.
    pub fn has_active_nomination(&self) -> bool {
        self.nominated_player.is_some()
    }

    /// `true` once the draft can no longer accept mutating auction
    /// actions: not started, paused, or completed.
    pub fn is_frozen(&self) -> bool {
        !self.draft_started
            || self.draft_paused
            || self.draft_phase == DraftPhase::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(s: &str) -> TeamId {
        TeamId::from(s)
    }

    // =====================================================================
    // max_bid_for
    // =====================================================================

    #[test]
    fn test_max_bid_reserves_one_dollar_per_other_spot() {
        // 200 budget, 20 spots: must keep $19 for the other 19 spots.
        assert_eq!(max_bid_for(200, 20), 181);
    }

    #[test]
    fn test_max_bid_last_spot_is_whole_budget() {
        assert_eq!(max_bid_for(5, 1), 5);
    }

    #[test]
    fn test_max_bid_floor_is_one() {
        // Budget can't cover the reserve; the floor still allows $1.
        assert_eq!(max_bid_for(3, 10), 1);
        assert_eq!(max_bid_for(0, 2), 1);
    }

    #[test]
    fn test_max_bid_full_roster_cannot_bid() {
        assert_eq!(max_bid_for(50, 0), 0);
    }

    // =====================================================================
    // TeamDraftState
    // =====================================================================

    #[test]
    fn test_team_new_starts_full() {
        let team = TeamDraftState::new(tid("a"), "Aces", 200, 15);
        assert_eq!(team.remaining_budget, 200);
        assert_eq!(team.remaining_roster_spots, 15);
        assert_eq!(team.max_bid, 186);
        assert!(team.players_drafted.is_empty());
        assert!(team.has_open_spot());
    }

    #[test]
    fn test_team_refresh_max_bid_after_purchase() {
        let mut team = TeamDraftState::new(tid("a"), "Aces", 100, 3);
        team.remaining_budget -= 60;
        team.remaining_roster_spots -= 1;
        team.refresh_max_bid();
        assert_eq!(team.max_bid, 39);
    }

    // =====================================================================
    // Wire shape
    // =====================================================================

    #[test]
    fn test_state_json_uses_camel_case() {
        let state = DraftRoomState::default();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["draftStarted"], false);
        assert_eq!(json["auctionPhase"], "idle");
        assert_eq!(json["draftType"], "snake");
        assert_eq!(json["draftPhase"], "scheduled");
        assert_eq!(json["currentRound"], 1);
        assert_eq!(json["currentPick"], 1);
        assert!(json["nominatedPlayer"].is_null());
        assert!(json["bidTimerExpiresAt"].is_null());
    }

    #[test]
    fn test_auction_phase_wire_names() {
        let json = serde_json::to_string(&AuctionPhase::GoingTwice).unwrap();
        assert_eq!(json, "\"goingTwice\"");
    }

    #[test]
    fn test_state_partial_document_fills_defaults() {
        // A persisted snapshot may carry only the resume markers.
        let json = r#"{"draftPhase":"live","totalPicks":0,"teams":{}}"#;
        let state: DraftRoomState = serde_json::from_str(json).unwrap();
        assert_eq!(state.draft_phase, DraftPhase::Live);
        assert_eq!(state.total_picks, 0);
        assert!(state.teams.is_empty());
        assert_eq!(state.current_round, 1);
        assert_eq!(state.auction_phase, AuctionPhase::Idle);
    }

    #[test]
    fn test_player_accepts_numeric_id_and_missing_optional_fields() {
        let json = r#"{"id":42,"firstName":"Shohei","lastName":"Ohtani"}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.id.as_str(), "42");
        assert_eq!(player.full_name(), "Shohei Ohtani");
        assert!(player.position.is_empty());
    }

    #[test]
    fn test_nominator_tracks_index() {
        let state = DraftRoomState {
            nomination_order: vec![tid("a"), tid("b")],
            current_nomination_index: 1,
            ..DraftRoomState::default()
        };
        assert_eq!(state.nominator(), Some(&tid("b")));
        assert_eq!(state.team_count(), 2);
    }

    #[test]
    fn test_is_frozen() {
        let mut state = DraftRoomState::default();
        assert!(state.is_frozen(), "not started");
        state.draft_started = true;
        assert!(!state.is_frozen());
        state.draft_paused = true;
        assert!(state.is_frozen(), "paused");
        state.draft_paused = false;
        state.draft_phase = DraftPhase::Completed;
        assert!(state.is_frozen(), "completed");
    }
}
