//! League configuration: everything a room needs to build a fresh draft.

use std::collections::{BTreeMap, HashSet};

use draftroom_protocol::{
    DraftPhase, DraftRoomState, DraftType, LeagueId, TeamDraftState, TeamId,
    UserId,
};
use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Who may nominate a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NominationPolicy {
    /// Any team may nominate at any time.
    #[default]
    Open,
    /// Only the team whose turn it is may nominate.
    CurrentNominatorOnly,
}

/// What a snake draft does at either end of the nomination order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnakeBoundary {
    /// The end team nominates twice in a row: A B C D D C B A A B ...
    #[default]
    Clamp,
    /// The order turns around immediately: A B C D C B A B ...
    Bounce,
}

// ---------------------------------------------------------------------------
// LeagueConfig
// ---------------------------------------------------------------------------

/// A team taking part in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub id: TeamId,
    #[serde(default)]
    pub name: String,
}

/// Settings read once when a league's room is created.
///
/// Every field has a default, so a league file only needs to list what
/// differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub league_id: LeagueId,
    pub teams: Vec<TeamConfig>,

    /// Nomination order by team id. Empty means the order of `teams`.
    pub draft_order: Vec<TeamId>,

    pub starting_budget: u32,
    pub roster_spots: u32,
    pub draft_type: DraftType,

    /// Seconds each countdown phase lasts.
    pub timer_duration_secs: u32,
    /// Start the countdown as soon as a player is nominated.
    pub auto_countdown: bool,

    /// Users allowed to run the draft, in addition to tokens that carry the
    /// owner claim.
    pub owners: Vec<UserId>,

    pub nomination_policy: NominationPolicy,
    pub snake_boundary: SnakeBoundary,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            league_id: LeagueId::from("default"),
            teams: Vec::new(),
            draft_order: Vec::new(),
            starting_budget: 200,
            roster_spots: 15,
            draft_type: DraftType::Snake,
            timer_duration_secs: 10,
            auto_countdown: false,
            owners: Vec::new(),
            nomination_policy: NominationPolicy::Open,
            snake_boundary: SnakeBoundary::Clamp,
        }
    }
}

impl LeagueConfig {
    /// Checks the configuration for contradictions.
    ///
    /// # Errors
    /// Returns [`RoomError::InvalidConfig`] for duplicate teams, a draft
    /// order naming unknown or repeated teams, or a zero timer.
    pub fn validate(&self) -> Result<(), RoomError> {
        let mut seen = HashSet::new();
        for team in &self.teams {
            if !seen.insert(&team.id) {
                return Err(RoomError::InvalidConfig(format!(
                    "team {} is listed twice",
                    team.id
                )));
            }
        }

        let mut ordered = HashSet::new();
        for id in &self.draft_order {
            if !seen.contains(id) {
                return Err(RoomError::InvalidConfig(format!(
                    "draft order names unknown team {id}"
                )));
            }
            if !ordered.insert(id) {
                return Err(RoomError::InvalidConfig(format!(
                    "team {id} appears twice in the draft order"
                )));
            }
        }

        if self.timer_duration_secs == 0 {
            return Err(RoomError::InvalidConfig(
                "timer_duration_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The nomination order for a fresh draft.
    pub fn nomination_order(&self) -> Vec<TeamId> {
        if self.draft_order.is_empty() {
            self.teams.iter().map(|t| t.id.clone()).collect()
        } else {
            self.draft_order.clone()
        }
    }

    /// `true` if the league lists `user` as an owner.
    pub fn lists_owner(&self, user: &UserId) -> bool {
        self.owners.contains(user)
    }

    /// A draft that has not started: full budgets, empty rosters, first
    /// team on the clock.
    pub fn fresh_state(&self) -> DraftRoomState {
        let teams: BTreeMap<TeamId, TeamDraftState> = self
            .teams
            .iter()
            .map(|t| {
                let team = TeamDraftState::new(
                    t.id.clone(),
                    t.name.clone(),
                    self.starting_budget,
                    self.roster_spots,
                );
                (t.id.clone(), team)
            })
            .collect();

        let nomination_order = self.nomination_order();
        DraftRoomState {
            draft_phase: DraftPhase::Scheduled,
            draft_type: self.draft_type,
            current_nominator_team_id: nomination_order.first().cloned(),
            nomination_order,
            teams,
            ..DraftRoomState::default()
        }
    }
}
