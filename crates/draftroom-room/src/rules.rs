//! The auction rules engine.
//!
//! Pure functions over [`DraftRoomState`]. Each validating operation either
//! applies its whole effect or returns a [`Rejection`] and leaves the state
//! untouched. Nothing here knows about connections, channels, or timers;
//! the room actor wires the results to the countdown and to broadcasts.

use draftroom_protocol::{
    AuctionPhase, BID_HISTORY_LIMIT, Bid, DraftPhase, DraftRoomState,
    DraftedPlayer, Nomination, Player, TeamId,
};

use crate::{LeagueConfig, NominationPolicy, SnakeBoundary, order};

/// Why an action was not applied.
///
/// Rejections are logged by the room and never sent back on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("draft has not started")]
    DraftNotStarted,
    #[error("draft is paused")]
    DraftPaused,
    #[error("draft is not paused")]
    NotPaused,
    #[error("draft is complete")]
    DraftComplete,
    #[error("no player is up for auction")]
    NoActiveNomination,
    #[error("no bid to count down on")]
    NoBid,
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),
    #[error("it is {expected}'s turn to nominate")]
    NotNominator { expected: TeamId },
    #[error("bid must be at least {min}")]
    BidTooLow { min: u32 },
    #[error("bid exceeds remaining budget of {remaining}")]
    InsufficientBudget { remaining: u32 },
    #[error("team has no open roster spots")]
    RosterFull,
    #[error("bid exceeds max bid of {max}")]
    ExceedsMaxBid { max: u32 },
    #[error("privileged action requires an owner")]
    NotOwner,
    #[error("init has already been used")]
    InitNotAllowed,
}

/// What a completed sale did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub team_id: TeamId,
    pub player: DraftedPlayer,
    /// Every roster is now full.
    pub completed: bool,
}

/// How a hydration snapshot was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// The snapshot had no draft progress; the room started over from the
    /// league defaults.
    Fresh,
    /// The snapshot was adopted as the current draft.
    Resumed,
}

// ---------------------------------------------------------------------------
// Derived fields
// ---------------------------------------------------------------------------

/// `(current_round, current_pick)` after `total_picks` completed picks.
pub fn round_and_pick(total_picks: u32, team_count: usize) -> (u32, u32) {
    let Ok(n) = u32::try_from(team_count) else {
        return (1, 1);
    };
    if n == 0 {
        return (1, 1);
    }
    (total_picks / n + 1, total_picks % n + 1)
}

fn sync_nominator(state: &mut DraftRoomState) {
    state.current_nominator_team_id = state.nominator().cloned();
}

fn clear_timer(state: &mut DraftRoomState) {
    state.bid_timer = None;
    state.bid_timer_expires_at = None;
}

fn gate(state: &DraftRoomState) -> Result<(), Rejection> {
    if !state.is_frozen() {
        return Ok(());
    }
    Err(if !state.draft_started {
        Rejection::DraftNotStarted
    } else if state.draft_phase == DraftPhase::Completed {
        Rejection::DraftComplete
    } else {
        Rejection::DraftPaused
    })
}

/// The smallest acceptable bid on the active nomination.
pub fn min_bid(state: &DraftRoomState) -> u32 {
    state
        .current_bid
        .as_ref()
        .map_or(1, |b| b.amount.saturating_add(1))
}

/// Budget and roster checks shared by opening bids and raises.
fn check_affordable(
    state: &DraftRoomState,
    team_id: &TeamId,
    amount: u32,
    min: u32,
) -> Result<(), Rejection> {
    let team = state
        .team(team_id)
        .ok_or_else(|| Rejection::UnknownTeam(team_id.clone()))?;

    if amount < min {
        return Err(Rejection::BidTooLow { min });
    }
    if team.remaining_roster_spots == 0 {
        return Err(Rejection::RosterFull);
    }
    if team.remaining_budget < amount {
        return Err(Rejection::InsufficientBudget {
            remaining: team.remaining_budget,
        });
    }
    if amount > team.max_bid {
        return Err(Rejection::ExceedsMaxBid { max: team.max_bid });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Draft control
// ---------------------------------------------------------------------------

/// Marks the draft started. Returns `false` if it already was.
pub fn start(state: &mut DraftRoomState) -> bool {
    if state.draft_started {
        return false;
    }
    state.draft_started = true;
    if state.draft_phase == DraftPhase::Scheduled {
        state.draft_phase = DraftPhase::Live;
    }
    true
}

/// Freezes auction actions. Returns `Ok(false)` if already paused.
///
/// The caller cancels the countdown; this drops its bookkeeping.
pub fn pause(state: &mut DraftRoomState) -> Result<bool, Rejection> {
    if !state.draft_started {
        return Err(Rejection::DraftNotStarted);
    }
    if state.draft_paused {
        return Ok(false);
    }
    state.draft_paused = true;
    state.auction_phase = AuctionPhase::Idle;
    clear_timer(state);
    Ok(true)
}

/// Lifts a pause.
pub fn resume(state: &mut DraftRoomState) -> Result<(), Rejection> {
    if !state.draft_paused {
        return Err(Rejection::NotPaused);
    }
    state.draft_paused = false;
    Ok(())
}

// ---------------------------------------------------------------------------
// Auction
// ---------------------------------------------------------------------------

/// Puts a player up for auction with an opening bid.
///
/// The opening bid must pass the same budget checks as any other bid and
/// becomes the first entry of the fresh bid history.
pub fn nominate(
    state: &mut DraftRoomState,
    nomination: Nomination,
    policy: NominationPolicy,
) -> Result<(), Rejection> {
    gate(state)?;

    if policy == NominationPolicy::CurrentNominatorOnly {
        if let Some(expected) = state.nominator() {
            if *expected != nomination.team_id {
                return Err(Rejection::NotNominator {
                    expected: expected.clone(),
                });
            }
        }
    }

    check_affordable(state, &nomination.team_id, nomination.amount, 1)?;

    let opening = Bid {
        amount: nomination.amount,
        team_id: nomination.team_id,
    };
    state.nominated_player = Some(nomination.player);
    state.bid_history = vec![opening.clone()];
    state.current_bid = Some(opening);
    state.auction_phase = AuctionPhase::Idle;
    clear_timer(state);
    Ok(())
}

/// Raises the bid on the active nomination.
pub fn place_bid(state: &mut DraftRoomState, bid: Bid) -> Result<(), Rejection> {
    gate(state)?;
    if !state.has_active_nomination() {
        return Err(Rejection::NoActiveNomination);
    }

    check_affordable(state, &bid.team_id, bid.amount, min_bid(state))?;

    state.current_bid = Some(bid.clone());
    state.bid_history.push(bid);
    if state.bid_history.len() > BID_HISTORY_LIMIT {
        let excess = state.bid_history.len() - BID_HISTORY_LIMIT;
        state.bid_history.drain(..excess);
    }
    state.auction_phase = AuctionPhase::Idle;
    clear_timer(state);
    Ok(())
}

/// Checks that a countdown may be started.
pub fn check_countdown(state: &DraftRoomState) -> Result<(), Rejection> {
    gate(state)?;
    if !state.has_active_nomination() {
        return Err(Rejection::NoActiveNomination);
    }
    if state.current_bid.is_none() {
        return Err(Rejection::NoBid);
    }
    Ok(())
}

/// Awards the nominated player to the high bidder and moves the draft on.
///
/// Returns `None`, after still clearing the auction, when there was no
/// nomination or no bid to award.
pub fn resolve_sold(
    state: &mut DraftRoomState,
    boundary: SnakeBoundary,
) -> Option<Sale> {
    let sale = match (state.nominated_player.take(), state.current_bid.take()) {
        (Some(player), Some(bid)) => award(state, player, bid, boundary),
        _ => None,
    };

    state.bid_history.clear();
    state.auction_phase = AuctionPhase::Idle;
    clear_timer(state);
    sale
}

fn award(
    state: &mut DraftRoomState,
    player: Player,
    bid: Bid,
    boundary: SnakeBoundary,
) -> Option<Sale> {
    let drafted = DraftedPlayer {
        player_id: player.id.clone(),
        name: player.full_name(),
        cost: bid.amount,
    };

    {
        let team = state.teams.get_mut(&bid.team_id)?;
        team.remaining_budget = team.remaining_budget.saturating_sub(bid.amount);
        team.remaining_roster_spots = team.remaining_roster_spots.saturating_sub(1);
        team.players_drafted.push(drafted.clone());
        team.refresh_max_bid();
    }

    let next = order::next_nominator(state, boundary);
    state.total_picks += 1;
    let (round, pick) = round_and_pick(state.total_picks, state.team_count());
    state.current_round = round;
    state.current_pick = pick;

    let completed = match next {
        Some(i) => {
            state.current_nomination_index = i;
            false
        }
        None => {
            state.draft_phase = DraftPhase::Completed;
            true
        }
    };
    sync_nominator(state);

    Some(Sale {
        team_id: bid.team_id,
        player: drafted,
        completed,
    })
}

// ---------------------------------------------------------------------------
// Hydration
// ---------------------------------------------------------------------------

/// A snapshot with picks made or teams present is a draft in progress.
pub fn classify(snapshot: &DraftRoomState) -> HydrationOutcome {
    if snapshot.total_picks > 0 || !snapshot.teams.is_empty() {
        HydrationOutcome::Resumed
    } else {
        HydrationOutcome::Fresh
    }
}

/// Repairs an adopted snapshot so every invariant holds.
///
/// No countdown survives a hand-over, so its bookkeeping is dropped and the
/// auction returns to idle. Derived fields are recomputed rather than
/// trusted.
pub fn normalize(state: &mut DraftRoomState) {
    state.auction_phase = AuctionPhase::Idle;
    clear_timer(state);

    let count = state.team_count();
    if state.current_nomination_index >= count {
        state.current_nomination_index = count.saturating_sub(1);
    }
    sync_nominator(state);

    for team in state.teams.values_mut() {
        team.refresh_max_bid();
    }

    if state.bid_history.len() > BID_HISTORY_LIMIT {
        let excess = state.bid_history.len() - BID_HISTORY_LIMIT;
        state.bid_history.drain(..excess);
    }
    if state.nominated_player.is_none() {
        state.current_bid = None;
        state.bid_history.clear();
    }

    let (round, pick) = round_and_pick(state.total_picks, count);
    state.current_round = round;
    state.current_pick = pick;

    if state.draft_started && state.draft_phase == DraftPhase::Scheduled {
        state.draft_phase = DraftPhase::Live;
    }
    if count > 0 && order::all_rosters_full(state) {
        state.draft_phase = DraftPhase::Completed;
    }
}

/// Builds the room state from a persisted snapshot.
///
/// A resumed snapshot is adopted and normalized. A fresh one starts from
/// the league defaults, keeping only whether the draft was started.
pub fn hydrate(
    config: &LeagueConfig,
    snapshot: DraftRoomState,
) -> (DraftRoomState, HydrationOutcome) {
    match classify(&snapshot) {
        HydrationOutcome::Resumed => {
            let mut state = snapshot;
            if state.nomination_order.is_empty() {
                state.nomination_order = order_for(config, &state);
            }
            normalize(&mut state);
            (state, HydrationOutcome::Resumed)
        }
        HydrationOutcome::Fresh => {
            let mut state = config.fresh_state();
            state.draft_started = snapshot.draft_started;
            state.draft_phase = snapshot.draft_phase;
            if state.draft_started && state.draft_phase == DraftPhase::Scheduled
            {
                state.draft_phase = DraftPhase::Live;
            }
            (state, HydrationOutcome::Fresh)
        }
    }
}

/// The league's nomination order, restricted to the snapshot's teams.
///
/// Falls back to the snapshot's own team ids when the league shares none
/// of them.
fn order_for(config: &LeagueConfig, state: &DraftRoomState) -> Vec<TeamId> {
    let order: Vec<TeamId> = config
        .nomination_order()
        .into_iter()
        .filter(|id| state.teams.contains_key(id))
        .collect();
    if order.is_empty() {
        state.teams.keys().cloned().collect()
    } else {
        order
    }
}
