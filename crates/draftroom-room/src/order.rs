//! Who nominates next.
//!
//! Works on positions in `nomination_order`. The caller passes the overall
//! index of the pick that just completed, since snake direction depends on
//! which round that pick belonged to.

use draftroom_protocol::{DraftRoomState, DraftType};

use crate::SnakeBoundary;

/// The position that follows `current` before full rosters are considered.
///
/// `pick_index` is the zero-based overall index of the pick just made
/// (`total_picks` before it is incremented). Returns `None` for an empty
/// order.
pub fn step(
    draft_type: DraftType,
    boundary: SnakeBoundary,
    current: usize,
    pick_index: u32,
    team_count: usize,
) -> Option<usize> {
    if team_count == 0 {
        return None;
    }
    let last = team_count - 1;
    let current = current.min(last);

    let next = match draft_type {
        DraftType::Linear => (current + 1) % team_count,
        DraftType::Snake if last == 0 => 0,
        DraftType::Snake => match boundary {
            SnakeBoundary::Clamp => {
                let round = pick_index as usize / team_count;
                if round % 2 == 0 {
                    (current + 1).min(last)
                } else {
                    current.saturating_sub(1)
                }
            }
            // A triangle wave over the pick number with period 2(n-1), so
            // the end teams never repeat.
            SnakeBoundary::Bounce => {
                let period = 2 * last;
                let r = (pick_index as usize + 1) % period;
                if r <= last { r } else { period - r }
            }
        },
    };
    Some(next)
}

/// The next nominator's position, skipping teams with full rosters.
///
/// Scans forward (wrapping) from the stepped position. Returns `None` when
/// every team in the order is full, which means the draft is over.
pub fn next_nominator(
    state: &DraftRoomState,
    boundary: SnakeBoundary,
) -> Option<usize> {
    let team_count = state.team_count();
    let candidate = step(
        state.draft_type,
        boundary,
        state.current_nomination_index,
        state.total_picks,
        team_count,
    )?;

    (0..team_count)
        .map(|offset| (candidate + offset) % team_count)
        .find(|&i| {
            state
                .team(&state.nomination_order[i])
                .is_some_and(|t| t.has_open_spot())
        })
}

/// `true` once no team in the order has an open roster spot. An empty
/// order is never full.
pub fn all_rosters_full(state: &DraftRoomState) -> bool {
    !state.nomination_order.is_empty()
        && !state
            .nomination_order
            .iter()
            .any(|id| state.team(id).is_some_and(|t| t.has_open_spot()))
}
