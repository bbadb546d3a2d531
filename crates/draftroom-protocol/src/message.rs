//! Messages exchanged over a draft room socket.
//!
//! Every frame is a JSON object with a `type` discriminator. Inbound
//! messages carry their payload under `data`; outbound messages flatten
//! their fields next to `type` and always carry a `timestamp`.
//!
//! ```text
//! client → server   {"type":"bid","data":{"teamId":"t1","amount":12}}
//! server → client   {"type":"stateUpdate","data":{...},"timestamp":1718000000000}
//! ```

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::{Bid, DraftRoomState, Player, TeamId, UserId};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A player nomination: `team_id` puts `player` up with an opening bid of
/// `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomination {
    pub team_id: TeamId,
    pub amount: u32,
    pub player: Player,
}

/// Everything a client may send.
///
/// A `timestamp` next to `type` is accepted and ignored; so is any other
/// unknown key. Control messages ignore whatever `data` they carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    from = "Inbound"
)]
pub enum ClientMessage {
    /// Without data: resend the snapshot to the sender. With data: an
    /// owner's one-shot force-init.
    Init(Option<DraftRoomState>),
    ResetDraft,
    StartDraft,
    PauseDraft,
    ResumeDraft,
    NominatePlayer(Nomination),
    TriggerCountdown,
    Bid(Bid),
    HydrateState(DraftRoomState),
    RestoreState(DraftRoomState),
}

impl ClientMessage {
    /// The wire name of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::ResetDraft => "resetDraft",
            Self::StartDraft => "startDraft",
            Self::PauseDraft => "pauseDraft",
            Self::ResumeDraft => "resumeDraft",
            Self::NominatePlayer(_) => "nominatePlayer",
            Self::TriggerCountdown => "triggerCountdown",
            Self::Bid(_) => "bid",
            Self::HydrateState(_) => "hydrateState",
            Self::RestoreState(_) => "restoreState",
        }
    }

    /// `true` for draft-control actions reserved to league owners.
    ///
    /// A data-less `init` is a plain snapshot request and is open to all.
    pub fn is_privileged(&self) -> bool {
        match self {
            Self::Init(data) => data.is_some(),
            Self::ResetDraft
            | Self::StartDraft
            | Self::PauseDraft
            | Self::ResumeDraft
            | Self::HydrateState(_)
            | Self::RestoreState(_) => true,
            Self::NominatePlayer(_) | Self::TriggerCountdown | Self::Bid(_) => {
                false
            }
        }
    }
}

/// Decoding shape of [`ClientMessage`]. Payload-less messages accept a
/// missing, null, or arbitrary `data`.
#[derive(Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
enum Inbound {
    Init(Option<DraftRoomState>),
    ResetDraft(Option<IgnoredAny>),
    StartDraft(Option<IgnoredAny>),
    PauseDraft(Option<IgnoredAny>),
    ResumeDraft(Option<IgnoredAny>),
    NominatePlayer(Nomination),
    TriggerCountdown(Option<IgnoredAny>),
    Bid(Bid),
    HydrateState(DraftRoomState),
    RestoreState(DraftRoomState),
}

impl From<Inbound> for ClientMessage {
    fn from(inbound: Inbound) -> Self {
        match inbound {
            Inbound::Init(data) => Self::Init(data),
            Inbound::ResetDraft(_) => Self::ResetDraft,
            Inbound::StartDraft(_) => Self::StartDraft,
            Inbound::PauseDraft(_) => Self::PauseDraft,
            Inbound::ResumeDraft(_) => Self::ResumeDraft,
            Inbound::NominatePlayer(nomination) => Self::NominatePlayer(nomination),
            Inbound::TriggerCountdown(_) => Self::TriggerCountdown,
            Inbound::Bid(bid) => Self::Bid(bid),
            Inbound::HydrateState(state) => Self::HydrateState(state),
            Inbound::RestoreState(state) => Self::RestoreState(state),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// First frame on an authenticated socket.
    Welcome { connection_id: String },
    /// Full snapshot, sent on join and on request.
    Init { data: DraftRoomState },
    /// Sent once before the socket is closed for failed authentication.
    AuthError { error: String },
    StateUpdate { data: DraftRoomState },
    DraftReset,
    DraftPaused { data: DraftRoomState },
    /// Everyone currently in the room, sorted and de-duplicated.
    ConnectedUsers { user_ids: Vec<UserId> },
}

/// An outbound message stamped with the wall-clock send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub message: ServerMessage,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl Envelope {
    /// Wraps `message` with the current time.
    pub fn stamped(message: ServerMessage) -> Self {
        Self {
            message,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl From<ServerMessage> for Envelope {
    fn from(message: ServerMessage) -> Self {
        Self::stamped(message)
    }
}
