//! Room actor: an isolated Tokio task that owns one league's draft.
//!
//! Everything that touches the draft state goes through the actor's
//! command channel, so actions are applied one at a time in arrival order
//! and each sees the effects of all earlier ones. The countdown lives in
//! the same `select!` loop and never races a command.

use std::collections::HashMap;

use draftroom_countdown::{Countdown, CountdownPhase};
use draftroom_protocol::{
    AuctionPhase, ClientMessage, DraftPhase, DraftRoomState, LeagueId,
    ServerMessage, UserId,
};
use draftroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::rules::{self, HydrationOutcome, Rejection};
use crate::store::{DraftEvent, EventSender};
use crate::{LeagueConfig, RoomError};

/// Channel sender for delivering outbound messages to one connection.
pub type ConnectionSender = mpsc::UnboundedSender<ServerMessage>;

/// Who sent an action: the connection it arrived on and the user behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    /// Owner rights granted by the user's token.
    pub is_owner: bool,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        origin: Origin,
        sender: ConnectionSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Action {
        origin: Origin,
        msg: ClientMessage,
    },
    Hydrate {
        snapshot: DraftRoomState,
        reply: oneshot::Sender<HydrationOutcome>,
    },
    GetState {
        reply: oneshot::Sender<DraftRoomState>,
    },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    Shutdown,
}

/// A summary of a running room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub league_id: LeagueId,
    pub draft_phase: DraftPhase,
    pub total_picks: u32,
    pub connection_count: usize,
    pub connected_users: Vec<UserId>,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    league_id: LeagueId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The league this room runs the draft for.
    pub fn league_id(&self) -> &LeagueId {
        &self.league_id
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.league_id.clone())
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Adds a connection to the room.
    ///
    /// The connection receives an `init` snapshot and everyone receives the
    /// updated `connectedUsers` list.
    pub async fn join(
        &self,
        origin: Origin,
        sender: ConnectionSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            origin,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a connection from the room.
    pub async fn leave(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Leave {
            connection_id,
            reply,
        })
        .await?
    }

    /// Queues an action from a connection (fire-and-forget).
    pub async fn send_action(
        &self,
        origin: Origin,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action { origin, msg })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Hands the room a persisted snapshot.
    pub async fn hydrate(
        &self,
        snapshot: DraftRoomState,
    ) -> Result<HydrationOutcome, RoomError> {
        self.request(|reply| RoomCommand::Hydrate { snapshot, reply })
            .await
    }

    /// The current draft state.
    pub async fn get_state(&self) -> Result<DraftRoomState, RoomError> {
        self.request(|reply| RoomCommand::GetState { reply }).await
    }

    /// A summary of the room.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

struct Member {
    user_id: UserId,
    sender: ConnectionSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    league_id: LeagueId,
    config: LeagueConfig,
    state: DraftRoomState,
    countdown: Countdown,
    members: HashMap<ConnectionId, Member>,
    /// One-shot permission for a forced `init`. Armed at creation and by
    /// every reset; consumed by a forced `init` or a resumed hydration.
    init_armed: bool,
    events: EventSender,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.league_id, "room actor started");

        loop {
            tokio::select! {
                biased;
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                phase = self.countdown.wait_for_advance() => {
                    self.on_countdown(phase);
                }
            }
        }

        tracing::info!(room_id = %self.league_id, "room actor stopped");
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                origin,
                sender,
                reply,
            } => {
                let result = self.handle_join(origin, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave {
                connection_id,
                reply,
            } => {
                let result = self.handle_leave(connection_id);
                let _ = reply.send(result);
            }
            RoomCommand::Action { origin, msg } => {
                self.handle_action(origin, msg);
            }
            RoomCommand::Hydrate { snapshot, reply } => {
                let outcome = self.hydrate(snapshot);
                self.broadcast_state();
                let _ = reply.send(outcome);
            }
            RoomCommand::GetState { reply } => {
                let _ = reply.send(self.state.clone());
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.league_id, "room shutting down");
                self.countdown.clear();
                return false;
            }
        }
        true
    }

    // -----------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------

    fn handle_join(
        &mut self,
        origin: Origin,
        sender: ConnectionSender,
    ) -> Result<(), RoomError> {
        let conn_id = origin.connection_id;
        if self.members.contains_key(&conn_id) {
            return Err(RoomError::AlreadyJoined(
                conn_id,
                self.league_id.clone(),
            ));
        }

        let _ = sender.send(ServerMessage::Init {
            data: self.state.clone(),
        });
        self.members.insert(
            conn_id,
            Member {
                user_id: origin.user_id.clone(),
                sender,
            },
        );
        tracing::info!(
            room_id = %self.league_id,
            %conn_id,
            user_id = %origin.user_id,
            connections = self.members.len(),
            "connection joined"
        );

        self.broadcast_connected_users();
        Ok(())
    }

    fn handle_leave(&mut self, conn_id: ConnectionId) -> Result<(), RoomError> {
        let Some(member) = self.members.remove(&conn_id) else {
            return Err(RoomError::NotInRoom(conn_id, self.league_id.clone()));
        };
        tracing::info!(
            room_id = %self.league_id,
            %conn_id,
            user_id = %member.user_id,
            connections = self.members.len(),
            "connection left"
        );

        self.broadcast_connected_users();
        Ok(())
    }

    fn connected_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> =
            self.members.values().map(|m| m.user_id.clone()).collect();
        users.sort();
        users.dedup();
        users
    }

    fn is_owner(&self, origin: &Origin) -> bool {
        origin.is_owner || self.config.lists_owner(&origin.user_id)
    }

    // -----------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------

    fn handle_action(&mut self, origin: Origin, msg: ClientMessage) {
        let conn_id = origin.connection_id;
        if !self.members.contains_key(&conn_id) {
            tracing::warn!(
                room_id = %self.league_id,
                %conn_id,
                "action from non-member, ignoring"
            );
            return;
        }

        let action = msg.kind();
        let result = if msg.is_privileged() && !self.is_owner(&origin) {
            Err(Rejection::NotOwner)
        } else {
            self.apply(conn_id, msg)
        };

        match result {
            Ok(()) => tracing::debug!(
                room_id = %self.league_id,
                %conn_id,
                action,
                "action applied"
            ),
            Err(Rejection::NotOwner) => tracing::warn!(
                room_id = %self.league_id,
                %conn_id,
                user_id = %origin.user_id,
                action,
                "privileged action from non-owner dropped"
            ),
            Err(reason) => tracing::debug!(
                room_id = %self.league_id,
                %conn_id,
                action,
                %reason,
                "action rejected"
            ),
        }
    }

    fn apply(
        &mut self,
        conn_id: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), Rejection> {
        match msg {
            ClientMessage::Init(None) => {
                self.send_to(
                    conn_id,
                    ServerMessage::Init {
                        data: self.state.clone(),
                    },
                );
            }
            ClientMessage::Init(Some(snapshot)) => {
                if !self.init_armed {
                    return Err(Rejection::InitNotAllowed);
                }
                self.init_armed = false;
                self.countdown.clear();
                let (state, outcome) = rules::hydrate(&self.config, snapshot);
                self.state = state;
                tracing::info!(room_id = %self.league_id, ?outcome, "forced init applied");
                self.changed();
            }
            ClientMessage::ResetDraft => {
                self.countdown.clear();
                self.state = self.config.fresh_state();
                self.init_armed = true;
                tracing::info!(room_id = %self.league_id, "draft reset");
                self.broadcast(ServerMessage::DraftReset);
                self.broadcast_state();
                self.emit(DraftEvent::DraftReset {
                    league_id: self.league_id.clone(),
                    state: self.state.clone(),
                });
            }
            ClientMessage::StartDraft => {
                if rules::start(&mut self.state) {
                    tracing::info!(room_id = %self.league_id, "draft started");
                    self.changed();
                }
            }
            ClientMessage::PauseDraft => {
                if rules::pause(&mut self.state)? {
                    self.countdown.clear();
                    tracing::info!(room_id = %self.league_id, "draft paused");
                    self.broadcast(ServerMessage::DraftPaused {
                        data: self.state.clone(),
                    });
                    self.emit_state_changed();
                }
            }
            ClientMessage::ResumeDraft => {
                rules::resume(&mut self.state)?;
                tracing::info!(room_id = %self.league_id, "draft resumed");
                self.changed();
            }
            ClientMessage::NominatePlayer(nomination) => {
                rules::nominate(
                    &mut self.state,
                    nomination,
                    self.config.nomination_policy,
                )?;
                self.countdown.clear();
                if self.config.auto_countdown {
                    self.start_countdown();
                }
                self.changed();
            }
            ClientMessage::TriggerCountdown => {
                rules::check_countdown(&self.state)?;
                if self.start_countdown() {
                    self.changed();
                }
            }
            ClientMessage::Bid(bid) => {
                rules::place_bid(&mut self.state, bid)?;
                self.countdown.clear();
                self.changed();
            }
            ClientMessage::HydrateState(snapshot)
            | ClientMessage::RestoreState(snapshot) => {
                self.hydrate(snapshot);
                self.broadcast_state();
            }
        }
        Ok(())
    }

    fn hydrate(&mut self, snapshot: DraftRoomState) -> HydrationOutcome {
        self.countdown.clear();
        let (state, outcome) = rules::hydrate(&self.config, snapshot);
        self.state = state;
        if outcome == HydrationOutcome::Resumed {
            self.init_armed = false;
        }
        tracing::info!(
            room_id = %self.league_id,
            ?outcome,
            total_picks = self.state.total_picks,
            "draft hydrated"
        );
        self.emit_state_changed();
        outcome
    }

    // -----------------------------------------------------------------
    // Countdown
    // -----------------------------------------------------------------

    /// Starts the countdown if it isn't running. Returns `true` if it
    /// started.
    fn start_countdown(&mut self) -> bool {
        let Some(phase) = self.countdown.start() else {
            return false;
        };
        self.state.auction_phase = auction_phase(phase);
        self.stamp_timer();
        true
    }

    fn stamp_timer(&mut self) {
        let remaining = self.countdown.remaining().unwrap_or_default();
        let remaining_ms = i64::try_from(remaining.as_millis()).unwrap_or(i64::MAX);
        self.state.bid_timer = Some(self.config.timer_duration_secs);
        self.state.bid_timer_expires_at = Some(
            chrono::Utc::now()
                .timestamp_millis()
                .saturating_add(remaining_ms),
        );
    }

    fn on_countdown(&mut self, phase: CountdownPhase) {
        self.state.auction_phase = auction_phase(phase);
        if phase == CountdownPhase::Sold {
            self.state.bid_timer = None;
            self.state.bid_timer_expires_at = None;
            self.broadcast_state();
            self.resolve_sale();
        } else {
            self.stamp_timer();
            self.broadcast_state();
        }
    }

    fn resolve_sale(&mut self) {
        let sale = rules::resolve_sold(&mut self.state, self.config.snake_boundary);
        self.broadcast_state();

        let Some(sale) = sale else {
            tracing::debug!(room_id = %self.league_id, "countdown ended with nothing to sell");
            self.emit_state_changed();
            return;
        };

        tracing::info!(
            room_id = %self.league_id,
            team_id = %sale.team_id,
            player_id = %sale.player.player_id,
            cost = sale.player.cost,
            total_picks = self.state.total_picks,
            "player sold"
        );
        let completed = sale.completed;
        self.emit(DraftEvent::PlayerSold {
            league_id: self.league_id.clone(),
            team_id: sale.team_id,
            player: sale.player,
            state: self.state.clone(),
        });
        if completed {
            tracing::info!(room_id = %self.league_id, "draft completed");
            self.emit(DraftEvent::DraftCompleted {
                league_id: self.league_id.clone(),
                state: self.state.clone(),
            });
        }
    }

    // -----------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------

    /// Broadcasts the new state and records the transition.
    fn changed(&mut self) {
        self.broadcast_state();
        self.emit_state_changed();
    }

    fn emit_state_changed(&self) {
        self.emit(DraftEvent::StateChanged {
            league_id: self.league_id.clone(),
            state: self.state.clone(),
        });
    }

    fn emit(&self, event: DraftEvent) {
        let _ = self.events.send(event);
    }

    fn broadcast_state(&self) {
        self.broadcast(ServerMessage::StateUpdate {
            data: self.state.clone(),
        });
    }

    fn broadcast_connected_users(&self) {
        self.broadcast(ServerMessage::ConnectedUsers {
            user_ids: self.connected_users(),
        });
    }

    /// Sends to every member. Closed channels are skipped; the connection's
    /// cleanup will remove the member.
    fn broadcast(&self, msg: ServerMessage) {
        for member in self.members.values() {
            let _ = member.sender.send(msg.clone());
        }
    }

    fn send_to(&self, conn_id: ConnectionId, msg: ServerMessage) {
        if let Some(member) = self.members.get(&conn_id) {
            let _ = member.sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            league_id: self.league_id.clone(),
            draft_phase: self.state.draft_phase,
            total_picks: self.state.total_picks,
            connection_count: self.members.len(),
            connected_users: self.connected_users(),
        }
    }
}

fn auction_phase(phase: CountdownPhase) -> AuctionPhase {
    match phase {
        CountdownPhase::GoingOnce => AuctionPhase::GoingOnce,
        CountdownPhase::GoingTwice => AuctionPhase::GoingTwice,
        CountdownPhase::Sold => AuctionPhase::Sold,
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// The room starts from the league's defaults.
pub(crate) fn spawn_room(
    config: LeagueConfig,
    events: EventSender,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let league_id = config.league_id.clone();

    let actor = RoomActor {
        league_id: league_id.clone(),
        state: config.fresh_state(),
        countdown: Countdown::with_secs(config.timer_duration_secs),
        config,
        members: HashMap::new(),
        init_armed: true,
        events,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        league_id,
        sender: tx,
    }
}
