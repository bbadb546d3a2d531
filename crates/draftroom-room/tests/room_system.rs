//! Integration tests for the room actor, manager, and store bridge.
//!
//! Countdown tests run with paused time: awaiting a receiver lets Tokio
//! auto-advance the clock to the next countdown deadline.

use std::sync::Arc;
use std::time::Duration;

use draftroom_protocol::{
    AuctionPhase, Bid, ClientMessage, DraftPhase, DraftRoomState, LeagueId,
    Nomination, Player, PlayerId, ServerMessage, TeamId, UserId,
};
use draftroom_room::{
    DraftEvent, HydrationOutcome, LeagueConfig, MemoryStore, Origin,
    RoomError, RoomHandle, RoomManager, TeamConfig,
};
use draftroom_transport::ConnectionId;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn tid(s: &str) -> TeamId {
    TeamId::from(s)
}

fn league() -> LeagueConfig {
    LeagueConfig {
        league_id: LeagueId::from("l1"),
        teams: ["a", "b", "c", "d"]
            .into_iter()
            .map(|id| TeamConfig {
                id: tid(id),
                name: format!("Team {id}"),
            })
            .collect(),
        starting_budget: 100,
        roster_spots: 3,
        timer_duration_secs: 10,
        owners: vec![UserId::from("listed-owner")],
        ..LeagueConfig::default()
    }
}

async fn room_with(
    config: LeagueConfig,
) -> (RoomManager<MemoryStore>, RoomHandle, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let mut manager = RoomManager::new(Arc::clone(&store));
    let handle = manager.create_room(config).await.unwrap();
    (manager, handle, store)
}

fn origin(conn: u64, user: &str, is_owner: bool) -> Origin {
    Origin {
        connection_id: ConnectionId::new(conn),
        user_id: UserId::from(user),
        is_owner,
    }
}

/// Joins and returns the connection's inbox with the join traffic drained.
async fn join(handle: &RoomHandle, origin: Origin) -> Inbox {
    let (tx, mut rx) = mpsc::unbounded_channel();
    handle.join(origin, tx).await.unwrap();
    drain(&mut rx);
    rx
}

fn drain(rx: &mut Inbox) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// Sends an action and waits until the room has processed it.
async fn act(handle: &RoomHandle, origin: &Origin, msg: ClientMessage) {
    handle.send_action(origin.clone(), msg).await.unwrap();
    handle.get_state().await.unwrap();
}

async fn next_state(rx: &mut Inbox) -> DraftRoomState {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(3600), rx.recv())
            .await
            .expect("no message within an hour")
            .expect("room closed the channel");
        if let ServerMessage::StateUpdate { data } = msg {
            return data;
        }
    }
}

/// Yields until the recorder has stored an event matching `pred`.
async fn recorded(store: &MemoryStore, pred: impl Fn(&DraftEvent) -> bool) -> bool {
    for _ in 0..100 {
        if store.events().await.iter().any(&pred) {
            return true;
        }
        tokio::task::yield_now().await;
    }
    false
}

fn player(id: u32) -> Player {
    Player {
        id: PlayerId::from(id.to_string()),
        first_name: "Test".into(),
        last_name: format!("Player{id}"),
        team: "FA".into(),
        position: "OF".into(),
    }
}

fn nominate(team: &str, amount: u32, pid: u32) -> ClientMessage {
    ClientMessage::NominatePlayer(Nomination {
        team_id: tid(team),
        amount,
        player: player(pid),
    })
}

fn bid(team: &str, amount: u32) -> ClientMessage {
    ClientMessage::Bid(Bid {
        amount,
        team_id: tid(team),
    })
}

// =========================================================================
// Membership
// =========================================================================

#[tokio::test]
async fn test_join_sends_init_then_connected_users() {
    let (_m, handle, _s) = room_with(league()).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    handle.join(origin(1, "alice", false), tx).await.unwrap();

    let msgs = drain(&mut rx);
    assert!(matches!(&msgs[0], ServerMessage::Init { data } if data.teams.len() == 4));
    assert_eq!(
        msgs[1],
        ServerMessage::ConnectedUsers {
            user_ids: vec![UserId::from("alice")]
        }
    );
}

#[tokio::test]
async fn test_connected_users_sorted_and_deduplicated() {
    let (_m, handle, _s) = room_with(league()).await;
    let mut first = join(&handle, origin(1, "carol", false)).await;
    let _second = join(&handle, origin(2, "alice", false)).await;
    let _third = join(&handle, origin(3, "carol", false)).await;

    let last = drain(&mut first).pop().unwrap();
    assert_eq!(
        last,
        ServerMessage::ConnectedUsers {
            user_ids: vec![UserId::from("alice"), UserId::from("carol")]
        }
    );
}

#[tokio::test]
async fn test_leave_rebroadcasts_connected_users() {
    let (_m, handle, _s) = room_with(league()).await;
    let mut alice = join(&handle, origin(1, "alice", false)).await;
    let _bob = join(&handle, origin(2, "bob", false)).await;
    drain(&mut alice);

    handle.leave(ConnectionId::new(2)).await.unwrap();
    assert_eq!(
        drain(&mut alice),
        vec![ServerMessage::ConnectedUsers {
            user_ids: vec![UserId::from("alice")]
        }]
    );
}

#[tokio::test]
async fn test_leave_unknown_connection_fails() {
    let (_m, handle, _s) = room_with(league()).await;
    let err = handle.leave(ConnectionId::new(99)).await.unwrap_err();
    assert!(matches!(err, RoomError::NotInRoom(..)));
}

#[tokio::test]
async fn test_join_twice_fails() {
    let (_m, handle, _s) = room_with(league()).await;
    let _rx = join(&handle, origin(1, "alice", false)).await;
    let (tx, _rx2) = mpsc::unbounded_channel();
    let err = handle.join(origin(1, "alice", false), tx).await.unwrap_err();
    assert!(matches!(err, RoomError::AlreadyJoined(..)));
}

#[tokio::test]
async fn test_action_from_non_member_ignored() {
    let (_m, handle, _s) = room_with(league()).await;
    let stranger = origin(7, "mallory", true);
    act(&handle, &stranger, ClientMessage::StartDraft).await;
    assert!(!handle.get_state().await.unwrap().draft_started);
}

// =========================================================================
// Authorization
// =========================================================================

#[tokio::test]
async fn test_non_owner_privileged_action_dropped() {
    let (_m, handle, _s) = room_with(league()).await;
    let user = origin(1, "alice", false);
    let mut rx = join(&handle, user.clone()).await;

    act(&handle, &user, ClientMessage::StartDraft).await;

    assert!(!handle.get_state().await.unwrap().draft_started);
    assert!(drain(&mut rx).is_empty(), "nothing is sent back");
}

#[tokio::test]
async fn test_owner_claim_starts_draft_for_everyone() {
    let (_m, handle, _s) = room_with(league()).await;
    let owner = origin(1, "commish", true);
    let _owner_rx = join(&handle, owner.clone()).await;
    let mut viewer = join(&handle, origin(2, "alice", false)).await;

    act(&handle, &owner, ClientMessage::StartDraft).await;

    let state = next_state(&mut viewer).await;
    assert!(state.draft_started);
    assert_eq!(state.draft_phase, DraftPhase::Live);
}

#[tokio::test]
async fn test_league_owner_list_grants_rights() {
    let (_m, handle, _s) = room_with(league()).await;
    let owner = origin(1, "listed-owner", false);
    let _rx = join(&handle, owner.clone()).await;

    act(&handle, &owner, ClientMessage::StartDraft).await;
    assert!(handle.get_state().await.unwrap().draft_started);
}

#[tokio::test]
async fn test_start_draft_is_idempotent() {
    let (_m, handle, _s) = room_with(league()).await;
    let owner = origin(1, "commish", true);
    let mut rx = join(&handle, owner.clone()).await;

    act(&handle, &owner, ClientMessage::StartDraft).await;
    drain(&mut rx);
    act(&handle, &owner, ClientMessage::StartDraft).await;

    assert!(drain(&mut rx).is_empty());
    assert!(handle.get_state().await.unwrap().draft_started);
}

// =========================================================================
// init / reset
// =========================================================================

#[tokio::test]
async fn test_init_without_data_resends_to_requester_only() {
    let (_m, handle, _s) = room_with(league()).await;
    let alice = origin(1, "alice", false);
    let mut alice_rx = join(&handle, alice.clone()).await;
    let mut bob_rx = join(&handle, origin(2, "bob", false)).await;
    drain(&mut alice_rx);

    act(&handle, &alice, ClientMessage::Init(None)).await;

    let msgs = drain(&mut alice_rx);
    assert_eq!(msgs.len(), 1);
    assert!(matches!(msgs[0], ServerMessage::Init { .. }));
    assert!(drain(&mut bob_rx).is_empty());
}

#[tokio::test]
async fn test_force_init_accepted_once_then_again_after_reset() {
    let (_m, handle, _s) = room_with(league()).await;
    let owner = origin(1, "commish", true);
    let _rx = join(&handle, owner.clone()).await;

    let mut forced = handle.get_state().await.unwrap();
    forced.draft_started = true;
    forced.total_picks = 2;

    act(&handle, &owner, ClientMessage::Init(Some(forced.clone()))).await;
    assert_eq!(handle.get_state().await.unwrap().total_picks, 2);

    // Second forced init is ignored.
    let mut other = forced.clone();
    other.total_picks = 5;
    act(&handle, &owner, ClientMessage::Init(Some(other.clone()))).await;
    assert_eq!(handle.get_state().await.unwrap().total_picks, 2);

    // Reset re-arms it exactly once.
    act(&handle, &owner, ClientMessage::ResetDraft).await;
    act(&handle, &owner, ClientMessage::Init(Some(other.clone()))).await;
    assert_eq!(handle.get_state().await.unwrap().total_picks, 5);
    other.total_picks = 6;
    act(&handle, &owner, ClientMessage::Init(Some(other))).await;
    assert_eq!(handle.get_state().await.unwrap().total_picks, 5);
}

#[tokio::test]
async fn test_force_init_with_empty_state_keeps_league_teams() {
    let (_m, handle, _s) = room_with(league()).await;
    let owner = origin(1, "commish", true);
    let _rx = join(&handle, owner.clone()).await;

    act(&handle, &owner, ClientMessage::Init(Some(DraftRoomState::default()))).await;

    let state = handle.get_state().await.unwrap();
    assert_eq!(state.teams.len(), 4);
    assert_eq!(state.nomination_order.len(), 4);
    assert_eq!(state.current_nominator_team_id, Some(tid("a")));

    act(&handle, &owner, ClientMessage::StartDraft).await;
    act(&handle, &owner, nominate("a", 1, 1)).await;
    assert!(handle.get_state().await.unwrap().nominated_player.is_some());
}

#[tokio::test]
async fn test_reset_restores_defaults() {
    let (_m, handle, _s) = room_with(league()).await;
    let owner = origin(1, "commish", true);
    let mut rx = join(&handle, owner.clone()).await;

    let mut progressed = handle.get_state().await.unwrap();
    progressed.draft_started = true;
    progressed.total_picks = 3;
    if let Some(team) = progressed.teams.get_mut(&tid("a")) {
        team.remaining_budget = 12;
        team.remaining_roster_spots = 1;
    }
    act(&handle, &owner, ClientMessage::HydrateState(progressed)).await;
    drain(&mut rx);

    act(&handle, &owner, ClientMessage::ResetDraft).await;

    let msgs = drain(&mut rx);
    assert_eq!(msgs[0], ServerMessage::DraftReset);
    let ServerMessage::StateUpdate { data } = &msgs[1] else {
        panic!("expected stateUpdate after draftReset, got {:?}", msgs[1]);
    };
    assert!(!data.draft_started);
    assert_eq!(data.total_picks, 0);
    assert_eq!(data.draft_phase, DraftPhase::Scheduled);
    let a = &data.teams[&tid("a")];
    assert_eq!(a.remaining_budget, 100);
    assert_eq!(a.remaining_roster_spots, 3);
    assert!(a.players_drafted.is_empty());
}

// =========================================================================
// Auction
// =========================================================================

async fn started_room() -> (RoomManager<MemoryStore>, RoomHandle, Arc<MemoryStore>, Origin, Inbox)
{
    let (m, handle, store) = room_with(league()).await;
    let owner = origin(1, "commish", true);
    let mut rx = join(&handle, owner.clone()).await;
    act(&handle, &owner, ClientMessage::StartDraft).await;
    drain(&mut rx);
    (m, handle, store, owner, rx)
}

#[tokio::test]
async fn test_nominate_and_bid_broadcast() {
    let (_m, handle, _s, owner, mut rx) = started_room().await;

    act(&handle, &owner, nominate("a", 2, 11)).await;
    let state = next_state(&mut rx).await;
    assert_eq!(state.nominated_player.unwrap().id, PlayerId::from("11"));
    assert_eq!(state.current_bid.unwrap().amount, 2);

    act(&handle, &owner, bid("b", 5)).await;
    let state = next_state(&mut rx).await;
    assert_eq!(
        state.current_bid,
        Some(Bid {
            amount: 5,
            team_id: tid("b")
        })
    );
    assert_eq!(state.bid_history.len(), 2);
}

#[tokio::test]
async fn test_rejected_bid_is_silent() {
    let (_m, handle, _s, owner, mut rx) = started_room().await;
    act(&handle, &owner, nominate("a", 5, 1)).await;
    drain(&mut rx);

    act(&handle, &owner, bid("b", 5)).await;
    act(&handle, &owner, bid("b", 1000)).await;

    assert!(drain(&mut rx).is_empty());
    assert_eq!(handle.get_state().await.unwrap().current_bid.unwrap().amount, 5);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_runs_to_sold() {
    let (_m, handle, store, owner, mut rx) = started_room().await;
    act(&handle, &owner, nominate("a", 3, 42)).await;
    act(&handle, &owner, bid("c", 8)).await;
    drain(&mut rx);

    let started = tokio::time::Instant::now();
    act(&handle, &owner, ClientMessage::TriggerCountdown).await;

    let once = next_state(&mut rx).await;
    assert_eq!(once.auction_phase, AuctionPhase::GoingOnce);
    assert_eq!(once.bid_timer, Some(10));
    assert!(once.bid_timer_expires_at.is_some());

    let twice = next_state(&mut rx).await;
    assert_eq!(twice.auction_phase, AuctionPhase::GoingTwice);

    let sold = next_state(&mut rx).await;
    assert_eq!(sold.auction_phase, AuctionPhase::Sold);
    assert!(started.elapsed() >= Duration::from_secs(20));

    let after = next_state(&mut rx).await;
    assert_eq!(after.auction_phase, AuctionPhase::Idle);
    assert_eq!(after.total_picks, 1);
    assert!(after.nominated_player.is_none());
    assert_eq!(after.bid_timer, None);
    let c = &after.teams[&tid("c")];
    assert_eq!(c.remaining_budget, 92);
    assert_eq!(c.players_drafted[0].cost, 8);
    // Snake: "a" nominated first, "b" is next.
    assert_eq!(after.current_nominator_team_id, Some(tid("b")));

    assert!(
        recorded(&store, |e| matches!(
            e,
            DraftEvent::PlayerSold { team_id, .. } if *team_id == tid("c")
        ))
        .await
    );
}

#[tokio::test(start_paused = true)]
async fn test_bid_cancels_countdown() {
    let (_m, handle, _s, owner, mut rx) = started_room().await;
    act(&handle, &owner, nominate("a", 1, 1)).await;
    act(&handle, &owner, ClientMessage::TriggerCountdown).await;
    assert_eq!(next_state(&mut rx).await.auction_phase, AuctionPhase::Idle);
    assert_eq!(next_state(&mut rx).await.auction_phase, AuctionPhase::GoingOnce);

    tokio::time::sleep(Duration::from_secs(5)).await;
    act(&handle, &owner, bid("b", 2)).await;
    let state = next_state(&mut rx).await;
    assert_eq!(state.auction_phase, AuctionPhase::Idle);
    assert_eq!(state.bid_timer_expires_at, None);

    // No transition ever fires for the cancelled countdown.
    let quiet = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
    assert!(quiet.is_err(), "cancelled countdown still fired");
    assert_eq!(handle.get_state().await.unwrap().total_picks, 0);
}

#[tokio::test(start_paused = true)]
async fn test_trigger_while_running_does_not_restart() {
    let (_m, handle, _s, owner, mut rx) = started_room().await;
    act(&handle, &owner, nominate("a", 1, 1)).await;
    drain(&mut rx);

    let started = tokio::time::Instant::now();
    act(&handle, &owner, ClientMessage::TriggerCountdown).await;
    assert_eq!(next_state(&mut rx).await.auction_phase, AuctionPhase::GoingOnce);

    tokio::time::sleep(Duration::from_secs(6)).await;
    act(&handle, &owner, ClientMessage::TriggerCountdown).await;

    let twice = next_state(&mut rx).await;
    assert_eq!(twice.auction_phase, AuctionPhase::GoingTwice);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(11), "countdown restarted: {elapsed:?}");
}

#[tokio::test]
async fn test_trigger_without_nomination_rejected() {
    let (_m, handle, _s, owner, mut rx) = started_room().await;
    act(&handle, &owner, ClientMessage::TriggerCountdown).await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(
        handle.get_state().await.unwrap().auction_phase,
        AuctionPhase::Idle
    );
}

#[tokio::test(start_paused = true)]
async fn test_pause_cancels_countdown_and_freezes_auction() {
    let (_m, handle, _s, owner, mut rx) = started_room().await;
    act(&handle, &owner, nominate("a", 1, 1)).await;
    act(&handle, &owner, ClientMessage::TriggerCountdown).await;
    drain(&mut rx);

    act(&handle, &owner, ClientMessage::PauseDraft).await;
    let msgs = drain(&mut rx);
    let ServerMessage::DraftPaused { data } = &msgs[0] else {
        panic!("expected draftPaused, got {msgs:?}");
    };
    assert!(data.draft_paused);
    assert_eq!(data.auction_phase, AuctionPhase::Idle);

    act(&handle, &owner, bid("b", 9)).await;
    act(&handle, &owner, ClientMessage::TriggerCountdown).await;
    let quiet = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
    assert!(quiet.is_err(), "paused room produced {quiet:?}");
    assert_eq!(handle.get_state().await.unwrap().current_bid.unwrap().amount, 1);

    act(&handle, &owner, ClientMessage::ResumeDraft).await;
    let resumed = next_state(&mut rx).await;
    assert!(!resumed.draft_paused);
    act(&handle, &owner, bid("b", 9)).await;
    assert_eq!(next_state(&mut rx).await.current_bid.unwrap().amount, 9);
}

#[tokio::test(start_paused = true)]
async fn test_auto_countdown_starts_on_nomination() {
    let config = LeagueConfig {
        auto_countdown: true,
        ..league()
    };
    let (_m, handle, _s) = room_with(config).await;
    let owner = origin(1, "commish", true);
    let mut rx = join(&handle, owner.clone()).await;
    act(&handle, &owner, ClientMessage::StartDraft).await;
    drain(&mut rx);

    act(&handle, &owner, nominate("a", 1, 1)).await;
    let state = next_state(&mut rx).await;
    assert!(state.nominated_player.is_some());
    assert_eq!(state.auction_phase, AuctionPhase::GoingOnce);
}

#[tokio::test(start_paused = true)]
async fn test_draft_completes_when_rosters_fill() {
    let config = LeagueConfig {
        teams: league().teams.into_iter().take(2).collect(),
        roster_spots: 1,
        ..league()
    };
    let (_m, handle, store) = room_with(config).await;
    let owner = origin(1, "commish", true);
    let mut rx = join(&handle, owner.clone()).await;
    act(&handle, &owner, ClientMessage::StartDraft).await;

    for (pid, team) in ["a", "b"].into_iter().enumerate() {
        act(&handle, &owner, nominate(team, 1, pid as u32)).await;
        act(&handle, &owner, ClientMessage::TriggerCountdown).await;
        drain(&mut rx);
        loop {
            let state = next_state(&mut rx).await;
            if state.auction_phase == AuctionPhase::Idle {
                break;
            }
        }
    }

    let state = handle.get_state().await.unwrap();
    assert_eq!(state.draft_phase, DraftPhase::Completed);
    assert_eq!(state.total_picks, 2);

    assert!(
        recorded(&store, |e| matches!(e, DraftEvent::DraftCompleted { .. })).await
    );
}

// =========================================================================
// Hydration and the manager
// =========================================================================

#[tokio::test]
async fn test_manager_resumes_stored_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let mut stored = league().fresh_state();
    stored.draft_started = true;
    stored.total_picks = 5;
    stored.current_nomination_index = 2;
    stored.auction_phase = AuctionPhase::GoingOnce;
    store.seed(LeagueId::from("l1"), stored).await;

    let mut manager = RoomManager::new(Arc::clone(&store));
    let handle = manager.create_room(league()).await.unwrap();

    let state = handle.get_state().await.unwrap();
    assert_eq!(state.total_picks, 5);
    assert_eq!(state.auction_phase, AuctionPhase::Idle);
    assert_eq!(state.current_nominator_team_id, Some(tid("c")));
    assert_eq!((state.current_round, state.current_pick), (2, 2));

    // A resumed hydration disarms the forced init.
    let owner = origin(1, "commish", true);
    let _rx = join(&handle, owner.clone()).await;
    act(&handle, &owner, ClientMessage::Init(Some(DraftRoomState::default()))).await;
    assert_eq!(handle.get_state().await.unwrap().total_picks, 5);
}

#[tokio::test]
async fn test_manager_fresh_snapshot_keeps_started_flag() {
    let store = Arc::new(MemoryStore::new());
    store
        .seed_json(LeagueId::from("l1"), r#"{"draftStarted":true,"draftPhase":"live"}"#)
        .await
        .unwrap();
    let mut manager = RoomManager::new(Arc::clone(&store));
    let handle = manager.create_room(league()).await.unwrap();

    let state = handle.get_state().await.unwrap();
    assert!(state.draft_started);
    assert_eq!(state.draft_phase, DraftPhase::Live);
    assert_eq!(state.teams.len(), 4);
    assert_eq!(state.teams[&tid("a")].remaining_budget, 100);
}

#[tokio::test]
async fn test_hydrate_outcome_reported() {
    let (_m, handle, _s) = room_with(league()).await;
    assert_eq!(
        handle.hydrate(DraftRoomState::default()).await.unwrap(),
        HydrationOutcome::Fresh
    );
    assert_eq!(
        handle.hydrate(league().fresh_state()).await.unwrap(),
        HydrationOutcome::Resumed
    );
}

#[tokio::test]
async fn test_restore_state_from_owner() {
    let (_m, handle, _s) = room_with(league()).await;
    let owner = origin(1, "commish", true);
    let mut rx = join(&handle, owner.clone()).await;

    let mut snapshot = league().fresh_state();
    snapshot.total_picks = 4;
    act(&handle, &owner, ClientMessage::RestoreState(snapshot)).await;

    assert_eq!(next_state(&mut rx).await.total_picks, 4);
}

#[tokio::test]
async fn test_manager_create_duplicate_fails() {
    let (mut manager, _handle, _s) = room_with(league()).await;
    let err = manager.create_room(league()).await.unwrap_err();
    assert!(matches!(err, RoomError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_manager_rejects_invalid_config() {
    let store = Arc::new(MemoryStore::new());
    let mut manager = RoomManager::new(store);
    let config = LeagueConfig {
        draft_order: vec![tid("ghost")],
        ..league()
    };
    assert!(matches!(
        manager.create_room(config).await,
        Err(RoomError::InvalidConfig(_))
    ));
    assert_eq!(manager.room_count(), 0);
}

#[tokio::test]
async fn test_manager_tracks_multiple_leagues() {
    let (mut manager, _h1, _s) = room_with(league()).await;
    assert_eq!(manager.sole_league(), Some(LeagueId::from("l1")));

    let second = LeagueConfig {
        league_id: LeagueId::from("l2"),
        ..league()
    };
    manager.create_room(second).await.unwrap();
    assert_eq!(manager.room_count(), 2);
    assert_eq!(manager.sole_league(), None);
    assert_eq!(
        manager.league_ids(),
        vec![LeagueId::from("l1"), LeagueId::from("l2")]
    );

    let infos = manager.list_rooms().await;
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].league_id, LeagueId::from("l1"));
    assert_eq!(infos[0].draft_phase, DraftPhase::Scheduled);
}

#[tokio::test]
async fn test_manager_destroy_room() {
    let (mut manager, handle, _s) = room_with(league()).await;
    manager.destroy_room(&LeagueId::from("l1")).await.unwrap();

    assert!(manager.get(&LeagueId::from("l1")).is_none());
    assert!(matches!(
        manager.destroy_room(&LeagueId::from("l1")).await,
        Err(RoomError::NotFound(_))
    ));

    // The actor has stopped, so the old handle is dead.
    tokio::task::yield_now().await;
    assert!(matches!(
        handle.get_state().await,
        Err(RoomError::Unavailable(_))
    ));
}
