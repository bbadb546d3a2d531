//! Per-connection handler: authentication, room membership, and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read `token` and `leagueId` from the upgrade request's query string
//!   2. Authenticate the token → `Identity`, or send `authError` and close
//!   3. Register the session and send `welcome`
//!   4. Spawn the writer task and join the league's room
//!   5. Loop: decode client messages → queue them on the room

use std::sync::Arc;

use draftroom_protocol::{
    ClientMessage, Codec, Envelope, LeagueId, ServerMessage,
};
use draftroom_room::{DraftStore, Origin, RoomHandle};
use draftroom_session::{Authenticator, Session};
use draftroom_transport::{
    Connection, ConnectionId, WebSocketConnection, query_param,
};
use tokio::sync::mpsc;

use crate::DraftRoomError;
use crate::server::ServerState;

/// Sent in `authError` for every token problem. The cause is only logged.
const AUTH_FAILED: &str = "authentication failed";

/// Drop guard that tears down a connection's session when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async work.
struct SessionGuard<S: DraftStore, A: Authenticator, C: Codec> {
    conn_id: ConnectionId,
    room: RoomHandle,
    state: Arc<ServerState<S, A, C>>,
}

impl<S: DraftStore, A: Authenticator, C: Codec> Drop for SessionGuard<S, A, C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let room = self.room.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let _ = state.registry.lock().await.remove(conn_id);
            if let Err(e) = room.leave(conn_id).await {
                tracing::debug!(%conn_id, error = %e, "leave on disconnect failed");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, A, C>>,
) -> Result<(), DraftRoomError>
where
    S: DraftStore,
    A: Authenticator,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let query = conn.query().unwrap_or_default();
    let token = query_param(query, "token").unwrap_or_default();
    let requested_league = query_param(query, "leagueId").map(LeagueId::from);

    // --- Step 1: Authenticate ---
    let identity = match state.auth.authenticate(token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!(%conn_id, error = %e, "authentication failed");
            reject(&conn, &state.codec, AUTH_FAILED).await?;
            return Err(e.into());
        }
    };

    // --- Step 2: Resolve the room ---
    let room = {
        let rooms = state.rooms.lock().await;
        requested_league
            .or_else(|| rooms.sole_league())
            .and_then(|league_id| rooms.get(&league_id))
    };
    let Some(room) = room else {
        tracing::info!(
            %conn_id,
            user_id = %identity.user_id,
            league = ?query_param(query, "leagueId"),
            "no such league"
        );
        reject(&conn, &state.codec, "unknown league").await?;
        return Ok(());
    };
    let league_id = room.league_id().clone();

    // --- Step 3: Register and welcome ---
    let origin = Origin {
        connection_id: conn_id,
        user_id: identity.user_id.clone(),
        is_owner: identity.is_owner,
    };
    state
        .registry
        .lock()
        .await
        .register(Session::new(conn_id, identity, league_id.clone()))?;
    let _guard = SessionGuard {
        conn_id,
        room: room.clone(),
        state: Arc::clone(&state),
    };
    tracing::info!(
        %conn_id,
        room_id = %league_id,
        user_id = %origin.user_id,
        is_owner = origin.is_owner,
        "connection authenticated"
    );

    send(
        &conn,
        &state.codec,
        ServerMessage::Welcome {
            connection_id: conn_id.to_string(),
        },
    )
    .await?;

    // --- Step 4: Writer task, then join ---
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&state),
        rx,
    ));
    room.join(origin.clone(), tx).await?;

    // --- Step 5: Reader loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, room_id = %league_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "discarding malformed message");
                continue;
            }
        };

        if room.send_action(origin.clone(), msg).await.is_err() {
            tracing::warn!(%conn_id, room_id = %league_id, "room is gone, closing");
            break;
        }
    }

    writer.abort();
    // _guard drops here → registry removal and room leave fire.
    Ok(())
}

/// Forwards the room's messages to the socket, stamped and encoded.
///
/// Ends when the room drops the sender or the socket stops accepting
/// writes.
async fn write_loop<S, A, C>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<S, A, C>>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) where
    S: DraftStore,
    A: Authenticator,
    C: Codec,
{
    let conn_id = conn.id();
    while let Some(msg) = rx.recv().await {
        if let Err(e) = send(&conn, &state.codec, msg).await {
            tracing::debug!(%conn_id, error = %e, "write failed, stopping writer");
            break;
        }
    }
}

/// Stamps a message with the current time and sends it as a text frame.
async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: ServerMessage,
) -> Result<(), DraftRoomError> {
    let text = codec.encode_text(&Envelope::stamped(msg))?;
    conn.send_text(&text).await?;
    Ok(())
}

/// Sends exactly one `authError` and closes the socket.
async fn reject(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    reason: &str,
) -> Result<(), DraftRoomError> {
    send(
        conn,
        codec,
        ServerMessage::AuthError {
            error: reason.to_string(),
        },
    )
    .await?;
    conn.close().await?;
    Ok(())
}
