//! The connection registry: one session per authenticated socket.
//!
//! `ConnectionRegistry` is a plain `HashMap` and is not thread-safe by
//! itself. The gateway keeps it behind a mutex shared by every connection
//! handler, and only holds the lock for a lookup or an insert.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use draftroom_protocol::{LeagueId, UserId};
use draftroom_transport::ConnectionId;

use crate::{Identity, SessionError};

/// The server's record of an authenticated connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub league_id: LeagueId,
    /// Whether this connection may run privileged draft-control actions.
    pub is_owner: bool,
    pub connected_at: DateTime<Utc>,
}

impl Session {
    /// Builds a session for a freshly authenticated connection.
    pub fn new(
        connection_id: ConnectionId,
        identity: Identity,
        league_id: LeagueId,
    ) -> Self {
        Self {
            connection_id,
            user_id: identity.user_id,
            league_id,
            is_owner: identity.is_owner,
            connected_at: Utc::now(),
        }
    }
}

/// Tracks every live session, keyed by connection.
///
/// A user may hold several connections at once (two browser tabs); each
/// gets its own session.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: HashMap<ConnectionId, Session>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a session for a newly authenticated connection.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyRegistered`] if the connection already
    /// has a session.
    pub fn register(&mut self, session: Session) -> Result<(), SessionError> {
        let id = session.connection_id;
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyRegistered(id));
        }

        tracing::info!(
            conn_id = %id,
            user_id = %session.user_id,
            league_id = %session.league_id,
            is_owner = session.is_owner,
            "session registered"
        );
        self.sessions.insert(id, session);
        Ok(())
    }

    /// Removes a connection's session, returning it.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if nothing is registered for the
    /// connection.
    pub fn remove(&mut self, id: ConnectionId) -> Result<Session, SessionError> {
        let session =
            self.sessions.remove(&id).ok_or(SessionError::NotFound(id))?;
        tracing::info!(conn_id = %id, user_id = %session.user_id, "session removed");
        Ok(session)
    }

    /// Looks up a connection's session.
    pub fn get(&self, id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Distinct users connected to `league`, sorted.
    pub fn connected_users(&self, league: &LeagueId) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .sessions
            .values()
            .filter(|s| &s.league_id == league)
            .map(|s| s.user_id.clone())
            .collect();
        users.sort();
        users.dedup();
        users
    }

    /// Number of live sessions across all leagues.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// `true` if no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
