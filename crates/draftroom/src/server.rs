//! `DraftRoomServer` builder and server loop.
//!
//! This is the entry point for running a draft room server. It ties
//! together all the layers: transport → protocol → session → room, plus
//! the HTTP liveness endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use draftroom_protocol::{Codec, JsonCodec, LeagueId};
use draftroom_room::{
    DraftStore, LeagueConfig, MemoryStore, RoomError, RoomHandle, RoomManager,
};
use draftroom_session::{Authenticator, ConnectionRegistry};
use draftroom_transport::WebSocketTransport;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::DraftRoomError;
use crate::handler::handle_connection;

/// How long a client may take to complete the WebSocket upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
/// Interior mutability via `Mutex` where needed.
pub(crate) struct ServerState<S: DraftStore, A: Authenticator, C: Codec> {
    pub(crate) registry: Mutex<ConnectionRegistry>,
    pub(crate) rooms: Mutex<RoomManager<S>>,
    pub(crate) auth: A,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a draft room server.
///
/// # Example
///
/// ```rust,ignore
/// use draftroom::prelude::*;
///
/// let server = DraftRoomServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .health_bind("0.0.0.0:8081")
///     .league(league_config)
///     .build(JwtAuthenticator::new(secret))
///     .await?;
/// server.run().await
/// ```
pub struct DraftRoomServerBuilder<S: DraftStore> {
    bind_addr: String,
    health_addr: Option<String>,
    leagues: Vec<LeagueConfig>,
    store: Arc<S>,
}

impl DraftRoomServerBuilder<MemoryStore> {
    /// Creates a new builder backed by an in-memory store.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            health_addr: None,
            leagues: Vec::new(),
            store: Arc::new(MemoryStore::new()),
        }
    }
}

impl Default for DraftRoomServerBuilder<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DraftStore> DraftRoomServerBuilder<S> {
    /// Sets the address for the WebSocket listener.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Serves `GET /health` on a separate listener.
    pub fn health_bind(mut self, addr: &str) -> Self {
        self.health_addr = Some(addr.to_string());
        self
    }

    /// Hosts a league's draft room.
    pub fn league(mut self, config: LeagueConfig) -> Self {
        self.leagues.push(config);
        self
    }

    /// Hosts several leagues.
    pub fn leagues(mut self, configs: impl IntoIterator<Item = LeagueConfig>) -> Self {
        self.leagues.extend(configs);
        self
    }

    /// Sets the persistence store rooms hydrate from and record to.
    pub fn store<T: DraftStore>(self, store: Arc<T>) -> DraftRoomServerBuilder<T> {
        DraftRoomServerBuilder {
            bind_addr: self.bind_addr,
            health_addr: self.health_addr,
            leagues: self.leagues,
            store,
        }
    }

    /// Binds the listeners, starts one room per league, and returns the
    /// server ready to run.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// # Errors
    /// Fails if no league is configured, a league configuration is
    /// invalid, or a listener cannot be bound.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<DraftRoomServer<S, A, JsonCodec>, DraftRoomError> {
        if self.leagues.is_empty() {
            return Err(RoomError::InvalidConfig("no leagues configured".into()).into());
        }

        let mut rooms = RoomManager::new(self.store);
        for config in self.leagues {
            rooms.create_room(config).await?;
        }

        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let health = match &self.health_addr {
            Some(addr) => Some(
                TcpListener::bind(addr)
                    .await
                    .map_err(DraftRoomError::Health)?,
            ),
            None => None,
        };

        let state = Arc::new(ServerState {
            registry: Mutex::new(ConnectionRegistry::new()),
            rooms: Mutex::new(rooms),
            auth,
            codec: JsonCodec,
        });

        Ok(DraftRoomServer {
            transport,
            health,
            state,
        })
    }
}

/// A draft room server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DraftRoomServer<S: DraftStore, A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    health: Option<TcpListener>,
    state: Arc<ServerState<S, A, C>>,
}

impl<S, A, C> DraftRoomServer<S, A, C>
where
    S: DraftStore,
    A: Authenticator,
    C: Codec,
{
    /// Returns the address the WebSocket listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the address of the liveness listener, if one is bound.
    pub fn health_addr(&self) -> Option<SocketAddr> {
        self.health.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Returns a handle to a hosted league's room.
    pub async fn room(&self, league_id: &LeagueId) -> Option<RoomHandle> {
        self.state.rooms.lock().await.get(league_id)
    }

    /// Runs the server accept loop.
    ///
    /// Spawns the liveness endpoint, then accepts incoming connections and
    /// spawns a handler task for each. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), DraftRoomError> {
        if let Some(listener) = self.health.take() {
            tokio::spawn(serve_health(listener));
        }

        let leagues = self.state.rooms.lock().await.league_ids();
        tracing::info!(?leagues, "draft room server running");

        loop {
            match self.transport.accept_pending().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match timeout(HANDSHAKE_TIMEOUT, pending.upgrade()).await {
                            Ok(Ok(conn)) => conn,
                            Ok(Err(e)) => {
                                tracing::debug!(%peer, error = %e, "handshake failed");
                                return;
                            }
                            Err(_) => {
                                tracing::debug!(%peer, "handshake timed out");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// The liveness router: `GET /health` answers `ok`.
pub fn health_router() -> Router {
    Router::new().route("/health", get(|| async { "ok" }))
}

async fn serve_health(listener: TcpListener) {
    let addr = listener.local_addr().ok();
    tracing::info!(?addr, "health endpoint listening");
    if let Err(e) = axum::serve(listener, health_router()).await {
        tracing::error!(error = %e, "health endpoint stopped");
    }
}
