// Draft room server entry point.
//
// Startup sequence:
// 1. Parse flags and initialize tracing
// 2. Load the league file
// 3. Seed snapshots, if a snapshot directory is given
// 4. Build the server (one room per league) and run until Ctrl+C

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use draftroom::prelude::*;
use tracing_subscriber::EnvFilter;

use config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Flags and tracing
    let args = Args::parse();
    init_tracing(args.json_logs);
    args.validate().context("invalid flags")?;
    tracing::info!("draftroom server v{} starting", env!("CARGO_PKG_VERSION"));

    // 2. League file
    let leagues = config::load_leagues(&args.leagues)
        .with_context(|| format!("failed to load {}", args.leagues.display()))?;
    tracing::info!(count = leagues.len(), "leagues loaded");

    // 3. Snapshots
    let store = Arc::new(MemoryStore::new());
    if let Some(dir) = &args.snapshot_dir {
        let loaded = config::seed_snapshots(dir, &leagues, &store)
            .await
            .context("failed to load snapshots")?;
        tracing::info!(loaded, dir = %dir.display(), "snapshots seeded");
    }

    // 4. Server
    let server = DraftRoomServerBuilder::new()
        .bind(&args.bind)
        .health_bind(&args.health_bind)
        .leagues(leagues)
        .store(store)
        .build(JwtAuthenticator::new(args.jwt_secret.as_bytes()))
        .await
        .context("failed to start server")?;

    tracing::info!(
        addr = %server.local_addr()?,
        health = ?server.health_addr(),
        "listening"
    );

    tokio::select! {
        result = server.run() => result.context("server stopped")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("draftroom=info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
