// Command-line flags, the league file, and startup snapshots.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use draftroom::prelude::{LeagueConfig, MemoryStore, StoreError};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Live auction draft room server
#[derive(Parser, Debug, Clone)]
#[command(name = "draftroom-server", version, about = "Live auction draft room server")]
pub struct Args {
    /// WebSocket listen address
    #[arg(long, env = "DRAFTROOM_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Listen address for `GET /health`
    #[arg(long, env = "DRAFTROOM_HEALTH_BIND", default_value = "127.0.0.1:8081")]
    pub health_bind: String,

    /// Path to the TOML file listing the hosted leagues
    #[arg(long, env = "DRAFTROOM_LEAGUES", default_value = "./leagues.toml")]
    pub leagues: PathBuf,

    /// HS256 secret shared with the identity service
    #[arg(long, env = "DRAFTROOM_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Directory of `<league_id>.json` snapshots to resume from
    #[arg(long, env = "DRAFTROOM_SNAPSHOT_DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Enable structured JSON logging
    #[arg(long, env = "DRAFTROOM_JSON_LOGS")]
    pub json_logs: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "jwt_secret".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("bad snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        source: StoreError,
    },
}

// ---------------------------------------------------------------------------
// League file
// ---------------------------------------------------------------------------

/// Deserialization target for the league file: a list of `[[league]]`
/// tables.
#[derive(Debug, Deserialize)]
struct LeaguesFile {
    #[serde(default)]
    league: Vec<LeagueConfig>,
}

/// Reads and parses the league file.
pub fn load_leagues(path: &Path) -> Result<Vec<LeagueConfig>, ConfigError> {
    let text = read_file(path)?;
    parse_leagues(&text, path)
}

/// Parses league file contents. `path` is only used in errors.
///
/// Per-league consistency (team ids, draft order) is checked when the
/// room is created; this only checks what spans leagues.
pub fn parse_leagues(text: &str, path: &Path) -> Result<Vec<LeagueConfig>, ConfigError> {
    let file: LeaguesFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if file.league.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league".into(),
            message: "at least one [[league]] table is required".into(),
        });
    }

    let mut seen = HashSet::new();
    for league in &file.league {
        if !seen.insert(&league.league_id) {
            return Err(ConfigError::ValidationError {
                field: "league_id".into(),
                message: format!("league `{}` is listed twice", league.league_id),
            });
        }
    }

    Ok(file.league)
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Seeds `store` with `<dir>/<league_id>.json` for every league that has
/// one. Returns how many were loaded.
pub async fn seed_snapshots(
    dir: &Path,
    leagues: &[LeagueConfig],
    store: &MemoryStore,
) -> Result<usize, ConfigError> {
    let mut loaded = 0;
    for league in leagues {
        let path = dir.join(format!("{}.json", league.league_id));
        if !path.is_file() {
            continue;
        }
        let text = read_file(&path)?;
        store
            .seed_json(league.league_id.clone(), &text)
            .await
            .map_err(|source| ConfigError::Snapshot {
                path: path.clone(),
                source,
            })?;
        tracing::info!(room_id = %league.league_id, path = %path.display(), "snapshot loaded");
        loaded += 1;
    }
    Ok(loaded)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}
