//! Realtime server configuration

use std::env;

use anyhow::{Context, Result};

/// A room with zero members found with a `last_activity` older than
/// this is considered orphaned by the housekeeper.
const DEFAULT_STALE_ROOM_SECS: i64 = 1800;

/// Realtime server configuration, loaded from the environment with
/// `.env` support via `dotenvy`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// How often the housekeeper sweeps for orphaned rooms.
    pub housekeeper_interval_secs: u64,
    /// A room whose persisted `last_activity` is older than this, with
    /// no live actor holding it, is assumed orphaned by a crash.
    pub stale_room_secs: i64,
    /// On startup, lobby rooms with `last_activity` within this window
    /// are rehydrated; older ones are left for the housekeeper to reap.
    pub rehydration_retention_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("REALTIME_PORT")
                .unwrap_or_else(|_| "3002".to_string())
                .parse()
                .context("Invalid REALTIME_PORT")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            housekeeper_interval_secs: env::var("HOUSEKEEPER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            stale_room_secs: env::var("STALE_ROOM_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STALE_ROOM_SECS),
            rehydration_retention_secs: env::var("REHYDRATION_RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STALE_ROOM_SECS),
        })
    }
}
