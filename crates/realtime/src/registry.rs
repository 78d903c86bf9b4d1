//! In-memory room directory: which rooms are live, and how to reach
//! their actor tasks.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use chrono::Utc;
use doodleguess_core::game::{PlayerState, RoomSettings, RoomState};
use doodleguess_core::{id, session, CoreError};
use doodleguess_db::DbPool;
use socketioxide::SocketIo;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::actors::room_actor::{Envelope, RoomActor};

const MAX_CODE_ATTEMPTS: u32 = 100;
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// A live room's mailbox, plus the bits of identity handlers need
/// without round-tripping through the actor (its code, for naming the
/// Socket.IO room members join).
#[derive(Clone)]
pub struct RoomHandle {
    pub room_id: String,
    pub code: String,
    pub tx: mpsc::Sender<Envelope>,
}

pub struct RoomRegistry {
    by_id: RwLock<HashMap<String, RoomHandle>>,
    by_code: RwLock<HashMap<String, String>>,
    db: DbPool,
    /// Set once via `set_io` right after the Socket.IO layer is built in
    /// `main`, which needs `AppState` (and so this registry) to exist
    /// first. No room is created before that happens.
    io: OnceLock<SocketIo>,
}

impl RoomRegistry {
    pub fn new(db: DbPool) -> Arc<Self> {
        Arc::new(Self {
            by_id: RwLock::new(HashMap::new()),
            by_code: RwLock::new(HashMap::new()),
            db,
            io: OnceLock::new(),
        })
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    pub fn set_io(&self, io: SocketIo) {
        let _ = self.io.set(io);
    }

    fn io(&self) -> &SocketIo {
        self.io.get().expect("RoomRegistry::set_io must run before any room is created")
    }

    /// Create a room with a fresh code, retrying on collision against
    /// both the live registry and the persistence store (§4.1). Returns
    /// the handle plus the minted host's player id and transport token.
    pub async fn create_room(
        self: &Arc<Self>,
        host_name: String,
        host_avatar: Option<String>,
        settings: RoomSettings,
    ) -> Result<(RoomHandle, String, String), CoreError> {
        let room_id = id::generate_room_id();
        let host_id = id::generate_player_id();
        let session_id = session::generate_prefixed_transport_token();
        let code = self.mint_unique_code().await?;

        let host = PlayerState::new(host_id.clone(), session_id.clone(), host_name, host_avatar);
        let state = RoomState::new(room_id.clone(), code.clone(), host, settings.clone(), Utc::now());

        if let Err(err) = doodleguess_db::rooms::insert_room(
            &self.db,
            &room_id,
            &code,
            &host_id,
            settings.is_private,
            settings.max_players as i16,
            settings.draw_time as i32,
            settings.max_rounds as i16,
            &settings.theme,
        )
        .await
        {
            warn!(error = %err, room_id = %room_id, "failed to persist new room; continuing in-memory only");
        }

        let handle = self.spawn(state);
        info!(room_id = %room_id, code = %code, "room created");
        Ok((handle, host_id, session_id))
    }

    async fn mint_unique_code(&self) -> Result<String, CoreError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = id::generate_room_code();
            let taken_in_memory =
                self.by_code.read().expect("by_code lock poisoned").contains_key(&candidate);
            if taken_in_memory {
                continue;
            }
            let taken_in_db = doodleguess_db::rooms::get_room_by_code(&self.db, &candidate)
                .await
                .map(|row| row.is_some())
                .unwrap_or(false);
            if !taken_in_db {
                return Ok(candidate);
            }
        }
        Err(CoreError::CodeExhaustion)
    }

    fn spawn(self: &Arc<Self>, state: RoomState) -> RoomHandle {
        let room_id = state.id.clone();
        let code = state.code.clone();
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let handle = RoomHandle { room_id: room_id.clone(), code: code.clone(), tx: tx.clone() };

        self.by_id.write().expect("by_id lock poisoned").insert(room_id.clone(), handle.clone());
        self.by_code.write().expect("by_code lock poisoned").insert(code.clone(), room_id.clone());

        let actor =
            RoomActor::new(state, rx, tx, self.db.clone(), self.io().clone(), Arc::clone(self));
        tokio::spawn(actor.run());

        handle
    }

    pub async fn lookup_by_code(self: &Arc<Self>, code: &str) -> Option<RoomHandle> {
        let upper = code.to_uppercase();
        if let Some(room_id) = self.by_code.read().expect("by_code lock poisoned").get(&upper).cloned() {
            return self.by_id.read().expect("by_id lock poisoned").get(&room_id).cloned();
        }
        self.rehydrate_by_code(&upper).await
    }

    pub fn get_by_id(&self, room_id: &str) -> Option<RoomHandle> {
        self.by_id.read().expect("by_id lock poisoned").get(room_id).cloned()
    }

    /// Reconstruct a lobby-phase room from its persisted row and member
    /// list. A room caught mid-turn by a restart cannot be rehydrated:
    /// the transient fields a turn depends on (the current word, the
    /// offered words, chat history) are never written to the database,
    /// so only `lobby` rooms are brought back; anything further along
    /// is treated as lost (§4.1's documented durability boundary).
    async fn rehydrate_by_code(self: &Arc<Self>, code: &str) -> Option<RoomHandle> {
        let row = doodleguess_db::rooms::get_room_by_code(&self.db, code).await.ok().flatten()?;
        self.rehydrate_row(row).await
    }

    async fn rehydrate_row(self: &Arc<Self>, row: doodleguess_db::rooms::RoomRow) -> Option<RoomHandle> {
        if row.phase != "lobby" {
            return None;
        }
        let rows = doodleguess_db::players::list_players_for_room(&self.db, &row.id).await.ok()?;
        let mut players: Vec<PlayerState> = rows
            .into_iter()
            .map(|r| {
                let mut p = PlayerState::new(r.id, r.session_id, r.name, r.avatar);
                p.is_host = r.is_host;
                p.is_connected = false;
                p.score = r.score.max(0) as u32;
                p.user_id = r.user_id;
                p
            })
            .collect();
        if players.is_empty() {
            return None;
        }
        if !players.iter().any(|p| p.is_host) {
            players[0].is_host = true;
        }
        let host = players.iter().find(|p| p.is_host).cloned().unwrap();
        let others: Vec<PlayerState> = players.into_iter().filter(|p| p.id != host.id).collect();

        let settings = RoomSettings {
            draw_time: row.draw_time as u32,
            max_rounds: row.max_rounds as u8,
            max_players: row.max_players as u8,
            theme: row.theme.clone(),
            is_private: row.is_private,
        };
        let mut state = RoomState::new(row.id.clone(), row.code.clone(), host, settings, Utc::now());
        for other in others {
            state.drawer_order.push(other.id.clone());
            state.players.push(other);
        }

        info!(room_id = %row.id, code = %row.code, "rehydrated lobby room from persistence");
        Some(self.spawn(state))
    }

    /// Bring back every lobby-phase room recent enough to matter, once,
    /// at process startup (§4.7 "Server restart"). Rooms further along
    /// than lobby, or past `retention_secs` since their last activity,
    /// are left for the housekeeper to eventually delete.
    pub async fn bootstrap(self: &Arc<Self>, retention_secs: i64) {
        let rows = match doodleguess_db::rooms::list_recent_lobby_rooms(&self.db, retention_secs).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "failed to list rooms for rehydration bootstrap; starting empty");
                return;
            }
        };
        let count = rows.len();
        for row in rows {
            self.rehydrate_row(row).await;
        }
        info!(candidates = count, "rehydration bootstrap complete");
    }

    pub(crate) fn remove(&self, room_id: &str, code: &str) {
        self.by_id.write().expect("by_id lock poisoned").remove(room_id);
        self.by_code.write().expect("by_code lock poisoned").remove(code);
        info!(room_id = %room_id, "room evicted");
    }
}
