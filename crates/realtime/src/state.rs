//! Application state shared across every Socket.IO handler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use doodleguess_db::DbPool;

use crate::registry::RoomRegistry;

/// What a connected socket currently represents: which room and which
/// player within it. Populated on a successful `room:create`,
/// `room:join`, or `room:reconnect`; cleared on disconnect.
#[derive(Debug, Clone)]
pub struct SocketSession {
    pub room_id: String,
    pub code: String,
    pub player_id: String,
}

#[derive(Clone)]
pub struct AppState {
    db: DbPool,
    registry: Arc<RoomRegistry>,
    sessions: Arc<Mutex<HashMap<String, SocketSession>>>,
}

impl AppState {
    pub fn new(db: DbPool, registry: Arc<RoomRegistry>) -> Self {
        Self { db, registry, sessions: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub fn remember_session(&self, socket_id: &str, session: SocketSession) {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .insert(socket_id.to_string(), session);
    }

    pub fn session_for(&self, socket_id: &str) -> Option<SocketSession> {
        self.sessions.lock().expect("session map lock poisoned").get(socket_id).cloned()
    }

    pub fn forget_session(&self, socket_id: &str) -> Option<SocketSession> {
        self.sessions.lock().expect("session map lock poisoned").remove(socket_id)
    }
}
