//! Room state the reducer operates on.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rules::RoomSettings;

/// The room's lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomPhase {
    Lobby,
    Choosing,
    Drawing,
    RoundEnd,
    GameEnd,
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomPhase::Lobby => write!(f, "lobby"),
            RoomPhase::Choosing => write!(f, "choosing"),
            RoomPhase::Drawing => write!(f, "drawing"),
            RoomPhase::RoundEnd => write!(f, "roundEnd"),
            RoomPhase::GameEnd => write!(f, "gameEnd"),
        }
    }
}

/// A member of a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    /// Transport handle; re-associated on reconnect, not a login session.
    pub session_id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub score: u32,
    pub is_host: bool,
    pub is_drawing: bool,
    pub has_guessed: bool,
    pub is_connected: bool,
    /// External user id for end-of-game stat attribution only.
    pub user_id: Option<String>,
}

impl PlayerState {
    pub fn new(id: String, session_id: String, name: String, avatar: Option<String>) -> Self {
        Self {
            id,
            session_id,
            name,
            avatar,
            score: 0,
            is_host: false,
            is_drawing: false,
            has_guessed: false,
            is_connected: true,
            user_id: None,
        }
    }
}

/// One line in a room's chat/guess feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_guess: bool,
    pub is_close: bool,
}

/// Complete room state the reducer mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomState {
    pub id: String,
    pub code: String,
    pub host_player_id: String,
    pub settings: RoomSettings,
    pub phase: RoomPhase,
    pub round: u8,
    pub turn: usize,
    pub current_drawer_id: Option<String>,
    pub current_word: Option<String>,
    pub masked_word: Option<String>,
    pub time_left: u32,
    pub guessed_players: HashSet<String>,
    pub drawer_order: Vec<String>,
    pub players: Vec<PlayerState>,
    pub chat_history: VecDeque<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// A kicked player id cannot rejoin this room until this time.
    pub kick_deny_until: std::collections::HashMap<String, DateTime<Utc>>,
    /// The three words offered to the drawer while phase = choosing.
    pub offered_words: Vec<String>,
    /// True from a successful `game:start` until the countdown timer
    /// fires; guards against a second `game:start` mid-countdown.
    pub is_starting: bool,
    /// Set when every connected non-drawer has guessed; consumed by the
    /// next tick, which performs the "1s settle" transition to roundEnd
    /// (§4.2) instead of decrementing `timeLeft`.
    pub pending_round_end_reason: Option<String>,
}

impl RoomState {
    pub fn new(
        id: String,
        code: String,
        host: PlayerState,
        settings: RoomSettings,
        now: DateTime<Utc>,
    ) -> Self {
        let host_id = host.id.clone();
        let mut host = host;
        host.is_host = true;
        Self {
            id,
            code,
            host_player_id: host_id.clone(),
            settings,
            phase: RoomPhase::Lobby,
            round: 1,
            turn: 0,
            current_drawer_id: None,
            current_word: None,
            masked_word: None,
            time_left: 0,
            guessed_players: HashSet::new(),
            drawer_order: vec![host_id],
            players: vec![host],
            chat_history: VecDeque::new(),
            created_at: now,
            last_activity: now,
            kick_deny_until: std::collections::HashMap::new(),
            offered_words: Vec::new(),
            is_starting: false,
            pending_round_end_reason: None,
        }
    }

    pub fn get_player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn get_player_mut(&mut self, player_id: &str) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn get_host(&self) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_drawer(&self, player_id: &str) -> bool {
        self.current_drawer_id.as_deref() == Some(player_id)
    }

    pub fn connected_non_drawer_ids(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|p| p.is_connected && !self.is_drawer(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected).count()
    }

    pub fn push_chat(&mut self, message: ChatMessage) {
        self.chat_history.push_back(message);
        while self.chat_history.len() > super::rules::CHAT_HISTORY_CAP {
            self.chat_history.pop_front();
        }
    }

    /// Check invariants 1-7 from §3. Debug-only assertion helper used in
    /// tests; the production reducer is constructed to never violate them.
    #[cfg(test)]
    pub fn check_invariants(&self) {
        let drawing_players: Vec<&PlayerState> = self.players.iter().filter(|p| p.is_drawing).collect();
        assert!(drawing_players.len() <= 1, "at most one drawer");
        if let Some(p) = drawing_players.first() {
            assert_eq!(Some(p.id.as_str()), self.current_drawer_id.as_deref());
        }
        if matches!(self.phase, RoomPhase::Lobby | RoomPhase::RoundEnd | RoomPhase::GameEnd) {
            assert!(drawing_players.is_empty(), "no drawer outside choosing/drawing");
        }

        if self.phase == RoomPhase::Drawing {
            assert!(self.current_word.as_ref().is_some_and(|w| !w.is_empty()));
            let w = self.current_word.as_ref().unwrap();
            let m = self.masked_word.as_ref().unwrap();
            assert_eq!(w.chars().count(), m.chars().count());
            for (wc, mc) in w.chars().zip(m.chars()) {
                assert!(mc == '_' || mc == wc);
            }
        } else {
            assert!(self.current_word.is_none());
        }

        for id in &self.guessed_players {
            assert_ne!(Some(id.as_str()), self.current_drawer_id.as_deref());
            assert!(self.get_player(id).is_some_and(|p| p.has_guessed));
        }

        if !self.players.is_empty() {
            assert_eq!(self.players.iter().filter(|p| p.is_host).count(), 1);
        }

        let mut seen = HashSet::new();
        for id in &self.drawer_order {
            assert!(seen.insert(id.clone()), "drawer_order has duplicate {id}");
        }
        for p in &self.players {
            assert!(self.drawer_order.contains(&p.id), "player {} missing from drawer_order", p.id);
        }
        assert_eq!(self.drawer_order.len(), self.players.len());

        assert!(self.round <= self.settings.max_rounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> PlayerState {
        PlayerState::new("ply_host".into(), "tok_1".into(), "Host".into(), None)
    }

    #[test]
    fn new_room_starts_in_lobby_with_host() {
        let room = RoomState::new(
            "room_1".into(),
            "ABCDEF".into(),
            host(),
            RoomSettings::default(),
            Utc::now(),
        );
        assert_eq!(room.phase, RoomPhase::Lobby);
        assert_eq!(room.players.len(), 1);
        assert!(room.get_host().unwrap().is_host);
        room.check_invariants();
    }

    #[test]
    fn push_chat_evicts_oldest_over_cap() {
        let mut room = RoomState::new(
            "room_1".into(),
            "ABCDEF".into(),
            host(),
            RoomSettings::default(),
            Utc::now(),
        );
        for i in 0..150 {
            room.push_chat(ChatMessage {
                id: format!("msg_{i}"),
                player_id: "ply_host".into(),
                player_name: "Host".into(),
                text: format!("line {i}"),
                timestamp: Utc::now(),
                is_guess: false,
                is_close: false,
            });
        }
        assert_eq!(room.chat_history.len(), super::super::rules::CHAT_HISTORY_CAP);
        assert_eq!(room.chat_history.front().unwrap().text, "line 50");
    }
}
