//! Events emitted by the room engine's reducer.
//!
//! Each event carries a `Recipients` tag so the transport adapter never
//! has to special-case which payloads are secret (§9 "secret
//! partitioning of broadcasts"): `game:choose_word`, `game:word`, and
//! `game:close_guess` are the only recipient-specific events; everything
//! else is a room-wide broadcast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{ChatMessage, PlayerState};

/// Who an event should be delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// Every current member of the room.
    Room,
    /// A single player, identified by id.
    Player(String),
}

/// An event paired with its delivery scope.
#[derive(Debug, Clone)]
pub struct Targeted {
    pub recipients: Recipients,
    pub event: RoomEvent,
}

impl Targeted {
    pub fn room(event: RoomEvent) -> Self {
        Self { recipients: Recipients::Room, event }
    }

    pub fn whisper(player_id: impl Into<String>, event: RoomEvent) -> Self {
        Self { recipients: Recipients::Player(player_id.into()), event }
    }
}

/// Public projection of a room, sent on every state-changing event.
/// `currentWord` is never included (§4.6); only `wordLength`/`maskedWord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: String,
    pub code: String,
    pub phase: String,
    pub round: u8,
    pub turn: usize,
    pub max_rounds: u8,
    pub time_left: u32,
    pub draw_time: u32,
    pub current_drawer: Option<String>,
    pub word_length: Option<usize>,
    pub masked_word: Option<String>,
    pub theme: String,
    pub is_private: bool,
    pub max_players: u8,
}

/// Public projection of a player, as carried in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub score: u32,
    pub is_host: bool,
    pub is_drawing: bool,
    pub has_guessed: bool,
    pub avatar: Option<String>,
    pub is_connected: bool,
}

impl From<&PlayerState> for PlayerSnapshot {
    fn from(p: &PlayerState) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            score: p.score,
            is_host: p.is_host,
            is_drawing: p.is_drawing,
            has_guessed: p.has_guessed,
            avatar: p.avatar.clone(),
            is_connected: p.is_connected,
        }
    }
}

/// A single ranking row in `game:ended`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub rank: u8,
    pub id: String,
    pub name: String,
    pub score: u32,
    pub user_id: Option<String>,
}

/// Events the room engine emits. Serialised with an internal `type` tag
/// matching the outbound socket event names in spec §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    RoomSync { room: RoomSnapshot, players: Vec<PlayerSnapshot> },
    ChatMessage(ChatMessage),
    PlayerJoined { player_id: String, name: String },
    PlayerDisconnected { player_id: String },
    HostChanged { new_host_id: String, new_host_name: String },
    GameStarting { countdown: u64 },
    ChooseWord { words: Vec<String> },
    Word { word: String },
    TurnStart { drawer_id: String, word_length: usize, masked_word: String, time_left: u32 },
    TimeUpdate { time_left: u32 },
    Hint { masked_word: String },
    CorrectGuess { player_id: String, player_name: String, points: u32 },
    TurnEnd { word: String, reason: String, all_guessed: bool },
    RoundEnd { round: u8 },
    GameEnded { rankings: Vec<RankingRow> },
    PlayerKicked { reason: String },
    CloseGuess { message: String },
    ServerShutdown { message: String },
    /// Forwarded verbatim; the server never interprets stroke contents.
    DrawStroke { payload: serde_json::Value },
    DrawClear,
    DrawUndo,
    Error { code: String, message: String },
}

impl RoomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::RoomSync { .. } => "room:sync",
            RoomEvent::ChatMessage(_) => "chat:message",
            RoomEvent::PlayerJoined { .. } => "player:joined",
            RoomEvent::PlayerDisconnected { .. } => "player:disconnected",
            RoomEvent::HostChanged { .. } => "host:changed",
            RoomEvent::GameStarting { .. } => "game:starting",
            RoomEvent::ChooseWord { .. } => "game:choose_word",
            RoomEvent::Word { .. } => "game:word",
            RoomEvent::TurnStart { .. } => "game:turn_start",
            RoomEvent::TimeUpdate { .. } => "game:time_update",
            RoomEvent::Hint { .. } => "game:hint",
            RoomEvent::CorrectGuess { .. } => "game:correct_guess",
            RoomEvent::TurnEnd { .. } => "game:turn_end",
            RoomEvent::RoundEnd { .. } => "game:round_end",
            RoomEvent::GameEnded { .. } => "game:ended",
            RoomEvent::PlayerKicked { .. } => "player:kicked",
            RoomEvent::CloseGuess { .. } => "game:close_guess",
            RoomEvent::ServerShutdown { .. } => "server:shutdown",
            RoomEvent::DrawStroke { .. } => "draw:stroke",
            RoomEvent::DrawClear => "draw:clear",
            RoomEvent::DrawUndo => "draw:undo",
            RoomEvent::Error { .. } => "error",
        }
    }
}

/// Helper kept for parity with the reducer's need to stamp server-side
/// timestamps onto chat lines at the point of construction.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_spec_wire_names() {
        assert_eq!(RoomEvent::RoomSync { room: sample_snapshot(), players: vec![] }.name(), "room:sync");
        assert_eq!(RoomEvent::Word { word: "chat".into() }.name(), "game:word");
        assert_eq!(RoomEvent::CloseGuess { message: "pome".into() }.name(), "game:close_guess");
    }

    #[test]
    fn whisper_targets_a_single_player() {
        let t = Targeted::whisper("ply_1", RoomEvent::Word { word: "chat".into() });
        assert_eq!(t.recipients, Recipients::Player("ply_1".into()));
    }

    #[test]
    fn room_snapshot_serialises_without_current_word_field() {
        let json = serde_json::to_string(&sample_snapshot()).unwrap();
        assert!(!json.contains("currentWord"));
        assert!(json.contains("maskedWord"));
    }

    fn sample_snapshot() -> RoomSnapshot {
        RoomSnapshot {
            id: "room_1".into(),
            code: "ABCDEF".into(),
            phase: "lobby".into(),
            round: 1,
            turn: 0,
            max_rounds: 3,
            time_left: 0,
            draw_time: 80,
            current_drawer: None,
            word_length: None,
            masked_word: None,
            theme: "general".into(),
            is_private: false,
            max_players: 10,
        }
    }
}
