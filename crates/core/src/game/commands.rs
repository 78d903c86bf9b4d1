//! Commands the room engine's reducer applies to a `RoomState`.
//!
//! Commands are transport-agnostic: the realtime crate translates
//! inbound socket events into these before calling `reduce`, and
//! translates scheduled timer fires the same way.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::rules::{self, RoomSettings};

/// The six timer kinds the room engine owns (§4.3). Each room has at
/// most one live timer per kind; a `generation` counter lets a stale
/// timer fire (one superseded by a later timer of the same kind) be
/// recognised and discarded by the actor without a real cancellation
/// handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Tick,
    HintReveal,
    AutoPick,
    PostTurnDelay,
    StartCountdown,
    EmptyRoomCleanup,
}

/// Commands applied to a room via the reducer.
#[derive(Debug, Clone)]
pub enum RoomCommand {
    /// A player joins the room (§4.5 `join`). `restored_score` is looked
    /// up from the persistence store by the caller when `player_id` was
    /// supplied by the client as a previously-seen id; the reducer stays
    /// pure by taking the looked-up value rather than querying itself.
    Join {
        player_id: String,
        session_id: String,
        name: String,
        avatar: Option<String>,
        restored_score: Option<u32>,
    },

    /// A player leaves voluntarily (§4.5 `leave`).
    Leave { player_id: String },

    /// A player's transport closes without an explicit leave.
    Disconnect { player_id: String },

    /// A previously-seen player reconnects on a new transport.
    Reconnect { player_id: String, new_session_id: String },

    /// Host-only: update `drawTime`/`maxRounds` while in lobby.
    UpdateSettings { player_id: String, draw_time: Option<u32>, max_rounds: Option<u8> },

    /// Host-only: start the game from lobby.
    StartGame { player_id: String },

    /// Drawer selects one of the offered words.
    SelectWord { player_id: String, word: String },

    /// Host-only: start a fresh game after gameEnd.
    PlayAgain { player_id: String },

    /// A chat line or guess from a member.
    ChatOrGuess { player_id: String, text: String },

    /// Opaque drawing payload, forwarded verbatim to other members.
    DrawStroke { player_id: String, payload: serde_json::Value },
    DrawClear { player_id: String },
    DrawUndo { player_id: String },

    /// Host-only: remove a member and deny their rejoin briefly.
    KickPlayer { player_id: String, target_id: String },

    /// A scheduled timer of `kind` fired; `generation` ties it to the
    /// spawn that scheduled it.
    TimerFired { kind: TimerKind, generation: u64 },
}

impl RoomCommand {
    /// The member this command is attributed to, if any (timers and
    /// kick targets are handled separately).
    pub fn sender_id(&self) -> Option<&str> {
        match self {
            RoomCommand::Join { player_id, .. }
            | RoomCommand::Leave { player_id }
            | RoomCommand::Disconnect { player_id }
            | RoomCommand::Reconnect { player_id, .. }
            | RoomCommand::UpdateSettings { player_id, .. }
            | RoomCommand::StartGame { player_id }
            | RoomCommand::SelectWord { player_id, .. }
            | RoomCommand::PlayAgain { player_id }
            | RoomCommand::ChatOrGuess { player_id, .. }
            | RoomCommand::DrawStroke { player_id, .. }
            | RoomCommand::DrawClear { player_id }
            | RoomCommand::DrawUndo { player_id }
            | RoomCommand::KickPlayer { player_id, .. } => Some(player_id),
            RoomCommand::TimerFired { .. } => None,
        }
    }

    /// Whether this command requires the sender to be the room's host.
    pub fn requires_host(&self) -> bool {
        matches!(
            self,
            RoomCommand::UpdateSettings { .. }
                | RoomCommand::StartGame { .. }
                | RoomCommand::PlayAgain { .. }
                | RoomCommand::KickPlayer { .. }
        )
    }

    /// Human-readable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            RoomCommand::Join { .. } => "Join",
            RoomCommand::Leave { .. } => "Leave",
            RoomCommand::Disconnect { .. } => "Disconnect",
            RoomCommand::Reconnect { .. } => "Reconnect",
            RoomCommand::UpdateSettings { .. } => "UpdateSettings",
            RoomCommand::StartGame { .. } => "StartGame",
            RoomCommand::SelectWord { .. } => "SelectWord",
            RoomCommand::PlayAgain { .. } => "PlayAgain",
            RoomCommand::ChatOrGuess { .. } => "ChatOrGuess",
            RoomCommand::DrawStroke { .. } => "DrawStroke",
            RoomCommand::DrawClear { .. } => "DrawClear",
            RoomCommand::DrawUndo { .. } => "DrawUndo",
            RoomCommand::KickPlayer { .. } => "KickPlayer",
            RoomCommand::TimerFired { .. } => "TimerFired",
        }
    }
}

/// Settings carried in a `room:create` command, prior to a room existing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomSettings {
    pub draw_time: Option<u32>,
    pub rounds: Option<u8>,
    pub max_players: Option<u8>,
    pub theme: Option<String>,
    pub is_private: Option<bool>,
}

impl CreateRoomSettings {
    /// Builds a `RoomSettings`, validating every client-supplied field
    /// against its spec range before it can ever reach the reducer.
    pub fn into_room_settings(self) -> Result<RoomSettings, CoreError> {
        rules::RoomSettings::validate_update(self.draw_time, self.rounds).map_err(CoreError::InvalidInput)?;
        if let Some(mp) = self.max_players {
            rules::RoomSettings::validate_max_players(mp).map_err(CoreError::InvalidInput)?;
        }

        let mut settings = RoomSettings::default();
        if let Some(dt) = self.draw_time {
            settings.draw_time = dt;
        }
        if let Some(r) = self.rounds {
            settings.max_rounds = r;
        }
        if let Some(mp) = self.max_players {
            settings.max_players = mp;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(p) = self.is_private {
            settings.is_private = p;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_sender_id() {
        let join = RoomCommand::Join {
            player_id: "ply_1".into(),
            session_id: "tok_1".into(),
            name: "A".into(),
            avatar: None,
            restored_score: None,
        };
        assert_eq!(join.sender_id(), Some("ply_1"));
        assert_eq!(RoomCommand::TimerFired { kind: TimerKind::Tick, generation: 1 }.sender_id(), None);
    }

    #[test]
    fn test_requires_host() {
        assert!(RoomCommand::StartGame { player_id: "ply_1".into() }.requires_host());
        assert!(!RoomCommand::ChatOrGuess { player_id: "ply_1".into(), text: "hi".into() }.requires_host());
    }

    #[test]
    fn create_settings_defaults_fill_gaps() {
        let partial = CreateRoomSettings { draw_time: Some(60), ..Default::default() };
        let settings = partial.into_room_settings().unwrap();
        assert_eq!(settings.draw_time, 60);
        assert_eq!(settings.max_rounds, super::super::rules::DEFAULT_ROUNDS);
    }

    #[test]
    fn create_settings_rejects_out_of_range_draw_time() {
        let partial = CreateRoomSettings { draw_time: Some(5), ..Default::default() };
        assert!(partial.into_room_settings().is_err());
    }

    #[test]
    fn create_settings_rejects_out_of_range_max_players() {
        let partial = CreateRoomSettings { max_players: Some(1), ..Default::default() };
        assert!(partial.into_room_settings().is_err());
    }
}
