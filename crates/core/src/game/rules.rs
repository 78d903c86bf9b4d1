//! Room settings and the tunable constants the room engine is built around.

use serde::{Deserialize, Serialize};

/// Minimum connected players required to start a game.
pub const MIN_PLAYERS: u8 = 2;
/// Hard cap on room membership.
pub const MAX_PLAYERS: u8 = 10;
/// Default seconds a drawer gets per turn.
pub const DEFAULT_DRAW_TIME: u32 = 80;
/// Default number of rounds per game.
pub const DEFAULT_ROUNDS: u8 = 3;
/// A hint is revealed every time `timeLeft` is a positive multiple of this.
pub const HINT_INTERVAL_SECS: u32 = 20;
/// Delay between a turn ending and the next turn/round starting.
pub const TURN_END_DELAY_SECS: u64 = 5;
/// Countdown shown while a game moves from lobby into its first turn.
pub const START_COUNTDOWN_SECS: u64 = 3;
/// Time a drawer has to pick a word before one is auto-selected.
pub const AUTO_PICK_TIMEOUT_SECS: u64 = 15;
/// Grace period an empty room is kept alive before the housekeeper evicts it.
pub const EMPTY_ROOM_GRACE_SECS: u64 = 120;
/// Maximum number of chat messages retained per room.
pub const CHAT_HISTORY_CAP: usize = 100;
/// Maximum player display-name length after trimming.
pub const MAX_NAME_LENGTH: usize = 20;
/// Maximum chat/guess message length.
pub const MAX_CHAT_LENGTH: usize = 200;
/// Alphabet room codes are drawn from (no `0/O`, `1/I/L` ambiguity).
pub const ROOM_CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Room code length in characters.
pub const ROOM_CODE_LENGTH: usize = 6;
/// Flat bonus the drawer earns per distinct correct guesser in a turn.
pub const DRAWER_BONUS_PER_GUESSER: u32 = 25;
/// Per-correct-guess flat award before time/order bonuses.
pub const BASE_GUESS_POINTS: u32 = 100;
/// Minimum allowed `drawTime` setting, in seconds.
pub const MIN_DRAW_TIME: u32 = 30;
/// Maximum allowed `drawTime` setting, in seconds.
pub const MAX_DRAW_TIME: u32 = 180;
/// Minimum allowed `maxRounds` setting.
pub const MIN_ROUNDS: u8 = 1;
/// Maximum allowed `maxRounds` setting.
pub const MAX_ROUNDS: u8 = 10;

/// Per-room configuration, settable by the host while the room is in lobby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub draw_time: u32,
    pub max_rounds: u8,
    pub max_players: u8,
    pub theme: String,
    pub is_private: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            draw_time: DEFAULT_DRAW_TIME,
            max_rounds: DEFAULT_ROUNDS,
            max_players: MAX_PLAYERS,
            theme: "general".to_string(),
            is_private: false,
        }
    }
}

impl RoomSettings {
    /// Validate a partial settings update; returns `Err` describing the
    /// first out-of-range field.
    pub fn validate_update(draw_time: Option<u32>, max_rounds: Option<u8>) -> Result<(), String> {
        if let Some(dt) = draw_time {
            if !(MIN_DRAW_TIME..=MAX_DRAW_TIME).contains(&dt) {
                return Err(format!("drawTime must be between {MIN_DRAW_TIME} and {MAX_DRAW_TIME}"));
            }
        }
        if let Some(r) = max_rounds {
            if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&r) {
                return Err(format!("maxRounds must be between {MIN_ROUNDS} and {MAX_ROUNDS}"));
            }
        }
        Ok(())
    }

    /// Validate a `maxPlayers` setting, only settable at room creation.
    pub fn validate_max_players(max_players: u8) -> Result<(), String> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(format!("maxPlayers must be between {MIN_PLAYERS} and {MAX_PLAYERS}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_in_range() {
        let s = RoomSettings::default();
        assert!((MIN_DRAW_TIME..=MAX_DRAW_TIME).contains(&s.draw_time));
        assert!((MIN_ROUNDS..=MAX_ROUNDS).contains(&s.max_rounds));
    }

    #[test]
    fn rejects_out_of_range_draw_time() {
        assert!(RoomSettings::validate_update(Some(10), None).is_err());
        assert!(RoomSettings::validate_update(Some(200), None).is_err());
        assert!(RoomSettings::validate_update(Some(30), None).is_ok());
    }

    #[test]
    fn rejects_out_of_range_rounds() {
        assert!(RoomSettings::validate_update(None, Some(0)).is_err());
        assert!(RoomSettings::validate_update(None, Some(11)).is_err());
        assert!(RoomSettings::validate_update(None, Some(10)).is_ok());
    }

    #[test]
    fn rejects_out_of_range_max_players() {
        assert!(RoomSettings::validate_max_players(0).is_err());
        assert!(RoomSettings::validate_max_players(1).is_err());
        assert!(RoomSettings::validate_max_players(11).is_err());
        assert!(RoomSettings::validate_max_players(2).is_ok());
        assert!(RoomSettings::validate_max_players(10).is_ok());
    }
}
