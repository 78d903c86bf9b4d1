//! Socket.IO event names (§6 of the room engine's wire contract).

/// Client-to-server events.
pub mod client {
    pub const ROOM_CREATE: &str = "room:create";
    pub const ROOM_JOIN: &str = "room:join";
    pub const ROOM_LEAVE: &str = "room:leave";
    pub const ROOM_RECONNECT: &str = "room:reconnect";
    pub const ROOM_SETTINGS: &str = "room:settings";
    pub const PLAYER_KICK: &str = "player:kick";
    pub const GAME_START: &str = "game:start";
    pub const GAME_SELECT_WORD: &str = "game:select_word";
    pub const GAME_PLAY_AGAIN: &str = "game:play_again";
    pub const CHAT_MESSAGE: &str = "chat:message";
    pub const DRAW_STROKE: &str = "draw:stroke";
    pub const DRAW_CLEAR: &str = "draw:clear";
    pub const DRAW_UNDO: &str = "draw:undo";
}

/// Server-to-client events; mirrors
/// `doodleguess_core::game::events::RoomEvent::name()` for consumers
/// that only need the wire string, not the full typed payload.
pub mod server {
    pub const ROOM_SYNC: &str = "room:sync";
    pub const CHAT_MESSAGE: &str = "chat:message";
    pub const PLAYER_JOINED: &str = "player:joined";
    pub const PLAYER_DISCONNECTED: &str = "player:disconnected";
    pub const PLAYER_KICKED: &str = "player:kicked";
    pub const HOST_CHANGED: &str = "host:changed";
    pub const GAME_STARTING: &str = "game:starting";
    pub const GAME_CHOOSE_WORD: &str = "game:choose_word";
    pub const GAME_WORD: &str = "game:word";
    pub const GAME_TURN_START: &str = "game:turn_start";
    pub const GAME_TIME_UPDATE: &str = "game:time_update";
    pub const GAME_HINT: &str = "game:hint";
    pub const GAME_CORRECT_GUESS: &str = "game:correct_guess";
    pub const GAME_CLOSE_GUESS: &str = "game:close_guess";
    pub const GAME_TURN_END: &str = "game:turn_end";
    pub const GAME_ROUND_END: &str = "game:round_end";
    pub const GAME_ENDED: &str = "game:ended";
    pub const SERVER_SHUTDOWN: &str = "server:shutdown";
    pub const DRAW_STROKE: &str = "draw:stroke";
    pub const DRAW_CLEAR: &str = "draw:clear";
    pub const DRAW_UNDO: &str = "draw:undo";
    pub const ERROR: &str = "error";
}
