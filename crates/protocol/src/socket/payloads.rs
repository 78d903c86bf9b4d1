//! Inbound Socket.IO payloads. Handlers deserialize one of these from
//! the raw ack/event data and translate it into a
//! `doodleguess_core::game::commands::RoomCommand`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    pub name: String,
    pub avatar: Option<String>,
    pub draw_time: Option<u32>,
    pub rounds: Option<u8>,
    pub max_players: Option<u8>,
    pub theme: Option<String>,
    pub is_private: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub code: String,
    pub name: String,
    pub avatar: Option<String>,
    /// Present when the client is rejoining with a previously-issued
    /// player id, to restore score rather than starting fresh.
    pub player_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectPayload {
    pub room_id: String,
    pub player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    pub draw_time: Option<u32>,
    pub max_rounds: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickPlayerPayload {
    pub player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectWordPayload {
    pub word: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStrokePayload {
    /// Opaque stroke data; the server never interprets it.
    pub payload: serde_json::Value,
}
