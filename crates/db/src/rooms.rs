//! Room persistence: the durable side of a `RoomState`, written
//! best-effort by the room actor and read back by the registry when a
//! room isn't currently live in memory (§4.1 rehydration).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct RoomRow {
    pub id: String,
    pub code: String,
    pub host_id: String,
    pub is_private: bool,
    pub max_players: i16,
    pub draw_time: i32,
    pub max_rounds: i16,
    pub theme: String,
    pub phase: String,
    pub player_count: i16,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert a freshly created room. `id`/`code` are minted by the caller
/// via `doodleguess_core::id` before the in-memory room is constructed.
#[allow(clippy::too_many_arguments)]
pub async fn insert_room(
    pool: &DbPool,
    id: &str,
    code: &str,
    host_id: &str,
    is_private: bool,
    max_players: i16,
    draw_time: i32,
    max_rounds: i16,
    theme: &str,
) -> Result<RoomRow, sqlx::Error> {
    sqlx::query_as!(
        RoomRow,
        r#"
        INSERT INTO rooms (id, code, host_id, is_private, max_players, draw_time, max_rounds, theme, phase, player_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'lobby', 1)
        RETURNING id, code, host_id, is_private, max_players, draw_time, max_rounds, theme,
                  phase, player_count, last_activity, created_at
        "#,
        id,
        code,
        host_id,
        is_private,
        max_players,
        draw_time,
        max_rounds,
        theme
    )
    .fetch_one(pool)
    .await
}

/// Look up a room by its human-facing join code, case-insensitively.
pub async fn get_room_by_code(pool: &DbPool, code: &str) -> Result<Option<RoomRow>, sqlx::Error> {
    sqlx::query_as!(
        RoomRow,
        r#"
        SELECT id, code, host_id, is_private, max_players, draw_time, max_rounds, theme,
               phase, player_count, last_activity, created_at
        FROM rooms WHERE UPPER(code) = UPPER($1)
        "#,
        code
    )
    .fetch_optional(pool)
    .await
}

pub async fn get_room_by_id(pool: &DbPool, id: &str) -> Result<Option<RoomRow>, sqlx::Error> {
    sqlx::query_as!(
        RoomRow,
        r#"
        SELECT id, code, host_id, is_private, max_players, draw_time, max_rounds, theme,
               phase, player_count, last_activity, created_at
        FROM rooms WHERE id = $1
        "#,
        id
    )
    .fetch_optional(pool)
    .await
}

/// Persist the room's current phase, host, and member count. Called
/// after every reducer transition; failures are logged and ignored
/// (§4.7's Transient-error policy — in-memory state stays authoritative).
pub async fn sync_room_state(
    pool: &DbPool,
    id: &str,
    host_id: &str,
    phase: &str,
    player_count: i16,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        r#"
        UPDATE rooms
        SET host_id = $2, phase = $3, player_count = $4, last_activity = NOW()
        WHERE id = $1
        "#,
        id,
        host_id,
        phase,
        player_count
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Rooms with zero members whose `last_activity` is older than the
/// housekeeper's staleness window, despite having no live in-memory
/// actor to have evicted them already — orphaned by a crash or missed
/// cleanup.
pub async fn get_stale_rooms(pool: &DbPool, older_than_secs: i64) -> Result<Vec<RoomRow>, sqlx::Error> {
    sqlx::query_as!(
        RoomRow,
        r#"
        SELECT id, code, host_id, is_private, max_players, draw_time, max_rounds, theme,
               phase, player_count, last_activity, created_at
        FROM rooms
        WHERE player_count = 0 AND last_activity < NOW() - (INTERVAL '1 second' * $1)
        "#,
        older_than_secs as f64
    )
    .fetch_all(pool)
    .await
}

pub async fn delete_room(pool: &DbPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query!("DELETE FROM rooms WHERE id = $1", id).execute(pool).await?;
    Ok(())
}

/// Lobby-phase rooms recent enough to be worth rehydrating at startup
/// (§4.7 "Server restart"). Rooms further along than lobby are not
/// included here; they are lost on restart by design.
pub async fn list_recent_lobby_rooms(
    pool: &DbPool,
    retention_secs: i64,
) -> Result<Vec<RoomRow>, sqlx::Error> {
    sqlx::query_as!(
        RoomRow,
        r#"
        SELECT id, code, host_id, is_private, max_players, draw_time, max_rounds, theme,
               phase, player_count, last_activity, created_at
        FROM rooms
        WHERE phase = 'lobby' AND last_activity >= NOW() - (INTERVAL '1 second' * $1)
        "#,
        retention_secs as f64
    )
    .fetch_all(pool)
    .await
}
