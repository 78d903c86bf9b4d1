//! Player persistence, keyed by room. `session_id` here is the
//! transport token from `doodleguess_core::session`, not a login
//! session — it only ever identifies "this socket belongs to this
//! player in this room".

use sqlx::FromRow;

use crate::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    pub id: String,
    pub room_id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub avatar: Option<String>,
    pub score: i32,
    pub is_host: bool,
    pub session_id: String,
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_player(
    pool: &DbPool,
    id: &str,
    room_id: &str,
    user_id: Option<&str>,
    name: &str,
    avatar: Option<&str>,
    is_host: bool,
    session_id: &str,
) -> Result<PlayerRow, sqlx::Error> {
    sqlx::query_as!(
        PlayerRow,
        r#"
        INSERT INTO players (id, room_id, user_id, name, avatar, score, is_host, session_id)
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7)
        RETURNING id, room_id, user_id, name, avatar, score, is_host, session_id
        "#,
        id,
        room_id,
        user_id,
        name,
        avatar,
        is_host,
        session_id
    )
    .fetch_one(pool)
    .await
}

/// The score a previously-seen player id carried before leaving, used
/// to populate `RoomCommand::Join::restored_score` on rejoin.
pub async fn get_player(pool: &DbPool, id: &str) -> Result<Option<PlayerRow>, sqlx::Error> {
    sqlx::query_as!(
        PlayerRow,
        r#"
        SELECT id, room_id, user_id, name, avatar, score, is_host, session_id
        FROM players WHERE id = $1
        "#,
        id
    )
    .fetch_optional(pool)
    .await
}

/// All members of a room, in join order. Used to rebuild a lobby-phase
/// `RoomState` when a room isn't live in memory (§4.1 rehydration).
pub async fn list_players_for_room(pool: &DbPool, room_id: &str) -> Result<Vec<PlayerRow>, sqlx::Error> {
    sqlx::query_as!(
        PlayerRow,
        r#"
        SELECT id, room_id, user_id, name, avatar, score, is_host, session_id
        FROM players WHERE room_id = $1 ORDER BY id
        "#,
        room_id
    )
    .fetch_all(pool)
    .await
}

pub async fn update_score(pool: &DbPool, id: &str, score: i32) -> Result<(), sqlx::Error> {
    sqlx::query!("UPDATE players SET score = $2 WHERE id = $1", id, score).execute(pool).await?;
    Ok(())
}

pub async fn update_session(pool: &DbPool, id: &str, session_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query!("UPDATE players SET session_id = $2 WHERE id = $1", id, session_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_host(pool: &DbPool, room_id: &str, new_host_id: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query!("UPDATE players SET is_host = FALSE WHERE room_id = $1", room_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query!("UPDATE players SET is_host = TRUE WHERE id = $1", new_host_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete_player(pool: &DbPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query!("DELETE FROM players WHERE id = $1", id).execute(pool).await?;
    Ok(())
}

pub async fn delete_players_for_room(pool: &DbPool, room_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query!("DELETE FROM players WHERE room_id = $1", room_id).execute(pool).await?;
    Ok(())
}
