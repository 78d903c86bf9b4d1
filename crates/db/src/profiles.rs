//! Cross-game stat attribution for authenticated players (`userId` on a
//! `PlayerState`). A profile is upserted lazily the first time its
//! owner appears in a finished game; there is no user/account table in
//! this crate — login and session issuance belong outside this system.

use sqlx::FromRow;

use crate::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub games_played: i32,
    pub games_won: i32,
    pub total_score: i64,
}

pub async fn get_profile(pool: &DbPool, user_id: &str) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as!(
        ProfileRow,
        "SELECT user_id, games_played, games_won, total_score FROM profiles WHERE user_id = $1",
        user_id
    )
    .fetch_optional(pool)
    .await
}

/// Record the outcome of a finished game for one player. Upserts so the
/// first appearance of a `userId` creates its profile row.
pub async fn record_game_result(
    pool: &DbPool,
    user_id: &str,
    score: i32,
    won: bool,
) -> Result<ProfileRow, sqlx::Error> {
    sqlx::query_as!(
        ProfileRow,
        r#"
        INSERT INTO profiles (user_id, games_played, games_won, total_score)
        VALUES ($1, 1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
        SET games_played = profiles.games_played + 1,
            games_won = profiles.games_won + $2,
            total_score = profiles.total_score + $3
        RETURNING user_id, games_played, games_won, total_score
        "#,
        user_id,
        won as i32,
        i64::from(score)
    )
    .fetch_one(pool)
    .await
}
