//! Periodic sweep for rooms orphaned by a crash: a persisted row with
//! no live actor holding it, past the staleness window. A room that
//! empties out normally is already handled by its own actor's
//! `EmptyRoomCleanup` timer; this exists for the case where the
//! process died before that timer could fire.

use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::registry::RoomRegistry;

pub async fn run(registry: Arc<RoomRegistry>, interval_secs: u64, stale_room_secs: i64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        sweep(&registry, stale_room_secs).await;
    }
}

async fn sweep(registry: &Arc<RoomRegistry>, stale_room_secs: i64) {
    let stale = match doodleguess_db::rooms::get_stale_rooms(registry.db(), stale_room_secs).await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, "failed to query stale rooms");
            return;
        }
    };

    for row in stale {
        if registry.get_by_id(&row.id).is_some() {
            continue; // still live; last_activity just hasn't synced since the last command
        }
        if let Err(err) = doodleguess_db::players::delete_players_for_room(registry.db(), &row.id).await {
            warn!(error = %err, room_id = %row.id, "failed to delete players for stale room");
            continue;
        }
        match doodleguess_db::rooms::delete_room(registry.db(), &row.id).await {
            Ok(()) => info!(room_id = %row.id, code = %row.code, "evicted stale room with no live actor"),
            Err(err) => warn!(error = %err, room_id = %row.id, "failed to delete stale room"),
        }
    }
}
