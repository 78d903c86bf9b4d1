//! Room lifecycle handlers: create, join, leave, reconnect, settings,
//! and host-only kicks.

use doodleguess_core::game::{CreateRoomSettings, RoomCommand};
use doodleguess_core::CoreError;
use doodleguess_protocol::socket::payloads::{
    JoinRoomPayload, KickPlayerPayload, ReconnectPayload, UpdateSettingsPayload,
};
use socketioxide::extract::{Data, SocketRef, State};

use crate::handlers::{emit_error, send_command};
use crate::state::{AppState, SocketSession};

pub async fn handle_create(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<doodleguess_protocol::socket::payloads::CreateRoomPayload>,
) {
    let settings = match (CreateRoomSettings {
        draw_time: payload.draw_time,
        rounds: payload.rounds,
        max_players: payload.max_players,
        theme: payload.theme,
        is_private: payload.is_private,
    }
    .into_room_settings())
    {
        Ok(settings) => settings,
        Err(err) => {
            emit_error(&socket, &err);
            return;
        }
    };

    match state.registry().create_room(payload.name, payload.avatar, settings).await {
        Ok((handle, player_id, session_id)) => {
            join_sockets(&socket, &handle.code, &player_id);
            state.remember_session(
                &socket.id.to_string(),
                SocketSession { room_id: handle.room_id.clone(), code: handle.code.clone(), player_id: player_id.clone() },
            );
            socket
                .emit(
                    "room:created",
                    &serde_json::json!({
                        "success": true,
                        "roomCode": handle.code,
                        "roomId": handle.room_id,
                        "playerId": player_id,
                        "sessionId": session_id,
                    }),
                )
                .ok();
        }
        Err(err) => emit_error(&socket, &err),
    }
}

pub async fn handle_join(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<JoinRoomPayload>,
) {
    let Some(handle) = state.registry().lookup_by_code(&payload.code).await else {
        emit_error(&socket, &CoreError::RoomNotFound);
        return;
    };

    let (player_id, restored_score) = match &payload.player_id {
        Some(existing) => {
            let restored = doodleguess_db::players::get_player(state.db(), existing)
                .await
                .ok()
                .flatten()
                .map(|row| row.score.max(0) as u32);
            (existing.clone(), restored)
        }
        None => (doodleguess_core::id::generate_player_id(), None),
    };
    let session_id = doodleguess_core::session::generate_prefixed_transport_token();

    let command = RoomCommand::Join {
        player_id: player_id.clone(),
        session_id: session_id.clone(),
        name: payload.name,
        avatar: payload.avatar,
        restored_score,
    };

    match send_command(&handle.tx, command).await {
        Ok(room_state) => {
            join_sockets(&socket, &handle.code, &player_id);
            state.remember_session(
                &socket.id.to_string(),
                SocketSession { room_id: handle.room_id.clone(), code: handle.code.clone(), player_id: player_id.clone() },
            );
            let messages: Vec<_> = room_state.chat_history.iter().collect();
            socket
                .emit(
                    "room:joined",
                    &serde_json::json!({
                        "success": true,
                        "roomCode": handle.code,
                        "roomId": handle.room_id,
                        "playerId": player_id,
                        "sessionId": session_id,
                        "messages": messages,
                    }),
                )
                .ok();
        }
        Err(err) => emit_error(&socket, &err),
    }
}

pub async fn handle_leave(socket: SocketRef, State(state): State<AppState>) {
    let socket_id = socket.id.to_string();
    let Some(session) = state.forget_session(&socket_id) else { return };
    let Some(handle) = state.registry().get_by_id(&session.room_id) else { return };

    let _ = send_command(&handle.tx, RoomCommand::Leave { player_id: session.player_id }).await;
    socket.leave(session.code).ok();
}

pub async fn handle_reconnect(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<ReconnectPayload>,
) {
    let Some(handle) = state.registry().get_by_id(&payload.room_id) else {
        emit_error(&socket, &CoreError::RoomNotFound);
        return;
    };
    let new_session_id = doodleguess_core::session::generate_prefixed_transport_token();

    let command = RoomCommand::Reconnect {
        player_id: payload.player_id.clone(),
        new_session_id: new_session_id.clone(),
    };
    match send_command(&handle.tx, command).await {
        Ok(_) => {
            join_sockets(&socket, &handle.code, &payload.player_id);
            state.remember_session(
                &socket.id.to_string(),
                SocketSession {
                    room_id: handle.room_id.clone(),
                    code: handle.code.clone(),
                    player_id: payload.player_id.clone(),
                },
            );
            socket
                .emit("room:reconnected", &serde_json::json!({ "sessionId": new_session_id }))
                .ok();
        }
        Err(err) => emit_error(&socket, &err),
    }
}

pub async fn handle_update_settings(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<UpdateSettingsPayload>,
) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    let command = RoomCommand::UpdateSettings {
        player_id: session.player_id,
        draw_time: payload.draw_time,
        max_rounds: payload.max_rounds,
    };
    if let Err(err) = send_command(&handle.tx, command).await {
        emit_error(&socket, &err);
    }
}

pub async fn handle_kick(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<KickPlayerPayload>,
) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    let command = RoomCommand::KickPlayer { player_id: session.player_id, target_id: payload.player_id };
    if let Err(err) = send_command(&handle.tx, command).await {
        emit_error(&socket, &err);
    }
}

fn join_sockets(socket: &SocketRef, code: &str, player_id: &str) {
    socket.join(code.to_string()).ok();
    socket.join(player_id.to_string()).ok();
}

/// The session + room handle for commands that need the sender's
/// `player_id` but aren't worth a dedicated payload field, since it's
/// determined by the socket connection, not the client.
pub(crate) fn session_and_handle(
    socket: &SocketRef,
    state: &AppState,
) -> Option<(SocketSession, crate::registry::RoomHandle)> {
    let session = state.session_for(&socket.id.to_string())?;
    let handle = state.registry().get_by_id(&session.room_id)?;
    Some((session, handle))
}
