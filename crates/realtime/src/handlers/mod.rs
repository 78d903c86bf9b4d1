//! Socket.IO event handlers

pub mod chat;
pub mod draw;
pub mod game;
pub mod room;

use doodleguess_core::game::{RoomCommand, RoomState};
use doodleguess_core::CoreError;
use doodleguess_protocol::socket::events::client;
use socketioxide::extract::{SocketRef, State};
use socketioxide::socket::DisconnectReason;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::actors::room_actor::Envelope;
use crate::state::AppState;

/// Main connection handler, called when a socket connects.
pub async fn on_connect(socket: SocketRef) {
    info!(socket_id = %socket.id, "socket connected");

    socket.on(client::ROOM_CREATE, room::handle_create);
    socket.on(client::ROOM_JOIN, room::handle_join);
    socket.on(client::ROOM_LEAVE, room::handle_leave);
    socket.on(client::ROOM_RECONNECT, room::handle_reconnect);
    socket.on(client::ROOM_SETTINGS, room::handle_update_settings);
    socket.on(client::PLAYER_KICK, room::handle_kick);

    socket.on(client::GAME_START, game::handle_start);
    socket.on(client::GAME_SELECT_WORD, game::handle_select_word);
    socket.on(client::GAME_PLAY_AGAIN, game::handle_play_again);

    socket.on(client::CHAT_MESSAGE, chat::handle_send);

    socket.on(client::DRAW_STROKE, draw::handle_stroke);
    socket.on(client::DRAW_CLEAR, draw::handle_clear);
    socket.on(client::DRAW_UNDO, draw::handle_undo);

    socket.on_disconnect(handle_disconnect);
}

async fn handle_disconnect(socket: SocketRef, State(state): State<AppState>, reason: DisconnectReason) {
    info!(socket_id = %socket.id, ?reason, "socket disconnected");

    let Some(session) = state.forget_session(&socket.id.to_string()) else { return };
    let Some(handle) = state.registry().get_by_id(&session.room_id) else { return };

    let envelope = Envelope::fire_and_forget(RoomCommand::Disconnect { player_id: session.player_id });
    let _ = handle.tx.send(envelope).await;
}

/// Send a command to a room's actor and wait for its verdict, folding a
/// dead mailbox (the actor already tore the room down) into a
/// `CoreError::RoomNotFound`.
pub(crate) async fn send_command(
    tx: &mpsc::Sender<Envelope>,
    command: RoomCommand,
) -> Result<RoomState, CoreError> {
    let (respond, rx) = oneshot::channel();
    if tx.send(Envelope::new(command, respond)).await.is_err() {
        return Err(CoreError::RoomNotFound);
    }
    let reply = rx.await.map_err(|_| CoreError::Transient("room actor unavailable".into()))?;
    reply.result.map(|_| reply.state)
}

/// Emit a typed `error` event mirroring the failed command's `CoreError`.
pub(crate) fn emit_error(socket: &SocketRef, err: &CoreError) {
    let code = match err {
        CoreError::NotAuthorised(_) => "NOT_AUTHORISED",
        CoreError::WrongPhase(_) => "WRONG_PHASE",
        CoreError::RoomFull => "ROOM_FULL",
        CoreError::RoomNotFound => "ROOM_NOT_FOUND",
        CoreError::CodeExhaustion => "CODE_EXHAUSTION",
        CoreError::InvalidInput(_) => "INVALID_INPUT",
        CoreError::NotMember => "NOT_MEMBER",
        CoreError::Transient(_) => "TRANSIENT",
    };
    socket
        .emit(
            doodleguess_protocol::socket::events::server::ERROR,
            &serde_json::json!({ "code": code, "message": err.to_string() }),
        )
        .ok();
}
