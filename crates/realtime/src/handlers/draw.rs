//! Drawing events. Stroke payloads are opaque to the server; it only
//! enforces that the sender is the room's current drawer (§4.4), which
//! the reducer checks before forwarding.

use doodleguess_core::game::RoomCommand;
use doodleguess_protocol::socket::payloads::DrawStrokePayload;
use socketioxide::extract::{Data, SocketRef, State};

use crate::handlers::room::session_and_handle;
use crate::handlers::{emit_error, send_command};
use crate::state::AppState;

pub async fn handle_stroke(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<DrawStrokePayload>,
) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    let command = RoomCommand::DrawStroke { player_id: session.player_id, payload: payload.payload };
    if let Err(err) = send_command(&handle.tx, command).await {
        emit_error(&socket, &err);
    }
}

pub async fn handle_clear(socket: SocketRef, State(state): State<AppState>) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    if let Err(err) = send_command(&handle.tx, RoomCommand::DrawClear { player_id: session.player_id }).await
    {
        emit_error(&socket, &err);
    }
}

pub async fn handle_undo(socket: SocketRef, State(state): State<AppState>) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    if let Err(err) = send_command(&handle.tx, RoomCommand::DrawUndo { player_id: session.player_id }).await
    {
        emit_error(&socket, &err);
    }
}
