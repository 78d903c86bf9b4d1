//! Chat and guess submission. The reducer decides whether a line is a
//! guess, a close guess, or plain chat (§4.4); the transport layer
//! never inspects the text itself.

use doodleguess_core::game::RoomCommand;
use doodleguess_protocol::socket::payloads::ChatMessagePayload;
use socketioxide::extract::{Data, SocketRef, State};

use crate::handlers::room::session_and_handle;
use crate::handlers::{emit_error, send_command};
use crate::state::AppState;

pub async fn handle_send(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<ChatMessagePayload>,
) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    let command = RoomCommand::ChatOrGuess { player_id: session.player_id, text: payload.message };
    if let Err(err) = send_command(&handle.tx, command).await {
        emit_error(&socket, &err);
    }
}
