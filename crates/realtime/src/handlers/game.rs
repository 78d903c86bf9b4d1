//! Game lifecycle handlers: starting a game, picking a word, and
//! starting a fresh game once one has ended.

use doodleguess_core::game::RoomCommand;
use doodleguess_protocol::socket::payloads::SelectWordPayload;
use socketioxide::extract::{Data, SocketRef, State};

use crate::handlers::room::session_and_handle;
use crate::handlers::{emit_error, send_command};
use crate::state::AppState;

pub async fn handle_start(socket: SocketRef, State(state): State<AppState>) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    if let Err(err) = send_command(&handle.tx, RoomCommand::StartGame { player_id: session.player_id }).await
    {
        emit_error(&socket, &err);
    }
}

pub async fn handle_select_word(
    socket: SocketRef,
    State(state): State<AppState>,
    Data(payload): Data<SelectWordPayload>,
) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    let command = RoomCommand::SelectWord { player_id: session.player_id, word: payload.word };
    if let Err(err) = send_command(&handle.tx, command).await {
        emit_error(&socket, &err);
    }
}

pub async fn handle_play_again(socket: SocketRef, State(state): State<AppState>) {
    let Some((session, handle)) = session_and_handle(&socket, &state) else { return };
    if let Err(err) = send_command(&handle.tx, RoomCommand::PlayAgain { player_id: session.player_id }).await
    {
        emit_error(&socket, &err);
    }
}
