//! Core error types for the room engine.

use thiserror::Error;

/// Errors the reducer and registry can produce. Each variant maps to one
/// of the error kinds external collaborators are expected to translate
/// into a transport-level `error` event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The command's sender is not allowed to perform this action
    /// (e.g. a non-host tried to change settings, a non-drawer tried
    /// to select a word).
    #[error("not authorised: {0}")]
    NotAuthorised(String),

    /// The command does not apply in the room's current phase.
    #[error("wrong phase: {0}")]
    WrongPhase(String),

    /// The room has already reached `maxPlayers`.
    #[error("room is full")]
    RoomFull,

    /// No room exists for the given code or id.
    #[error("room not found")]
    RoomNotFound,

    /// The room registry could not mint a unique room code after
    /// repeated collisions.
    #[error("room code space exhausted")]
    CodeExhaustion,

    /// The command's payload failed validation (length, charset, range).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The sender is not currently a member of the room.
    #[error("not a member of this room")]
    NotMember,

    /// A transient infrastructure failure (persistence, etc.) that does
    /// not reflect an invalid command and should be retried or ignored
    /// rather than surfaced as a hard rejection.
    #[error("transient failure: {0}")]
    Transient(String),
}
