//! Database layer for Doodleguess
//!
//! This crate provides connection pooling and query functions over the
//! three tables the room engine persists: `rooms`, `players`, and
//! `profiles`. The in-memory `RoomState` a room actor holds is always
//! authoritative; writes here are best-effort, used for rehydration
//! after a restart and for cross-game stat attribution.

pub mod players;
pub mod pool;
pub mod profiles;
pub mod rooms;

pub use players::PlayerRow;
pub use pool::{create_pool, DbPool};
pub use profiles::ProfileRow;
pub use rooms::RoomRow;
