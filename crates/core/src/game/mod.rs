//! Room engine: state, commands, events, and the pure reducer tying them
//! together.

pub mod commands;
pub mod events;
pub mod reducer;
pub mod rules;
pub mod scoring;
pub mod state;

pub use commands::*;
pub use events::*;
pub use reducer::{reduce, ReducerResult, TimerAction};
pub use rules::*;
pub use scoring::*;
pub use state::*;
