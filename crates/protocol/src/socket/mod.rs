pub mod events;
pub mod payloads;
