//! Wire-level definitions for Doodleguess's Socket.IO transport
//!
//! This crate contains shared event-name constants and inbound payload
//! DTOs. Outbound events are the `doodleguess_core::game::events::RoomEvent`
//! the reducer already produces; this crate only needs to know how to
//! turn a raw client payload into a typed request.

pub mod socket;
