pub mod room_actor;
