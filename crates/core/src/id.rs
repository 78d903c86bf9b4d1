//! Prefixed nanoid generation for entity identifiers, plus the
//! unambiguous room-code alphabet players read aloud to each other.
//!
//! All entities use prefixed nanoid identifiers instead of UUIDs:
//! - Human-readable prefixes identify entity type at a glance
//! - URL-safe characters (no encoding needed)
//! - ~71 bits entropy for entity ids

use once_cell::sync::Lazy;
use rand::Rng;
use rand::rngs::OsRng;
use std::sync::Mutex;

/// Thread-safe RNG for ID generation.
static RNG: Lazy<Mutex<OsRng>> = Lazy::new(|| Mutex::new(OsRng));

/// Alphabet for nanoid generation (URL-safe).
const ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '_', 'a',
    'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't',
    'u', 'v', 'w', 'x', 'y', 'z',
];

/// Room codes are read aloud and typed on a phone keyboard, so the
/// alphabet drops visually ambiguous characters (0/O, 1/I/L).
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const ROOM_CODE_LEN: usize = 6;

/// Entity ID length (excluding prefix). Provides ~71 bits entropy.
const ENTITY_ID_LEN: usize = 12;

/// Generate a random string of the specified length using the nanoid alphabet.
fn generate_id(len: usize) -> String {
    let mut rng = RNG.lock().expect("RNG lock poisoned");
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..ALPHABET.len());
            ALPHABET[idx]
        })
        .collect()
}

/// Entity prefixes for different types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPrefix {
    Room,
    Player,
    Chat,
}

impl EntityPrefix {
    /// Returns the string prefix for this entity type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Room => "room_",
            EntityPrefix::Player => "ply_",
            EntityPrefix::Chat => "msg_",
        }
    }
}

/// Generate a prefixed ID for a room entity.
pub fn generate_room_id() -> String {
    format!("{}{}", EntityPrefix::Room.as_str(), generate_id(ENTITY_ID_LEN))
}

/// Generate a prefixed ID for a player entity.
pub fn generate_player_id() -> String {
    format!("{}{}", EntityPrefix::Player.as_str(), generate_id(ENTITY_ID_LEN))
}

/// Generate a prefixed ID for a chat/guess message entity.
pub fn generate_chat_id() -> String {
    format!("{}{}", EntityPrefix::Chat.as_str(), generate_id(ENTITY_ID_LEN))
}

/// Generate a single 6-character room code candidate. Collision retry
/// against the live registry and the persistence store is the caller's
/// responsibility (see `registry::RoomRegistry::create_room`).
pub fn generate_room_code() -> String {
    let mut rng = RNG.lock().expect("RNG lock poisoned");
    (0..ROOM_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Parse the prefix from an ID string.
/// Returns `None` if the ID doesn't have a recognized prefix.
pub fn parse_prefix(id: &str) -> Option<EntityPrefix> {
    if id.starts_with("room_") {
        Some(EntityPrefix::Room)
    } else if id.starts_with("ply_") {
        Some(EntityPrefix::Player)
    } else if id.starts_with("msg_") {
        Some(EntityPrefix::Chat)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_format() {
        let id = generate_room_id();
        assert!(id.starts_with("room_"));
        assert_eq!(id.len(), 17);
    }

    #[test]
    fn test_player_id_format() {
        let id = generate_player_id();
        assert!(id.starts_with("ply_"));
        assert_eq!(id.len(), 16);
    }

    #[test]
    fn test_chat_id_format() {
        let id = generate_chat_id();
        assert!(id.starts_with("msg_"));
        assert_eq!(id.len(), 16);
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: Vec<String> = (0..100).map(|_| generate_player_id()).collect();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_room_code_shape() {
        let code = generate_room_code();
        assert_eq!(code.len(), ROOM_CODE_LEN);
        for c in code.chars() {
            assert!(ROOM_CODE_ALPHABET.contains(&(c as u8)), "unexpected char {c}");
        }
    }

    #[test]
    fn test_room_code_excludes_ambiguous_chars() {
        for _ in 0..200 {
            let code = generate_room_code();
            for ch in ['0', 'O', '1', 'I', 'L'] {
                assert!(!code.contains(ch));
            }
        }
    }

    #[test]
    fn test_parse_prefix() {
        assert_eq!(parse_prefix("room_abcdefghijkl"), Some(EntityPrefix::Room));
        assert_eq!(parse_prefix("ply_abcdefghijkl"), Some(EntityPrefix::Player));
        assert_eq!(parse_prefix("msg_abcdefghijkl"), Some(EntityPrefix::Chat));
        assert_eq!(parse_prefix("unknown_id"), None);
    }
}
