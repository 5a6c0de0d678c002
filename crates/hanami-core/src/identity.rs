//! Reporter identities.

use uuid::Uuid;

/// Length of a hyphenated textual UUID.
pub const UUID_STR_LEN: usize = 36;

/// Generates a random (v4) UUID as lowercase hyphenated text.
pub fn generate_uuid() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Returns `true` if `text` is a hyphenated UUID.
pub fn is_uuid(text: &str) -> bool {
    text.len() == UUID_STR_LEN && Uuid::parse_str(text).is_ok()
}
