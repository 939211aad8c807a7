use base64::Engine;
use rand::{RngCore, rngs::OsRng};

/// Generates a cryptographically secure, URL-safe random identifier of
/// exactly `length` characters.
///
/// Uniqueness is statistical: the entropy space is vastly larger than any
/// realistic message volume, and callers accept the (astronomically small)
/// overwrite risk rather than checking for collisions.
#[must_use]
pub fn generate_id(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    OsRng.fill_bytes(&mut bytes);
    let mut encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
    encoded.truncate(length);
    encoded
}
