//! Cheap check that a buffer starts like a Hanami message.

use crate::protocol::header::{HEADER_SIZE, MAGIC};

/// Returns `true` if `bytes` could be the beginning of a Hanami message.
///
/// The buffer must hold at least a full header and its first six bytes must
/// equal [`MAGIC`] exactly.  Kind and size are not inspected, so a `true`
/// result is only a pre-filter: the full decode still validates the header.
///
/// # Examples
///
/// ```rust
/// use hanami_core::{is_hanami_protocol, ErrorLogMessage, HanamiMessage};
///
/// let bytes = ErrorLogMessage::default().encode().unwrap();
/// assert!(is_hanami_protocol(&bytes));
/// assert!(!is_hanami_protocol(b"GET / HTTP/1.1\r\n"));
/// ```
pub fn is_hanami_protocol(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_SIZE && bytes[..MAGIC.len()] == MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_header() -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..6].copy_from_slice(&MAGIC);
        buf
    }

    #[test]
    fn test_sniff_accepts_magic_prefix() {
        assert!(is_hanami_protocol(&valid_header()));
    }

    #[test]
    fn test_sniff_ignores_kind_and_size() {
        let mut buf = valid_header();
        buf[6] = 0x42;
        buf[8..].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(is_hanami_protocol(&buf));
    }

    #[test]
    fn test_sniff_rejects_buffer_shorter_than_header() {
        let buf = valid_header();
        for len in 0..HEADER_SIZE {
            assert!(!is_hanami_protocol(&buf[..len]), "length {len} must be rejected");
        }
    }

    #[test]
    fn test_sniff_rejects_any_single_changed_magic_byte() {
        for i in 0..MAGIC.len() {
            let mut buf = valid_header();
            buf[i] ^= 0x01;
            assert!(!is_hanami_protocol(&buf), "flipped magic byte {i} must be rejected");
        }
    }

    #[test]
    fn test_sniff_rejects_reversed_magic() {
        // A little-endian word compare against the packed tag would read the
        // bytes in this order; the tag on the wire is in text order.
        let mut buf = valid_header();
        buf[..6].copy_from_slice(b"imanah");
        assert!(!is_hanami_protocol(&buf));
    }
}
