//! Error type shared by every codec operation.

use thiserror::Error;

use crate::protocol::entry::EntryType;

/// Errors that can occur while encoding or decoding a Hanami message.
///
/// None of these are recoverable by re-reading the same bytes.  A caller that
/// receives one while reading from a stream should treat the message as
/// malformed and drop the connection: the stream cannot be resynchronised.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The destination buffer cannot hold the encoded message.
    #[error("buffer too small: need {needed} bytes, got {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Fewer bytes were supplied than a header, descriptor, or payload needs.
    #[error("truncated input: need {needed} bytes, got {available}")]
    TruncatedInput { needed: u64, available: usize },

    /// The first six bytes are not the Hanami magic tag.
    #[error("not a hanami message: magic is {found:02x?}")]
    NotHanamiProtocol { found: [u8; 6] },

    /// The header's total size does not equal the number of bytes supplied.
    #[error("size mismatch: header declares {declared} bytes, got {available}")]
    SizeMismatch { declared: u64, available: usize },

    /// The header's kind byte is not the one the decoder expects.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: u8, found: u8 },

    /// An entry's type tag differs from the field expected at that position.
    #[error("field {position}: expected {expected} entry, found tag {found}")]
    FieldTypeMismatch {
        position: usize,
        expected: EntryType,
        found: u8,
    },

    /// The payload has the right tag but cannot be interpreted (wrong scalar
    /// width, invalid UTF-8, bool other than 0/1).
    #[error("field {position}: malformed {field_type} payload: {reason}")]
    MalformedPayload {
        position: usize,
        field_type: EntryType,
        reason: String,
    },

    /// A writer or reader call does not match the message schema at the
    /// current position.
    #[error("field {position}: {attempted} does not match the message schema")]
    SchemaViolation {
        position: usize,
        attempted: EntryType,
    },

    /// Encoding or decoding finished before every schema field was processed.
    #[error("incomplete message: {processed} of {expected} fields processed")]
    IncompleteMessage { processed: usize, expected: usize },

    /// Bytes remain after the last schema field was read.
    #[error("{remaining} unread bytes after the last field")]
    TrailingBytes { remaining: usize },

    /// The writer's cursor does not land on the size announced in the header.
    #[error("size accounting error: header declares {declared} bytes, wrote {written}")]
    SizeAccounting { declared: usize, written: usize },

    /// An entry carries a tag outside the known set.
    #[error("unknown entry type tag {tag} at offset {offset}")]
    UnknownEntryType { tag: u8, offset: usize },
}
