//! Schema-free walk over the entries of an encoded message.
//!
//! Decoding needs the message type; inspection does not.  It only relies on
//! the descriptors, so it can lay out any Hanami message for debugging or
//! cross-check a type's schema against what its encoder actually wrote.

use serde::Serialize;

use crate::protocol::entry::{Entry, EntryType, ENTRY_SIZE};
use crate::protocol::error::ProtocolError;
use crate::protocol::header::{MessageHeader, HEADER_SIZE};

/// Position and shape of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    /// Offset of the descriptor from the start of the message.
    pub offset: usize,
    pub field_type: EntryType,
    /// Declared payload size (element count for float lists).
    pub payload_size: u64,
}

/// Header plus the entry sequence of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageLayout {
    pub header: MessageHeader,
    pub entries: Vec<EntryInfo>,
}

impl MessageLayout {
    /// Entry types in wire order.
    pub fn field_types(&self) -> Vec<EntryType> {
        self.entries.iter().map(|e| e.field_type).collect()
    }
}

/// Lays out the header and every entry of one complete message.
///
/// # Errors
///
/// Header errors as in [`MessageHeader::parse`], [`ProtocolError::SizeMismatch`]
/// if the declared size differs from `bytes.len()`,
/// [`ProtocolError::UnknownEntryType`] for tags outside the known set (or
/// `undefined`), and [`ProtocolError::TruncatedInput`] if a payload runs past
/// the end.
pub fn inspect(bytes: &[u8]) -> Result<MessageLayout, ProtocolError> {
    let header = MessageHeader::parse(bytes)?;
    if header.size != bytes.len() as u64 {
        return Err(ProtocolError::SizeMismatch {
            declared: header.size,
            available: bytes.len(),
        });
    }

    let mut entries = Vec::new();
    let mut cursor = HEADER_SIZE;
    while cursor < bytes.len() {
        let entry = Entry::parse(bytes, cursor)?;
        let field_type = entry
            .field_type()
            .filter(|t| *t != EntryType::Undefined)
            .ok_or(ProtocolError::UnknownEntryType {
                tag: entry.tag,
                offset: cursor,
            })?;

        let start = cursor + ENTRY_SIZE;
        let end = field_type
            .payload_bytes(entry.payload_size)
            .and_then(|n| n.checked_add(start as u64))
            .filter(|end| *end <= bytes.len() as u64)
            .ok_or(ProtocolError::TruncatedInput {
                needed: field_type
                    .payload_bytes(entry.payload_size)
                    .map_or(u64::MAX, |n| n.saturating_add(start as u64)),
                available: bytes.len(),
            })?;

        entries.push(EntryInfo {
            offset: cursor,
            field_type,
            payload_size: entry.payload_size,
        });
        cursor = end as usize;
    }

    Ok(MessageLayout { header, entries })
}
