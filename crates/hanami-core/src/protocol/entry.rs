//! Per-field entry descriptors.
//!
//! Wire format:
//! ```text
//! [type:1][reserved:7][payload_size:8][payload:N]
//! ```
//! `payload_size` is a little-endian `u64`.  For every type except the float
//! list it counts bytes; for [`EntryType::Float32List`] it counts elements and
//! the payload occupies `payload_size * 4` bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::error::ProtocolError;

/// Size of an entry descriptor in bytes.
pub const ENTRY_SIZE: usize = 16;

const SIZE_OFFSET: usize = 8;

/// Width of one float-list element on the wire.
pub const FLOAT32_WIDTH: usize = 4;

// ── Entry type tags ───────────────────────────────────────────────────────────

/// Type tag stored in the first byte of every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EntryType {
    Undefined = 0,
    Int64 = 1,
    Uint64 = 2,
    Float64 = 3,
    Bool = 4,
    String = 5,
    Bytes = 6,
    Float32List = 7,
}

impl TryFrom<u8> for EntryType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(EntryType::Undefined),
            1 => Ok(EntryType::Int64),
            2 => Ok(EntryType::Uint64),
            3 => Ok(EntryType::Float64),
            4 => Ok(EntryType::Bool),
            5 => Ok(EntryType::String),
            6 => Ok(EntryType::Bytes),
            7 => Ok(EntryType::Float32List),
            _ => Err(()),
        }
    }
}

impl EntryType {
    /// Payload width of the fixed-size scalar types, `None` for variable ones.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            EntryType::Int64 | EntryType::Uint64 | EntryType::Float64 => Some(8),
            EntryType::Bool => Some(1),
            _ => None,
        }
    }

    /// Number of payload bytes that follow a descriptor declaring
    /// `payload_size`, or `None` if that number overflows `u64`.
    pub fn payload_bytes(self, payload_size: u64) -> Option<u64> {
        match self {
            EntryType::Float32List => payload_size.checked_mul(FLOAT32_WIDTH as u64),
            _ => Some(payload_size),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryType::Undefined => "undefined",
            EntryType::Int64 => "int64",
            EntryType::Uint64 => "uint64",
            EntryType::Float64 => "float64",
            EntryType::Bool => "bool",
            EntryType::String => "string",
            EntryType::Bytes => "bytes",
            EntryType::Float32List => "float32-list",
        };
        f.write_str(name)
    }
}

// ── Entry descriptor ──────────────────────────────────────────────────────────

/// Decoded entry descriptor.
///
/// `tag` is kept raw so a mismatch can report exactly what was on the wire,
/// including tags outside [`EntryType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub tag: u8,
    pub payload_size: u64,
}

impl Entry {
    /// Creates a descriptor for a field of `field_type`.
    pub fn new(field_type: EntryType, payload_size: u64) -> Self {
        Self {
            tag: field_type as u8,
            payload_size,
        }
    }

    /// The tag as a known [`EntryType`], if it is one.
    pub fn field_type(&self) -> Option<EntryType> {
        EntryType::try_from(self.tag).ok()
    }

    /// Serializes the descriptor into its 16-byte wire form.
    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut buf = [0u8; ENTRY_SIZE];
        buf[0] = self.tag;
        buf[SIZE_OFFSET..ENTRY_SIZE].copy_from_slice(&self.payload_size.to_le_bytes());
        buf
    }

    /// Parses the descriptor starting at `offset` in `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::TruncatedInput`] if fewer than
    /// [`ENTRY_SIZE`] bytes remain at `offset`.
    pub fn parse(bytes: &[u8], offset: usize) -> Result<Self, ProtocolError> {
        let end = offset.saturating_add(ENTRY_SIZE);
        if bytes.len() < end {
            return Err(ProtocolError::TruncatedInput {
                needed: end as u64,
                available: bytes.len(),
            });
        }
        let mut size = [0u8; 8];
        size.copy_from_slice(&bytes[offset + SIZE_OFFSET..end]);
        Ok(Self {
            tag: bytes[offset],
            payload_size: u64::from_le_bytes(size),
        })
    }
}
