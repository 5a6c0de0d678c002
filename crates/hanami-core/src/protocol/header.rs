//! The fixed 16-byte envelope that opens every Hanami message.
//!
//! Wire format:
//! ```text
//! [magic:6 "hanami"][kind:1][reserved:1][size:8]
//! ```
//! `size` is a little-endian `u64` counting the whole message, header
//! included.  Fields are written at fixed offsets; the in-memory layout of
//! [`MessageHeader`] never touches the wire.

use serde::{Deserialize, Serialize};

use crate::protocol::error::ProtocolError;
use crate::protocol::sniff::is_hanami_protocol;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Six-byte ASCII tag that identifies the format.
pub const MAGIC: [u8; 6] = *b"hanami";

/// Total size of the message header in bytes.
pub const HEADER_SIZE: usize = 16;

const KIND_OFFSET: usize = 6;
const RESERVED_OFFSET: usize = 7;
const SIZE_OFFSET: usize = 8;

// ── Header ────────────────────────────────────────────────────────────────────

/// Decoded view of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Discriminator of the concrete message type that produced the payload.
    pub kind: u8,
    /// Total length of the encoded message, header included.
    pub size: u64,
}

impl MessageHeader {
    /// Creates a header for a message of `kind` spanning `size` bytes.
    pub fn new(kind: u8, size: u64) -> Self {
        Self { kind, size }
    }

    /// Serializes the header into its 16-byte wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..MAGIC.len()].copy_from_slice(&MAGIC);
        buf[KIND_OFFSET] = self.kind;
        buf[RESERVED_OFFSET] = 0x00;
        buf[SIZE_OFFSET..HEADER_SIZE].copy_from_slice(&self.size.to_le_bytes());
        buf
    }

    /// Parses the header at the start of `bytes`.
    ///
    /// Only the length and the magic tag are checked here; comparing `size`
    /// and `kind` against expectations is [`validate_header`]'s job.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::TruncatedInput`] if fewer than [`HEADER_SIZE`] bytes
    /// are available, [`ProtocolError::NotHanamiProtocol`] if the magic differs.
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ProtocolError::TruncatedInput {
                needed: HEADER_SIZE as u64,
                available: bytes.len(),
            });
        }
        if !is_hanami_protocol(bytes) {
            let mut found = [0u8; 6];
            found.copy_from_slice(&bytes[..MAGIC.len()]);
            return Err(ProtocolError::NotHanamiProtocol { found });
        }

        let mut size = [0u8; 8];
        size.copy_from_slice(&bytes[SIZE_OFFSET..HEADER_SIZE]);
        Ok(Self {
            kind: bytes[KIND_OFFSET],
            size: u64::from_le_bytes(size),
        })
    }
}

// ── Header init / read init ───────────────────────────────────────────────────

/// Writes the header for a message of `total_size` bytes at offset 0 of `buf`.
///
/// Returns [`HEADER_SIZE`], the cursor position of the first entry.
///
/// # Errors
///
/// Returns [`ProtocolError::BufferTooSmall`] if `buf` cannot hold
/// `total_size` bytes.
pub fn write_header(buf: &mut [u8], total_size: usize, kind: u8) -> Result<usize, ProtocolError> {
    let needed = total_size.max(HEADER_SIZE);
    if buf.len() < needed {
        return Err(ProtocolError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }
    let header = MessageHeader::new(kind, total_size as u64);
    buf[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    Ok(HEADER_SIZE)
}

/// Validates the header of a complete message and returns the cursor position
/// of the first entry.
///
/// `bytes` must be exactly one message: the declared size has to match its
/// length.
///
/// # Errors
///
/// - [`ProtocolError::TruncatedInput`] – shorter than a header.
/// - [`ProtocolError::NotHanamiProtocol`] – magic tag differs.
/// - [`ProtocolError::SizeMismatch`] – declared size differs from `bytes.len()`.
/// - [`ProtocolError::KindMismatch`] – kind differs from `expected_kind`.
pub fn validate_header(bytes: &[u8], expected_kind: u8) -> Result<usize, ProtocolError> {
    let header = MessageHeader::parse(bytes)?;
    if header.size != bytes.len() as u64 {
        return Err(ProtocolError::SizeMismatch {
            declared: header.size,
            available: bytes.len(),
        });
    }
    if header.kind != expected_kind {
        return Err(ProtocolError::KindMismatch {
            expected: expected_kind,
            found: header.kind,
        });
    }
    Ok(HEADER_SIZE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
