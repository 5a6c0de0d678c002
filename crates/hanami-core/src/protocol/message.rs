//! The contract every concrete message type implements.
//!
//! # Schemas (for beginners)
//!
//! Hanami messages carry no field names on the wire.  A message type instead
//! declares its [`SCHEMA`](HanamiMessage::SCHEMA): a static, ordered list of
//! `(name, type)` pairs.  The writer and reader both walk that list, so
//! `write_fields` and `read_fields` can only succeed if they touch the fields
//! in exactly the declared order.  Changing the order of a message's fields
//! is a wire-breaking change and needs a new kind.

use serde::{Deserialize, Serialize};

use crate::protocol::codec::{MessageReader, MessageWriter};
use crate::protocol::entry::{EntryType, ENTRY_SIZE};
use crate::protocol::error::ProtocolError;
use crate::protocol::header::HEADER_SIZE;

/// One position in a message schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: EntryType,
}

impl FieldSpec {
    pub const fn new(name: &'static str, field_type: EntryType) -> Self {
        Self { name, field_type }
    }
}

// ── Message kinds ─────────────────────────────────────────────────────────────

/// Kind bytes assigned to the message types shipped with this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    ErrorLog = 0xFF,
}

impl TryFrom<u8> for MessageKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0xFF => Ok(MessageKind::ErrorLog),
            _ => Err(()),
        }
    }
}

// ── Message trait ─────────────────────────────────────────────────────────────

/// A concrete message type with a fixed kind and field order.
///
/// Implementors supply the schema and the three per-field hooks; `encode`,
/// `encode_into`, and `decode` are provided.  The lifetime `'a` is the
/// lifetime of the input buffer during decode, which lets messages with
/// zero-copy fields borrow from it.  Messages that own all their fields
/// implement the trait for every `'a`.
///
/// # Examples
///
/// ```rust
/// use hanami_core::{ErrorLogMessage, HanamiMessage};
///
/// let msg = ErrorLogMessage {
///     user_uuid: "a1b2".to_string(),
///     component: "core".to_string(),
///     error_msg: "oops".to_string(),
///     context: "{}".to_string(),
///     values: "[]".to_string(),
/// };
/// let bytes = msg.encode().unwrap();
/// assert_eq!(bytes.len(), 16 + 5 * 16 + 16);
/// assert_eq!(ErrorLogMessage::decode(&bytes).unwrap(), msg);
/// ```
pub trait HanamiMessage<'a>: Sized {
    /// Header kind byte identifying this message type.
    const KIND: u8;

    /// Ordered field list shared by the encoder and the decoder.
    const SCHEMA: &'static [FieldSpec];

    /// Sum of the payload sizes of all fields in bytes (descriptors excluded).
    fn payload_size(&self) -> usize;

    /// Writes every field, in schema order.
    fn write_fields(&self, writer: &mut MessageWriter<'_>) -> Result<(), ProtocolError>;

    /// Reads every field, in schema order.
    fn read_fields(reader: &mut MessageReader<'a>) -> Result<Self, ProtocolError>;

    /// Exact size of the encoded message.
    fn encoded_size(&self) -> usize {
        HEADER_SIZE + Self::SCHEMA.len() * ENTRY_SIZE + self.payload_size()
    }

    /// Encodes into a caller-supplied buffer and returns the bytes written.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::BufferTooSmall`] if `buf` is shorter than
    /// [`encoded_size`](Self::encoded_size); the schema and size-accounting
    /// errors indicate a bug in the message implementation.
    fn encode_into(&self, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut writer = MessageWriter::new(buf, self.encoded_size(), Self::KIND, Self::SCHEMA)?;
        self.write_fields(&mut writer)?;
        writer.finish()
    }

    /// Encodes into a freshly allocated buffer of exactly the encoded size.
    fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = vec![0u8; self.encoded_size()];
        let written = self.encode_into(&mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }

    /// Decodes one complete message.  `bytes` must be exactly the message.
    ///
    /// # Errors
    ///
    /// Any header, entry, or schema error.  Nothing is returned on failure;
    /// there is no partially decoded message.
    fn decode(bytes: &'a [u8]) -> Result<Self, ProtocolError> {
        let mut reader = MessageReader::new(bytes, Self::KIND, Self::SCHEMA)?;
        let message = Self::read_fields(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }
}
