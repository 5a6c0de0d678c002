//! Cursor-based field writer and reader.
//!
//! A [`MessageWriter`] owns the cursor of one encode pass and a
//! [`MessageReader`] owns the cursor of one decode pass.  Both are bound to the
//! message's schema: every `append_*` / `read_*` call is checked against the
//! field type declared at the current position, so an encoder and a decoder
//! that drift apart fail loudly instead of silently misreading later fields.
//!
//! # Zero-copy reads (for beginners)
//!
//! [`MessageReader::read_bytes`] and [`MessageReader::read_float_list`] do not
//! copy the payload.  They hand back views that *borrow* the input slice, so
//! the borrow checker guarantees a view never outlives the buffer it points
//! into.  Call `.to_vec()` on the view if the value must live longer.

use crate::protocol::entry::{Entry, EntryType, ENTRY_SIZE, FLOAT32_WIDTH};
use crate::protocol::error::ProtocolError;
use crate::protocol::header::{validate_header, write_header};
use crate::protocol::message::FieldSpec;

// ── Writer ────────────────────────────────────────────────────────────────────

/// Appends entries to a caller-supplied buffer, one schema field at a time.
///
/// Created by [`MessageWriter::new`], which writes the header; consumed by
/// [`MessageWriter::finish`], which checks that the cursor landed exactly on
/// the size announced in that header.
#[derive(Debug)]
pub struct MessageWriter<'buf> {
    buf: &'buf mut [u8],
    declared: usize,
    cursor: usize,
    schema: &'static [FieldSpec],
    field: usize,
}

impl<'buf> MessageWriter<'buf> {
    /// Writes the header for a `total_size`-byte message of `kind` and
    /// positions the cursor on the first entry.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BufferTooSmall`] if `buf` is shorter than
    /// `total_size`.
    pub fn new(
        buf: &'buf mut [u8],
        total_size: usize,
        kind: u8,
        schema: &'static [FieldSpec],
    ) -> Result<Self, ProtocolError> {
        let cursor = write_header(buf, total_size, kind)?;
        Ok(Self {
            buf,
            declared: total_size,
            cursor,
            schema,
            field: 0,
        })
    }

    /// Current write offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Appends a `u64` entry.  Returns the bytes written (entry + payload).
    pub fn append_uint(&mut self, value: u64) -> Result<usize, ProtocolError> {
        self.append(EntryType::Uint64, &value.to_le_bytes())
    }

    /// Appends an `i64` entry.
    pub fn append_int(&mut self, value: i64) -> Result<usize, ProtocolError> {
        self.append(EntryType::Int64, &value.to_le_bytes())
    }

    /// Appends an `f64` entry.
    pub fn append_float(&mut self, value: f64) -> Result<usize, ProtocolError> {
        self.append(EntryType::Float64, &value.to_bits().to_le_bytes())
    }

    /// Appends a bool entry (one payload byte, 0 or 1).
    pub fn append_bool(&mut self, value: bool) -> Result<usize, ProtocolError> {
        self.append(EntryType::Bool, &[u8::from(value)])
    }

    /// Appends a string entry.  The payload is the raw UTF-8 bytes, without a
    /// terminator; an empty string writes only the descriptor.
    pub fn append_string(&mut self, value: &str) -> Result<usize, ProtocolError> {
        self.append(EntryType::String, value.as_bytes())
    }

    /// Appends an opaque byte entry.
    pub fn append_bytes(&mut self, value: &[u8]) -> Result<usize, ProtocolError> {
        self.append(EntryType::Bytes, value)
    }

    /// Appends a float list.  The descriptor records the element count, the
    /// payload is `values.len() * 4` little-endian bytes.
    pub fn append_float_list(&mut self, values: &[f32]) -> Result<usize, ProtocolError> {
        let before = self.cursor;
        let payload_len = values.len().saturating_mul(FLOAT32_WIDTH);
        let start = self.begin_entry(EntryType::Float32List, values.len() as u64, payload_len)?;
        for (chunk, value) in self.buf[start..start + payload_len]
            .chunks_exact_mut(FLOAT32_WIDTH)
            .zip(values)
        {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        Ok(self.cursor - before)
    }

    /// Checks that every schema field was written and that the cursor sits on
    /// the declared total size.  Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::IncompleteMessage`] if fields are missing,
    /// [`ProtocolError::SizeAccounting`] if the size computed before encoding
    /// does not match what was written.
    pub fn finish(self) -> Result<usize, ProtocolError> {
        if self.field != self.schema.len() {
            return Err(ProtocolError::IncompleteMessage {
                processed: self.field,
                expected: self.schema.len(),
            });
        }
        if self.cursor != self.declared {
            return Err(ProtocolError::SizeAccounting {
                declared: self.declared,
                written: self.cursor,
            });
        }
        Ok(self.cursor)
    }

    fn append(&mut self, field_type: EntryType, payload: &[u8]) -> Result<usize, ProtocolError> {
        let before = self.cursor;
        let start = self.begin_entry(field_type, payload.len() as u64, payload.len())?;
        self.buf[start..start + payload.len()].copy_from_slice(payload);
        Ok(self.cursor - before)
    }

    /// Writes the descriptor and reserves `payload_len` bytes after it.
    /// Returns the offset where the payload starts.
    fn begin_entry(
        &mut self,
        field_type: EntryType,
        payload_size: u64,
        payload_len: usize,
    ) -> Result<usize, ProtocolError> {
        match self.schema.get(self.field) {
            Some(spec) if spec.field_type == field_type => {}
            _ => {
                return Err(ProtocolError::SchemaViolation {
                    position: self.field,
                    attempted: field_type,
                })
            }
        }

        let needed = self
            .cursor
            .saturating_add(ENTRY_SIZE)
            .saturating_add(payload_len);
        if needed > self.buf.len() {
            return Err(ProtocolError::BufferTooSmall {
                needed,
                available: self.buf.len(),
            });
        }

        let entry = Entry::new(field_type, payload_size);
        self.buf[self.cursor..self.cursor + ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
        let start = self.cursor + ENTRY_SIZE;
        self.cursor = needed;
        self.field += 1;
        Ok(start)
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Consumes entries from one complete encoded message, one schema field at a
/// time.
#[derive(Debug)]
pub struct MessageReader<'a> {
    bytes: &'a [u8],
    cursor: usize,
    schema: &'static [FieldSpec],
    field: usize,
}

impl<'a> MessageReader<'a> {
    /// Validates the header of `bytes` against `expected_kind` and positions
    /// the cursor on the first entry.
    ///
    /// # Errors
    ///
    /// Any error from [`validate_header`].
    pub fn new(
        bytes: &'a [u8],
        expected_kind: u8,
        schema: &'static [FieldSpec],
    ) -> Result<Self, ProtocolError> {
        let cursor = validate_header(bytes, expected_kind)?;
        Ok(Self {
            bytes,
            cursor,
            schema,
            field: 0,
        })
    }

    /// Current read offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// Reads a `u64` entry.
    pub fn read_uint(&mut self) -> Result<u64, ProtocolError> {
        self.read_fixed::<8>(EntryType::Uint64).map(u64::from_le_bytes)
    }

    /// Reads an `i64` entry.
    pub fn read_int(&mut self) -> Result<i64, ProtocolError> {
        self.read_fixed::<8>(EntryType::Int64).map(i64::from_le_bytes)
    }

    /// Reads an `f64` entry.
    pub fn read_float(&mut self) -> Result<f64, ProtocolError> {
        self.read_fixed::<8>(EntryType::Float64)
            .map(|raw| f64::from_bits(u64::from_le_bytes(raw)))
    }

    /// Reads a bool entry.  Payload bytes other than 0 and 1 are rejected.
    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        let position = self.field;
        match self.read_fixed::<1>(EntryType::Bool)? {
            [0] => Ok(false),
            [1] => Ok(true),
            [other] => Err(ProtocolError::MalformedPayload {
                position,
                field_type: EntryType::Bool,
                reason: format!("invalid bool byte 0x{other:02X}"),
            }),
        }
    }

    /// Reads a string entry into an owned `String`.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::MalformedPayload`] if the payload is not UTF-8.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let position = self.field;
        let payload = self.next_payload(EntryType::String)?;
        std::str::from_utf8(payload)
            .map(str::to_owned)
            .map_err(|e| ProtocolError::MalformedPayload {
                position,
                field_type: EntryType::String,
                reason: format!("invalid UTF-8: {e}"),
            })
    }

    /// Reads an opaque byte entry as a view into the input buffer.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], ProtocolError> {
        self.next_payload(EntryType::Bytes)
    }

    /// Reads a float list as a view into the input buffer.
    pub fn read_float_list(&mut self) -> Result<FloatListView<'a>, ProtocolError> {
        self.next_payload(EntryType::Float32List)
            .map(|bytes| FloatListView { bytes })
    }

    /// Checks that every schema field was read and no bytes are left over.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::IncompleteMessage`] or [`ProtocolError::TrailingBytes`].
    pub fn finish(self) -> Result<(), ProtocolError> {
        if self.field != self.schema.len() {
            return Err(ProtocolError::IncompleteMessage {
                processed: self.field,
                expected: self.schema.len(),
            });
        }
        if self.cursor != self.bytes.len() {
            return Err(ProtocolError::TrailingBytes {
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn read_fixed<const N: usize>(&mut self, field_type: EntryType) -> Result<[u8; N], ProtocolError> {
        let position = self.field;
        let payload = self.next_payload(field_type)?;
        if payload.len() != N {
            return Err(ProtocolError::MalformedPayload {
                position,
                field_type,
                reason: format!("expected {N} payload bytes, got {}", payload.len()),
            });
        }
        let mut raw = [0u8; N];
        raw.copy_from_slice(payload);
        Ok(raw)
    }

    /// Reads the descriptor at the cursor, checks it against `expected` and
    /// the schema, and returns the payload slice.
    fn next_payload(&mut self, expected: EntryType) -> Result<&'a [u8], ProtocolError> {
        let position = self.field;
        match self.schema.get(position) {
            Some(spec) if spec.field_type == expected => {}
            _ => {
                return Err(ProtocolError::SchemaViolation {
                    position,
                    attempted: expected,
                })
            }
        }

        let entry = Entry::parse(self.bytes, self.cursor)?;
        if entry.tag != expected as u8 {
            return Err(ProtocolError::FieldTypeMismatch {
                position,
                expected,
                found: entry.tag,
            });
        }

        let start = self.cursor + ENTRY_SIZE;
        let available = self.bytes.len() - start;
        let payload_len = expected
            .payload_bytes(entry.payload_size)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n <= available);
        let Some(len) = payload_len else {
            return Err(ProtocolError::TruncatedInput {
                needed: expected
                    .payload_bytes(entry.payload_size)
                    .map_or(u64::MAX, |n| n.saturating_add(start as u64)),
                available: self.bytes.len(),
            });
        };

        self.cursor = start + len;
        self.field += 1;
        Ok(&self.bytes[start..start + len])
    }
}

// ── Float list view ───────────────────────────────────────────────────────────

/// Borrowed view of a decoded float list.
///
/// The wire bytes are little-endian and carry no alignment guarantee, so the
/// view decodes each element on access instead of reinterpreting memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatListView<'a> {
    bytes: &'a [u8],
}

impl<'a> FloatListView<'a> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bytes.len() / FLOAT32_WIDTH
    }

    /// `true` if the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Element at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<f32> {
        let start = index.checked_mul(FLOAT32_WIDTH)?;
        let end = start.checked_add(FLOAT32_WIDTH)?;
        let chunk = self.bytes.get(start..end)?;
        Some(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    }

    /// Iterates the elements in wire order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + 'a {
        self.bytes
            .chunks_exact(FLOAT32_WIDTH)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
    }

    /// The raw payload bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Copies the elements out so they can outlive the input buffer.
    pub fn to_vec(&self) -> Vec<f32> {
        self.iter().collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
