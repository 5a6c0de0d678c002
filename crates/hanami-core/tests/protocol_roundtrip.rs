//! Integration tests for the hanami-core codec.
//!
//! These tests go through the public API only: a message type defined here,
//! outside the crate, exercises every field primitive the same way a
//! downstream component would.

use hanami_core::{
    is_hanami_protocol,
    protocol::{inspect, MessageHeader},
    EntryType, ErrorLogMessage, FieldSpec, FloatListView, HanamiMessage, MessageReader,
    MessageWriter, ProtocolError, ENTRY_SIZE, HEADER_SIZE,
};

// ── A message with every field type ───────────────────────────────────────────

static SAMPLE_FRAME_SCHEMA: [FieldSpec; 7] = [
    FieldSpec::new("sequence", EntryType::Uint64),
    FieldSpec::new("drift", EntryType::Int64),
    FieldSpec::new("load", EntryType::Float64),
    FieldSpec::new("healthy", EntryType::Bool),
    FieldSpec::new("source", EntryType::String),
    FieldSpec::new("raw", EntryType::Bytes),
    FieldSpec::new("samples", EntryType::Float32List),
];

/// Sensor frame whose `raw` and `samples` borrow from the decoded buffer.
#[derive(Debug, Clone, PartialEq)]
struct SampleFrame<'a> {
    sequence: u64,
    drift: i64,
    load: f64,
    healthy: bool,
    source: String,
    raw: &'a [u8],
    samples: FloatListView<'a>,
}

/// Owned counterpart that can outlive the buffer it was decoded from.
struct OwnedSampleFrame {
    sequence: u64,
    drift: i64,
    load: f64,
    healthy: bool,
    source: String,
    raw: Vec<u8>,
    samples: Vec<f32>,
}

impl<'a> HanamiMessage<'a> for OwnedSampleFrame {
    const KIND: u8 = 0x21;
    const SCHEMA: &'static [FieldSpec] = &SAMPLE_FRAME_SCHEMA;

    fn payload_size(&self) -> usize {
        8 + 8 + 8 + 1 + self.source.len() + self.raw.len() + self.samples.len() * 4
    }

    fn write_fields(&self, writer: &mut MessageWriter<'_>) -> Result<(), ProtocolError> {
        writer.append_uint(self.sequence)?;
        writer.append_int(self.drift)?;
        writer.append_float(self.load)?;
        writer.append_bool(self.healthy)?;
        writer.append_string(&self.source)?;
        writer.append_bytes(&self.raw)?;
        writer.append_float_list(&self.samples)?;
        Ok(())
    }

    fn read_fields(reader: &mut MessageReader<'a>) -> Result<Self, ProtocolError> {
        // Same order as `SampleFrame`, copying the borrowed fields out.
        let frame = SampleFrame::read_fields(reader)?;
        Ok(Self {
            sequence: frame.sequence,
            drift: frame.drift,
            load: frame.load,
            healthy: frame.healthy,
            source: frame.source,
            raw: frame.raw.to_vec(),
            samples: frame.samples.to_vec(),
        })
    }
}

impl<'a> HanamiMessage<'a> for SampleFrame<'a> {
    const KIND: u8 = 0x21;
    const SCHEMA: &'static [FieldSpec] = &SAMPLE_FRAME_SCHEMA;

    fn payload_size(&self) -> usize {
        8 + 8 + 8 + 1 + self.source.len() + self.raw.len() + self.samples.as_bytes().len()
    }

    fn write_fields(&self, writer: &mut MessageWriter<'_>) -> Result<(), ProtocolError> {
        writer.append_uint(self.sequence)?;
        writer.append_int(self.drift)?;
        writer.append_float(self.load)?;
        writer.append_bool(self.healthy)?;
        writer.append_string(&self.source)?;
        writer.append_bytes(self.raw)?;
        writer.append_float_list(&self.samples.to_vec())?;
        Ok(())
    }

    fn read_fields(reader: &mut MessageReader<'a>) -> Result<Self, ProtocolError> {
        let sequence = reader.read_uint()?;
        let drift = reader.read_int()?;
        let load = reader.read_float()?;
        let healthy = reader.read_bool()?;
        let source = reader.read_string()?;
        let raw = reader.read_bytes()?;
        let samples = reader.read_float_list()?;
        Ok(Self {
            sequence,
            drift,
            load,
            healthy,
            source,
            raw,
            samples,
        })
    }
}

fn owned_frame() -> OwnedSampleFrame {
    OwnedSampleFrame {
        sequence: 1_700_000_000,
        drift: -3,
        load: 0.875,
        healthy: false,
        source: "sensor-7".to_string(),
        raw: vec![0x00, 0xFF, 0x10],
        samples: vec![0.0, -2.5, 1e-3, f32::MIN_POSITIVE],
    }
}

fn error_log() -> ErrorLogMessage {
    ErrorLogMessage {
        user_uuid: "a1b2".to_string(),
        component: "core".to_string(),
        error_msg: "oops".to_string(),
        context: "{}".to_string(),
        values: "[]".to_string(),
    }
}

/// Byte offsets of every entry descriptor in `bytes`.
fn descriptor_offsets(bytes: &[u8]) -> Vec<usize> {
    inspect(bytes)
        .expect("inspect must succeed")
        .entries
        .iter()
        .map(|e| e.offset)
        .collect()
}

// ── Round-trip ────────────────────────────────────────────────────────────────

#[test]
fn test_every_primitive_round_trips_through_public_api() {
    // Arrange
    let original = owned_frame();

    // Act
    let bytes = original.encode().expect("encode must succeed");
    let decoded = SampleFrame::decode(&bytes).expect("decode must succeed");

    // Assert
    assert_eq!(decoded.sequence, original.sequence);
    assert_eq!(decoded.drift, original.drift);
    assert_eq!(decoded.load, original.load);
    assert_eq!(decoded.healthy, original.healthy);
    assert_eq!(decoded.source, original.source);
    assert_eq!(decoded.raw, original.raw.as_slice());
    assert_eq!(decoded.samples.to_vec(), original.samples);
}

#[test]
fn test_owned_decode_outlives_input_buffer() {
    let decoded = {
        let bytes = owned_frame().encode().expect("encode");
        OwnedSampleFrame::decode(&bytes).expect("decode")
    };
    assert_eq!(decoded.raw, owned_frame().raw);
    assert_eq!(decoded.samples, owned_frame().samples);
}

#[test]
fn test_borrowed_message_re_encodes_to_identical_bytes() {
    let bytes = owned_frame().encode().expect("encode");
    let decoded = SampleFrame::decode(&bytes).expect("decode");
    assert_eq!(decoded.encode().expect("re-encode"), bytes);
}

#[test]
fn test_empty_variable_fields_round_trip_as_empty() {
    let original = OwnedSampleFrame {
        source: String::new(),
        raw: Vec::new(),
        samples: Vec::new(),
        ..owned_frame()
    };

    let bytes = original.encode().expect("encode");
    let decoded = SampleFrame::decode(&bytes).expect("decode");

    assert_eq!(bytes.len(), HEADER_SIZE + 7 * ENTRY_SIZE + 8 + 8 + 8 + 1);
    assert!(decoded.source.is_empty());
    assert!(decoded.raw.is_empty());
    assert!(decoded.samples.is_empty());
}

#[test]
fn test_error_log_round_trip() {
    let bytes = error_log().encode().expect("encode");
    assert_eq!(ErrorLogMessage::decode(&bytes).expect("decode"), error_log());
}

// ── Header-size invariant ─────────────────────────────────────────────────────

#[test]
fn test_header_size_equals_encoded_length() {
    for bytes in [
        owned_frame().encode().expect("encode frame"),
        error_log().encode().expect("encode log"),
        ErrorLogMessage::default().encode().expect("encode empty log"),
    ] {
        let header = MessageHeader::parse(&bytes).expect("header");
        assert_eq!(header.size, bytes.len() as u64);
    }
}

#[test]
fn test_concrete_error_log_scenario_size() {
    let bytes = error_log().encode().expect("encode");
    assert_eq!(bytes.len(), 16 + 5 * 16 + 4 + 4 + 4 + 2 + 2);
}

// ── Sniff precision ───────────────────────────────────────────────────────────

#[test]
fn test_sniff_accepts_every_encoded_message() {
    assert!(is_hanami_protocol(&owned_frame().encode().expect("encode")));
    assert!(is_hanami_protocol(&error_log().encode().expect("encode")));
}

#[test]
fn test_sniff_rejects_short_prefix_and_single_byte_changes() {
    let bytes = error_log().encode().expect("encode");

    assert!(!is_hanami_protocol(&bytes[..HEADER_SIZE - 1]));
    for i in 0..6 {
        let mut changed = bytes.clone();
        changed[i] = changed[i].wrapping_add(1);
        assert!(!is_hanami_protocol(&changed), "byte {i} changed must be rejected");
    }
}

// ── Truncation rejection ──────────────────────────────────────────────────────

#[test]
fn test_every_strict_prefix_is_rejected() {
    let bytes = error_log().encode().expect("encode");

    for len in 0..bytes.len() {
        let result = ErrorLogMessage::decode(&bytes[..len]);
        assert!(
            matches!(
                result,
                Err(ProtocolError::TruncatedInput { .. }) | Err(ProtocolError::SizeMismatch { .. })
            ),
            "prefix of {len} bytes must fail with truncation or size mismatch, got {result:?}"
        );
    }
}

#[test]
fn test_truncated_message_with_patched_header_is_rejected() {
    // Drop the last payload byte and rewrite the header size so the envelope
    // is consistent; the last entry's payload is then short.
    let bytes = error_log().encode().expect("encode");
    let mut truncated = bytes[..bytes.len() - 1].to_vec();
    let len = truncated.len() as u64;
    truncated[8..16].copy_from_slice(&len.to_le_bytes());

    assert!(matches!(
        ErrorLogMessage::decode(&truncated),
        Err(ProtocolError::TruncatedInput { .. })
    ));
}

// ── Type-drift detection ──────────────────────────────────────────────────────

#[test]
fn test_corrupted_tag_fails_at_that_field() {
    let bytes = owned_frame().encode().expect("encode");

    for (position, offset) in descriptor_offsets(&bytes).into_iter().enumerate() {
        let mut corrupted = bytes.clone();
        let original_tag = corrupted[offset];
        corrupted[offset] = if original_tag == EntryType::String as u8 {
            EntryType::Bytes as u8
        } else {
            EntryType::String as u8
        };

        match SampleFrame::decode(&corrupted) {
            Err(ProtocolError::FieldTypeMismatch {
                position: failed_at,
                found,
                ..
            }) => {
                assert_eq!(failed_at, position, "failure must point at the corrupted field");
                assert_eq!(found, corrupted[offset]);
            }
            other => panic!("corrupting field {position} must fail there, got {other:?}"),
        }
    }
}

#[test]
fn test_decoding_with_another_message_schema_fails() {
    // Same kind byte forced onto an error log: the first entry is a string,
    // the frame schema expects an unsigned integer.
    let mut bytes = error_log().encode().expect("encode");
    bytes[6] = 0x21;

    assert!(matches!(
        SampleFrame::decode(&bytes),
        Err(ProtocolError::FieldTypeMismatch { position: 0, .. })
    ));
}

// ── Schema agreement ──────────────────────────────────────────────────────────

#[test]
fn test_schema_agrees_with_written_entry_sequence() {
    let cases: [(Vec<u8>, &[FieldSpec]); 2] = [
        (
            owned_frame().encode().expect("encode frame"),
            <SampleFrame<'static> as HanamiMessage<'static>>::SCHEMA,
        ),
        (
            error_log().encode().expect("encode log"),
            <ErrorLogMessage as HanamiMessage<'static>>::SCHEMA,
        ),
    ];

    for (bytes, schema) in cases {
        let written = inspect(&bytes).expect("inspect").field_types();
        let declared: Vec<EntryType> = schema.iter().map(|f| f.field_type).collect();
        assert_eq!(written, declared);
    }
}

#[test]
fn test_float_list_entry_declares_element_count() {
    let bytes = owned_frame().encode().expect("encode");
    let layout = inspect(&bytes).expect("inspect");
    let samples = layout.entries.last().expect("entries");
    assert_eq!(samples.field_type, EntryType::Float32List);
    assert_eq!(samples.payload_size, 4);
}
