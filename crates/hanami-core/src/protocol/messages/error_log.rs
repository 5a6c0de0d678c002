//! Error-log report exchanged between components.
//!
//! Five string fields, in this order: reporter identity, originating
//! component, error text, context, auxiliary values.  `context` and `values`
//! are free-form text; reporters conventionally put JSON in them.

use serde::{Deserialize, Serialize};

use crate::identity::generate_uuid;
use crate::protocol::codec::{MessageReader, MessageWriter};
use crate::protocol::entry::EntryType;
use crate::protocol::error::ProtocolError;
use crate::protocol::message::{FieldSpec, HanamiMessage, MessageKind};

static ERROR_LOG_SCHEMA: [FieldSpec; 5] = [
    FieldSpec::new("user_uuid", EntryType::String),
    FieldSpec::new("component", EntryType::String),
    FieldSpec::new("error_msg", EntryType::String),
    FieldSpec::new("context", EntryType::String),
    FieldSpec::new("values", EntryType::String),
];

/// An error report as carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLogMessage {
    /// Identity of the reporter, usually a UUID.
    pub user_uuid: String,
    /// Name of the component the error originated in.
    pub component: String,
    /// Human-readable error text.
    pub error_msg: String,
    /// Context the error happened in.
    pub context: String,
    /// Auxiliary values.
    pub values: String,
}

impl ErrorLogMessage {
    /// Creates a report with a freshly generated reporter identity and empty
    /// context and values.
    pub fn new(component: impl Into<String>, error_msg: impl Into<String>) -> Self {
        Self {
            user_uuid: generate_uuid(),
            component: component.into(),
            error_msg: error_msg.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_values(mut self, values: impl Into<String>) -> Self {
        self.values = values.into();
        self
    }
}

impl<'a> HanamiMessage<'a> for ErrorLogMessage {
    const KIND: u8 = MessageKind::ErrorLog as u8;
    const SCHEMA: &'static [FieldSpec] = &ERROR_LOG_SCHEMA;

    fn payload_size(&self) -> usize {
        self.user_uuid.len()
            + self.component.len()
            + self.error_msg.len()
            + self.context.len()
            + self.values.len()
    }

    fn write_fields(&self, writer: &mut MessageWriter<'_>) -> Result<(), ProtocolError> {
        writer.append_string(&self.user_uuid)?;
        writer.append_string(&self.component)?;
        writer.append_string(&self.error_msg)?;
        writer.append_string(&self.context)?;
        writer.append_string(&self.values)?;
        Ok(())
    }

    fn read_fields(reader: &mut MessageReader<'a>) -> Result<Self, ProtocolError> {
        let user_uuid = reader.read_string()?;
        let component = reader.read_string()?;
        let error_msg = reader.read_string()?;
        let context = reader.read_string()?;
        let values = reader.read_string()?;
        Ok(Self {
            user_uuid,
            component,
            error_msg,
            context,
            values,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
