//! # hanami-core
//!
//! Binary message codec shared by every Hanami component that exchanges
//! records over a byte stream or socket.
//!
//! The crate has no dependencies on sockets, files, or async runtimes: it
//! turns typed messages into byte buffers and back, and nothing else.
//!
//! # Architecture overview (for beginners)
//!
//! Every message on the wire is a fixed 16-byte *header* followed by a list of
//! *entries*.  Each entry is a 16-byte descriptor (a type tag plus a size)
//! immediately followed by the raw field value.  There are no field names on
//! the wire: a message type decides the order of its fields once, in its
//! *schema*, and both the encoder and the decoder walk that schema.
//!
//! - **`protocol`** – The wire format: header, entry descriptors, the
//!   cursor-based [`MessageWriter`] / [`MessageReader`], the protocol sniff,
//!   the [`HanamiMessage`] trait, and the concrete [`ErrorLogMessage`].
//!
//! - **`reporting`** – The [`ErrorSink`] seam through which surrounding code
//!   reports failures (including malformed messages).
//!
//! - **`identity`** – UUID helper used as the default reporter identity.

pub mod identity;
pub mod protocol;
pub mod reporting;

// Re-export the most-used types at the crate root so callers can write
// `hanami_core::ErrorLogMessage` instead of the full module path.
pub use identity::generate_uuid;
pub use protocol::codec::{FloatListView, MessageReader, MessageWriter};
pub use protocol::entry::{EntryType, ENTRY_SIZE};
pub use protocol::error::ProtocolError;
pub use protocol::header::{MessageHeader, HEADER_SIZE, MAGIC};
pub use protocol::message::{FieldSpec, HanamiMessage, MessageKind};
pub use protocol::messages::ErrorLogMessage;
pub use protocol::sniff::is_hanami_protocol;
pub use reporting::{ErrorReport, ErrorSink, TracingErrorSink};
