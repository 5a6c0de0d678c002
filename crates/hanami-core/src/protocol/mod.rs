//! Wire format, cursor codec, and message types.

pub mod codec;
pub mod entry;
pub mod error;
pub mod header;
pub mod inspect;
pub mod message;
pub mod messages;
pub mod sniff;

pub use codec::{FloatListView, MessageReader, MessageWriter};
pub use error::ProtocolError;
pub use header::{validate_header, write_header, MessageHeader, HEADER_SIZE};
pub use inspect::{inspect, EntryInfo, MessageLayout};
pub use message::{FieldSpec, HanamiMessage, MessageKind};
pub use sniff::is_hanami_protocol;
