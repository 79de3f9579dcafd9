//! Checksum-protected message codec and byte-stream parser for the Ping protocol.
//!
//! Every frame on the wire is:
//! - A 2-byte magic number ("BR") for stream synchronization
//! - An 8-byte header: payload length, message id, source and destination device ids
//! - A schema-defined little-endian payload, optionally ending in a variable-length field
//! - A 2-byte checksum: the 16-bit truncated sum of all preceding bytes
//!
//! [`Codec`] maps [`Message`]s to and from whole frames. [`Parser`] rebuilds frames
//! from a byte stream one byte at a time and hands complete frames to the codec.

pub mod checksum;
pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod header;
pub mod message;
pub mod parser;
pub mod reader;
pub mod value;
pub mod writer;

pub use brping_schema::{ids, FieldSpec, FieldType, SchemaEntry, SchemaRegistry};
pub use checksum::checksum;
pub use codec::Codec;
pub use error::{CodecError, Result};
#[cfg(feature = "async")]
pub use framed::PingCodec;
pub use header::{MessageHeader, CHECKSUM_LENGTH, HEADER_LENGTH, MAGIC};
pub use message::Message;
pub use parser::{ParseState, ParseStatus, Parser, ParserConfig};
pub use reader::MessageReader;
pub use value::FieldValue;
pub use writer::MessageWriter;
