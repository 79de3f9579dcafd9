//! Message layout registry for the Ping binary protocol.
//!
//! Every message type is identified by a 16-bit id and described by a
//! [`SchemaEntry`]: an ordered list of little-endian primitive fields, of which
//! only the last may be a variable-length byte sequence.
//!
//! The registry is built once at startup, either from the built-in Ping1D
//! table or from a JSON table, and is immutable afterwards.

pub mod config;
pub mod entry;
pub mod error;
pub mod field;
pub mod ids;
mod ping1d;
pub mod registry;

pub use config::RegistryConfig;
pub use entry::SchemaEntry;
pub use error::{Result, SchemaError};
pub use field::{FieldSpec, FieldType};
pub use registry::SchemaRegistry;
