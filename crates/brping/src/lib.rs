//! Codec and stream parser for the Blue Robotics Ping binary protocol.
//!
//! brping turns checksum-protected device frames into typed messages and back,
//! and rebuilds frames from a serial byte stream one byte at a time.
//!
//! # Crate Structure
//!
//! - [`schema`]: Message layouts, the id-keyed registry and the built-in Ping1D table
//! - [`message`]: Message codec, streaming parser and blocking/async stream adapters

/// Re-export schema types.
pub mod schema {
    pub use brping_schema::*;
}

/// Re-export message codec and parser types.
pub mod message {
    pub use brping_message::*;
}

pub use brping_message::{Codec, CodecError, FieldValue, Message, ParseStatus, Parser};
pub use brping_schema::{ids, SchemaRegistry};
