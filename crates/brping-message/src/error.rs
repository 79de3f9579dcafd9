use brping_schema::FieldType;

use crate::header::MessageHeader;

/// Errors that can occur while encoding, decoding or streaming messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Encoding was requested for a message id with no registered layout.
    #[error("no schema registered for message id {0}")]
    UnknownSchema(u16),

    /// A decoded header names a message id with no registered layout.
    ///
    /// The header is still available for diagnostics; the payload is not decoded.
    #[error("unknown message type {}", .header.message_id)]
    UnknownMessageType { header: MessageHeader },

    /// Fewer bytes are available than the header declares.
    #[error("truncated buffer ({available} bytes, need {needed})")]
    TruncatedBuffer { needed: usize, available: usize },

    /// The payload bytes do not fit the message layout.
    #[error("cannot unpack payload of message {message_id}: {reason}")]
    PayloadUnpack { message_id: u16, reason: String },

    /// The frame is well formed but its checksum does not match its contents.
    #[error("checksum mismatch on message {message_id} (wire 0x{expected:04x}, computed 0x{actual:04x})")]
    ChecksumMismatch {
        message_id: u16,
        expected: u16,
        actual: u16,
    },

    /// The buffer does not start with the frame magic.
    #[error("invalid frame magic (expected 0x4252 \"BR\")")]
    InvalidMagic,

    /// The message layout has no field with this name.
    #[error("message {message} has no field {field}")]
    UnknownField { message: String, field: String },

    /// A field value does not have the type its layout declares.
    #[error("field {field} expects {expected}, got {actual}")]
    FieldTypeMismatch {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },

    /// The message was built against a layout that differs from the registered one.
    #[error("message {message_id} does not match its registered layout")]
    SchemaMismatch { message_id: u16 },

    /// A textual value could not be parsed as the requested field type.
    #[error("invalid {field_type} value: {input:?}")]
    InvalidValue { field_type: FieldType, input: String },

    /// The encoded payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before another complete message was received.
    #[error("connection closed (no complete message)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, CodecError>;
