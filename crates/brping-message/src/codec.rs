use std::sync::Arc;

use brping_schema::{SchemaEntry, SchemaRegistry};
use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::checksum;
use crate::error::{CodecError, Result};
use crate::header::{MessageHeader, HEADER_LENGTH};
use crate::message::Message;
use crate::value::FieldValue;

/// Schema-driven encoder/decoder for whole frames.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<SchemaRegistry>,
}

impl Codec {
    pub fn new(registry: impl Into<Arc<SchemaRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    /// Codec over the built-in Ping1D table.
    pub fn ping1d() -> Self {
        Self::new(SchemaRegistry::ping1d())
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// A zero-valued message of a registered type.
    pub fn message(&self, type_id: u16) -> Result<Message> {
        let schema = self
            .registry
            .lookup(type_id)
            .ok_or(CodecError::UnknownSchema(type_id))?;
        Ok(Message::new(schema))
    }

    /// Encode a message into a new buffer.
    pub fn encode(&self, message: &Message) -> Result<Bytes> {
        self.encode_as(message, None)
    }

    /// Encode a message, optionally claiming `request_id` as the header message id.
    pub fn encode_as(&self, message: &Message, request_id: Option<u16>) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode_into(message, request_id, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Encode a frame for the message and append it to `dst`.
    ///
    /// Wire format:
    /// ```text
    /// ┌───────────┬────────────┬────────────┬─────┬─────┬────────────────┬──────────┐
    /// │ Magic     │ Length     │ Message ID │ Src │ Dst │ Payload        │ Checksum │
    /// │ 0x42 0x52 │ (2B LE)    │ (2B LE)    │ 1B  │ 1B  │ (Length bytes) │ (2B LE)  │
    /// │ "BR"      │            │            │     │     │                │          │
    /// └───────────┴────────────┴────────────┴─────┴─────┴────────────────┴──────────┘
    /// ```
    ///
    /// Payload length and checksum are recomputed from the current field values.
    pub fn encode_into(
        &self,
        message: &Message,
        request_id: Option<u16>,
        dst: &mut BytesMut,
    ) -> Result<()> {
        let schema = self
            .registry
            .lookup(message.message_id())
            .ok_or(CodecError::UnknownSchema(message.message_id()))?;
        if schema.fields() != message.schema().fields() {
            return Err(CodecError::SchemaMismatch {
                message_id: message.message_id(),
            });
        }

        let payload_length = message.encoded_payload_length();
        let payload_length =
            u16::try_from(payload_length).map_err(|_| CodecError::PayloadTooLarge {
                size: payload_length,
                max: usize::from(u16::MAX),
            })?;

        let header = MessageHeader {
            payload_length,
            message_id: request_id.unwrap_or(message.message_id()),
            ..*message.header()
        };

        let start = dst.len();
        dst.reserve(header.frame_length());
        message.put_body(&header, dst);
        let sum = checksum(&dst[start..]);
        dst.put_u16_le(sum);
        Ok(())
    }

    /// An empty-payload request frame asking a device to send `requested_id`.
    ///
    /// Only the requested id must be registered.
    pub fn request(&self, requested_id: u16) -> Result<Bytes> {
        if !self.registry.contains(requested_id) {
            return Err(CodecError::UnknownSchema(requested_id));
        }

        let header = MessageHeader {
            payload_length: 0,
            message_id: requested_id,
            ..MessageHeader::default()
        };
        let mut buf = BytesMut::with_capacity(header.frame_length());
        header.put(&mut buf);
        let sum = checksum(&buf);
        buf.put_u16_le(sum);
        Ok(buf.freeze())
    }

    /// Decode one frame from the start of `buf`.
    ///
    /// The returned checksum is the value found on the wire; call
    /// [`Message::verify_checksum`] (or use [`Codec::decode_verified`]) to check it.
    pub fn decode(&self, buf: &[u8]) -> Result<Message> {
        let header = MessageHeader::parse(buf)?;
        let schema = self
            .registry
            .lookup(header.message_id)
            .ok_or(CodecError::UnknownMessageType { header })?;

        let needed = header.frame_length();
        if buf.len() < needed {
            return Err(CodecError::TruncatedBuffer {
                needed,
                available: buf.len(),
            });
        }

        let checksum_offset = header.checksum_offset();
        let values = if header.payload_length == 0 {
            zero_values(&schema)
        } else {
            unpack_payload(&schema, &buf[HEADER_LENGTH..checksum_offset])?
        };

        let checksum = u16::from_le_bytes([buf[checksum_offset], buf[checksum_offset + 1]]);

        Ok(Message::from_parts(header, schema, values, checksum))
    }

    /// Decode one frame and reject it if the checksum does not match.
    pub fn decode_verified(&self, buf: &[u8]) -> Result<Message> {
        let message = self.decode(buf)?;
        let actual = message.calculate_checksum();
        if actual != message.checksum() {
            return Err(CodecError::ChecksumMismatch {
                message_id: message.message_id(),
                expected: message.checksum(),
                actual,
            });
        }
        Ok(message)
    }
}

fn zero_values(schema: &SchemaEntry) -> Vec<FieldValue> {
    schema
        .fields()
        .iter()
        .map(|field| FieldValue::zero(field.ty))
        .collect()
}

fn unpack_payload(schema: &SchemaEntry, payload: &[u8]) -> Result<Vec<FieldValue>> {
    let static_length = schema.static_payload_length();
    let fits = if schema.is_variable() {
        payload.len() >= static_length
    } else {
        payload.len() == static_length
    };
    if !fits {
        return Err(CodecError::PayloadUnpack {
            message_id: schema.type_id(),
            reason: format!(
                "payload is {} bytes, layout {} needs {}{static_length}",
                payload.len(),
                schema.name(),
                if schema.is_variable() { "at least " } else { "" },
            ),
        });
    }

    let mut src = payload;
    Ok(schema
        .fields()
        .iter()
        .map(|field| FieldValue::get(field.ty, &mut src))
        .collect())
}
