use std::fmt;
use std::sync::Arc;

use brping_schema::SchemaEntry;
use bytes::BytesMut;

use crate::checksum::checksum;
use crate::error::{CodecError, Result};
use crate::header::MessageHeader;
use crate::value::FieldValue;

/// One message instance: header, payload values in layout order, and checksum.
///
/// A message is either built from a layout with zero-valued fields (see
/// [`Message::new`] and [`crate::Codec::message`]) or produced by
/// [`crate::Codec::decode`]. Encoding never mutates it; payload length and
/// checksum are recomputed on every encode.
///
/// A frame decoded with an empty payload (a request) re-encodes with an empty
/// payload until one of its fields is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: MessageHeader,
    schema: Arc<SchemaEntry>,
    values: Vec<FieldValue>,
    checksum: u16,
    empty_payload: bool,
}

impl Message {
    /// A zero-valued message for `schema`, ready to be populated and encoded.
    pub fn new(schema: Arc<SchemaEntry>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|field| FieldValue::zero(field.ty))
            .collect();
        let header = MessageHeader {
            // Bounded by `SchemaEntry::new`.
            payload_length: u16::try_from(schema.static_payload_length()).unwrap_or(u16::MAX),
            message_id: schema.type_id(),
            src_device_id: 0,
            dst_device_id: 0,
        };

        Self {
            header,
            schema,
            values,
            checksum: 0,
            empty_payload: false,
        }
    }

    pub(crate) fn from_parts(
        header: MessageHeader,
        schema: Arc<SchemaEntry>,
        values: Vec<FieldValue>,
        checksum: u16,
    ) -> Self {
        Self {
            empty_payload: header.payload_length == 0,
            header,
            schema,
            values,
            checksum,
        }
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn message_id(&self) -> u16 {
        self.header.message_id
    }

    /// Message name from the layout, for diagnostics.
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Arc<SchemaEntry> {
        &self.schema
    }

    /// Payload length of the current field values, as carried in the header.
    pub fn payload_length(&self) -> u16 {
        self.header.payload_length
    }

    /// Payload length `encode` writes for the current field values.
    pub fn encoded_payload_length(&self) -> usize {
        if self.empty_payload {
            0
        } else {
            self.schema.payload_length_for(self.variable_len())
        }
    }

    pub fn src_device_id(&self) -> u8 {
        self.header.src_device_id
    }

    pub fn dst_device_id(&self) -> u8 {
        self.header.dst_device_id
    }

    pub fn set_src_device_id(&mut self, id: u8) {
        self.header.src_device_id = id;
    }

    pub fn set_dst_device_id(&mut self, id: u8) {
        self.header.dst_device_id = id;
    }

    /// Checksum as found on the wire (zero for a message that was never decoded).
    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema
            .field_index(name)
            .and_then(|index| self.values.get(index))
    }

    /// Replace a field value; its type must match the layout.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let index = self
            .schema
            .field_index(name)
            .ok_or_else(|| CodecError::UnknownField {
                message: self.schema.name().to_string(),
                field: name.to_string(),
            })?;

        let expected = self.schema.fields()[index].ty;
        if value.field_type() != expected {
            return Err(CodecError::FieldTypeMismatch {
                field: name.to_string(),
                expected,
                actual: value.field_type(),
            });
        }

        self.values[index] = value;
        self.empty_payload = false;
        // Oversized payloads are rejected by the encoder.
        self.header.payload_length =
            u16::try_from(self.encoded_payload_length()).unwrap_or(u16::MAX);
        Ok(())
    }

    /// Field names and values in layout order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name.as_str())
            .zip(self.values.iter())
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Length of the variable trailing field, zero for fixed layouts.
    pub fn variable_len(&self) -> usize {
        match (self.schema.is_variable(), self.values.last()) {
            (true, Some(value)) => value.encoded_len(),
            _ => 0,
        }
    }

    /// Checksum of the message's current byte representation, i.e. the bytes
    /// `encode` would emit before the checksum.
    pub fn calculate_checksum(&self) -> u16 {
        let header = MessageHeader {
            payload_length: u16::try_from(self.encoded_payload_length()).unwrap_or(u16::MAX),
            ..self.header
        };
        let mut buf = BytesMut::with_capacity(header.checksum_offset());
        self.put_body(&header, &mut buf);
        checksum(&buf)
    }

    /// True when the stored checksum matches the current byte representation.
    pub fn verify_checksum(&self) -> bool {
        self.checksum == self.calculate_checksum()
    }

    /// Append header and payload (everything the checksum covers).
    ///
    /// An empty-payload header carries no payload bytes regardless of the layout.
    pub(crate) fn put_body(&self, header: &MessageHeader, dst: &mut BytesMut) {
        header.put(dst);
        if header.payload_length == 0 {
            return;
        }
        for value in &self.values {
            value.put(dst);
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) src={} dst={} len={}",
            self.name(),
            self.message_id(),
            self.header.src_device_id,
            self.header.dst_device_id,
            self.header.payload_length
        )?;
        for (name, value) in self.fields() {
            write!(f, " {name}={value}")?;
        }
        write!(f, " checksum=0x{:04x}", self.checksum)
    }
}
