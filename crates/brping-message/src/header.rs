use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CodecError, Result};

/// Header: magic (2) + payload length (2) + message id (2) + src (1) + dst (1) = 8 bytes.
pub const HEADER_LENGTH: usize = 8;

/// Trailing checksum: 2 bytes, little-endian.
pub const CHECKSUM_LENGTH: usize = 2;

/// Magic bytes: "BR" (0x42 0x52).
pub const MAGIC: [u8; 2] = *b"BR";

/// The fixed fields following the magic bytes of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Byte count of the payload only.
    pub payload_length: u16,
    pub message_id: u16,
    pub src_device_id: u8,
    pub dst_device_id: u8,
}

impl MessageHeader {
    /// Read a header from the start of `src`.
    pub fn parse(src: &[u8]) -> Result<Self> {
        if src.len() < HEADER_LENGTH {
            return Err(CodecError::TruncatedBuffer {
                needed: HEADER_LENGTH,
                available: src.len(),
            });
        }
        if src[0..2] != MAGIC {
            return Err(CodecError::InvalidMagic);
        }

        let mut fields = &src[2..HEADER_LENGTH];
        Ok(Self {
            payload_length: fields.get_u16_le(),
            message_id: fields.get_u16_le(),
            src_device_id: fields.get_u8(),
            dst_device_id: fields.get_u8(),
        })
    }

    /// Append the magic and header fields to `dst`.
    pub fn put(&self, dst: &mut BytesMut) {
        dst.put_slice(&MAGIC);
        dst.put_u16_le(self.payload_length);
        dst.put_u16_le(self.message_id);
        dst.put_u8(self.src_device_id);
        dst.put_u8(self.dst_device_id);
    }

    /// Offset of the checksum within the frame.
    pub fn checksum_offset(&self) -> usize {
        HEADER_LENGTH + usize::from(self.payload_length)
    }

    /// Total wire size of the frame this header announces.
    pub fn frame_length(&self) -> usize {
        self.checksum_offset() + CHECKSUM_LENGTH
    }
}
