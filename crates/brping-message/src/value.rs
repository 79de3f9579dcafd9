use std::fmt;

use brping_schema::FieldType;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CodecError, Result};

/// A decoded payload field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    Bytes(Bytes),
}

impl FieldValue {
    /// The zero value of a field type; the empty sequence for `Bytes`.
    pub fn zero(ty: FieldType) -> Self {
        match ty {
            FieldType::U8 => FieldValue::U8(0),
            FieldType::I8 => FieldValue::I8(0),
            FieldType::U16 => FieldValue::U16(0),
            FieldType::I16 => FieldValue::I16(0),
            FieldType::U32 => FieldValue::U32(0),
            FieldType::I32 => FieldValue::I32(0),
            FieldType::Bytes => FieldValue::Bytes(Bytes::new()),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::U8(_) => FieldType::U8,
            FieldValue::I8(_) => FieldType::I8,
            FieldValue::U16(_) => FieldType::U16,
            FieldValue::I16(_) => FieldType::I16,
            FieldValue::U32(_) => FieldType::U32,
            FieldValue::I32(_) => FieldType::I32,
            FieldValue::Bytes(_) => FieldType::Bytes,
        }
    }

    /// Integer value widened to `i64`, or `None` for byte sequences.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::U8(v) => Some(i64::from(v)),
            FieldValue::I8(v) => Some(i64::from(v)),
            FieldValue::U16(v) => Some(i64::from(v)),
            FieldValue::I16(v) => Some(i64::from(v)),
            FieldValue::U32(v) => Some(i64::from(v)),
            FieldValue::I32(v) => Some(i64::from(v)),
            FieldValue::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(bytes) => Some(bytes.as_ref()),
            _ => None,
        }
    }

    /// Number of bytes this value occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match self {
            FieldValue::Bytes(bytes) => bytes.len(),
            other => other.field_type().width().unwrap_or(0),
        }
    }

    /// Append the little-endian encoding of this value.
    pub fn put(&self, dst: &mut BytesMut) {
        match self {
            FieldValue::U8(v) => dst.put_u8(*v),
            FieldValue::I8(v) => dst.put_i8(*v),
            FieldValue::U16(v) => dst.put_u16_le(*v),
            FieldValue::I16(v) => dst.put_i16_le(*v),
            FieldValue::U32(v) => dst.put_u32_le(*v),
            FieldValue::I32(v) => dst.put_i32_le(*v),
            FieldValue::Bytes(bytes) => dst.put_slice(bytes),
        }
    }

    /// Read one value of type `ty` from `src`.
    ///
    /// The caller guarantees `src` holds at least the field width; a `Bytes`
    /// field takes everything that remains.
    pub(crate) fn get(ty: FieldType, src: &mut &[u8]) -> Self {
        match ty {
            FieldType::U8 => FieldValue::U8(src.get_u8()),
            FieldType::I8 => FieldValue::I8(src.get_i8()),
            FieldType::U16 => FieldValue::U16(src.get_u16_le()),
            FieldType::I16 => FieldValue::I16(src.get_i16_le()),
            FieldType::U32 => FieldValue::U32(src.get_u32_le()),
            FieldType::I32 => FieldValue::I32(src.get_i32_le()),
            FieldType::Bytes => FieldValue::Bytes(src.copy_to_bytes(src.remaining())),
        }
    }

    /// Parse a textual value as `ty`.
    ///
    /// Integers accept decimal or `0x`-prefixed hex. Byte sequences accept
    /// `hex:`-prefixed hex digits, otherwise the UTF-8 bytes of the input.
    pub fn parse(ty: FieldType, input: &str) -> Result<Self> {
        let invalid = || CodecError::InvalidValue {
            field_type: ty,
            input: input.to_string(),
        };

        if ty == FieldType::Bytes {
            return match input.strip_prefix("hex:") {
                Some(digits) => hex::decode(digits)
                    .map(|bytes| FieldValue::Bytes(Bytes::from(bytes)))
                    .map_err(|_| invalid()),
                None => Ok(FieldValue::Bytes(Bytes::copy_from_slice(input.as_bytes()))),
            };
        }

        let trimmed = input.trim();
        let (negative, magnitude) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let magnitude = match magnitude
            .strip_prefix("0x")
            .or_else(|| magnitude.strip_prefix("0X"))
        {
            Some(digits) => i64::from_str_radix(digits, 16),
            None => magnitude.parse::<i64>(),
        }
        .map_err(|_| invalid())?;
        let value = if negative { -magnitude } else { magnitude };

        let parsed = match ty {
            FieldType::U8 => u8::try_from(value).ok().map(FieldValue::U8),
            FieldType::I8 => i8::try_from(value).ok().map(FieldValue::I8),
            FieldType::U16 => u16::try_from(value).ok().map(FieldValue::U16),
            FieldType::I16 => i16::try_from(value).ok().map(FieldValue::I16),
            FieldType::U32 => u32::try_from(value).ok().map(FieldValue::U32),
            FieldType::I32 => i32::try_from(value).ok().map(FieldValue::I32),
            FieldType::Bytes => None,
        };
        parsed.ok_or_else(invalid)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::U8(v) => write!(f, "{v}"),
            FieldValue::I8(v) => write!(f, "{v}"),
            FieldValue::U16(v) => write!(f, "{v}"),
            FieldValue::I16(v) => write!(f, "{v}"),
            FieldValue::U32(v) => write!(f, "{v}"),
            FieldValue::I32(v) => write!(f, "{v}"),
            FieldValue::Bytes(bytes) => match printable_text(bytes) {
                Some(text) => write!(f, "{text:?}"),
                None => write!(f, "hex:{}", hex::encode(bytes)),
            },
        }
    }
}

/// Text view of a byte sequence if it is printable ASCII, ignoring trailing NULs.
pub fn printable_text(bytes: &[u8]) -> Option<&str> {
    let end = bytes
        .iter()
        .rposition(|&byte| byte != 0)
        .map_or(0, |last| last + 1);
    let text = &bytes[..end];
    if text.is_empty() || !text.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        return None;
    }
    std::str::from_utf8(text).ok()
}

macro_rules! impl_from_int {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(value)
            }
        })*
    };
}

impl_from_int!(u8 => U8, i8 => I8, u16 => U16, i16 => I16, u32 => U32, i32 => I32);

impl From<Bytes> for FieldValue {
    fn from(value: Bytes) -> Self {
        FieldValue::Bytes(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(Bytes::from(value))
    }
}

impl From<&[u8]> for FieldValue {
    fn from(value: &[u8]) -> Self {
        FieldValue::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Bytes(Bytes::copy_from_slice(value.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_match_type() {
        for ty in [
            FieldType::U8,
            FieldType::I8,
            FieldType::U16,
            FieldType::I16,
            FieldType::U32,
            FieldType::I32,
            FieldType::Bytes,
        ] {
            let zero = FieldValue::zero(ty);
            assert_eq!(zero.field_type(), ty);
            assert_eq!(zero.encoded_len(), ty.width().unwrap_or(0));
        }
    }

    #[test]
    fn put_and_get_are_little_endian() {
        let mut buf = BytesMut::new();
        FieldValue::U32(0x0403_0201).put(&mut buf);
        FieldValue::I16(-2).put(&mut buf);
        assert_eq!(buf.as_ref(), &[0x01, 0x02, 0x03, 0x04, 0xFE, 0xFF]);

        let mut src: &[u8] = &buf;
        assert_eq!(FieldValue::get(FieldType::U32, &mut src), FieldValue::U32(0x0403_0201));
        assert_eq!(FieldValue::get(FieldType::I16, &mut src), FieldValue::I16(-2));
        assert!(src.is_empty());
    }

    #[test]
    fn bytes_field_takes_remaining_input() {
        let mut src: &[u8] = b"hello";
        let value = FieldValue::get(FieldType::Bytes, &mut src);
        assert_eq!(value.as_bytes(), Some(&b"hello"[..]));
        assert!(src.is_empty());
    }

    #[test]
    fn parse_integers() {
        assert_eq!(FieldValue::parse(FieldType::U16, "5000").unwrap(), FieldValue::U16(5000));
        assert_eq!(FieldValue::parse(FieldType::U16, "0x0101").unwrap(), FieldValue::U16(257));
        assert_eq!(FieldValue::parse(FieldType::I8, "-12").unwrap(), FieldValue::I8(-12));
        assert_eq!(FieldValue::parse(FieldType::I32, "-0x10").unwrap(), FieldValue::I32(-16));
    }

    #[test]
    fn parse_rejects_out_of_range_and_garbage() {
        assert!(matches!(
            FieldValue::parse(FieldType::U8, "256"),
            Err(CodecError::InvalidValue { field_type: FieldType::U8, .. })
        ));
        assert!(FieldValue::parse(FieldType::U32, "-1").is_err());
        assert!(FieldValue::parse(FieldType::I16, "ten").is_err());
    }

    #[test]
    fn parse_bytes_text_and_hex() {
        assert_eq!(
            FieldValue::parse(FieldType::Bytes, "hello").unwrap(),
            FieldValue::from("hello")
        );
        assert_eq!(
            FieldValue::parse(FieldType::Bytes, "hex:01ff").unwrap(),
            FieldValue::from(vec![0x01, 0xFF])
        );
        assert!(FieldValue::parse(FieldType::Bytes, "hex:zz").is_err());
    }

    #[test]
    fn display_prefers_text_for_printable_bytes() {
        assert_eq!(FieldValue::from(&b"hello\0"[..]).to_string(), "\"hello\"");
        assert_eq!(FieldValue::from(vec![0x01, 0x02]).to_string(), "hex:0102");
        assert_eq!(FieldValue::U16(257).to_string(), "257");
    }

    #[test]
    fn as_i64_widens_integers_only() {
        assert_eq!(FieldValue::I8(-1).as_i64(), Some(-1));
        assert_eq!(FieldValue::U32(u32::MAX).as_i64(), Some(i64::from(u32::MAX)));
        assert_eq!(FieldValue::from("x").as_i64(), None);
    }
}
