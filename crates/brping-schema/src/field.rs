use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire type of a single payload field.
///
/// All multi-byte integers are little-endian. [`FieldType::Bytes`] is the
/// variable-length trailing field; its length is derived from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    Bytes,
}

impl FieldType {
    /// Encoded width in bytes, or `None` for the variable-length type.
    pub fn width(self) -> Option<usize> {
        match self {
            FieldType::U8 | FieldType::I8 => Some(1),
            FieldType::U16 | FieldType::I16 => Some(2),
            FieldType::U32 | FieldType::I32 => Some(4),
            FieldType::Bytes => None,
        }
    }

    pub fn is_variable(self) -> bool {
        self.width().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::U8 => "u8",
            FieldType::I8 => "i8",
            FieldType::U16 => "u16",
            FieldType::I16 => "i16",
            FieldType::U32 => "u32",
            FieldType::I32 => "i32",
            FieldType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named field in a message layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_wire_sizes() {
        assert_eq!(FieldType::U8.width(), Some(1));
        assert_eq!(FieldType::I16.width(), Some(2));
        assert_eq!(FieldType::U32.width(), Some(4));
        assert_eq!(FieldType::Bytes.width(), None);
        assert!(FieldType::Bytes.is_variable());
        assert!(!FieldType::I32.is_variable());
    }

    #[test]
    fn field_spec_uses_type_key_in_json() {
        let spec: FieldSpec = serde_json::from_str(r#"{"name":"voltage_5","type":"u16"}"#).unwrap();
        assert_eq!(spec, FieldSpec::new("voltage_5", FieldType::U16));

        let json = serde_json::to_string(&FieldSpec::new("data", FieldType::Bytes)).unwrap();
        assert_eq!(json, r#"{"name":"data","type":"bytes"}"#);
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        let result = serde_json::from_str::<FieldSpec>(r#"{"name":"x","type":"f32"}"#);
        assert!(result.is_err());
    }
}
