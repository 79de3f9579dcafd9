use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Result, SchemaError};
use crate::field::{FieldSpec, FieldType};

/// Field layout of one message type.
///
/// Constructed through [`SchemaEntry::new`], which guarantees that a
/// variable-length field, if any, is the last one and that
/// `static_payload_length` is the sum of the fixed field widths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntry {
    type_id: u16,
    name: String,
    fields: Vec<FieldSpec>,
    static_payload_length: usize,
}

impl SchemaEntry {
    /// Validate a field layout and build the entry.
    pub fn new(type_id: u16, name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| SchemaError::InvalidLayout {
            name: name.clone(),
            reason,
        };

        let mut seen = HashSet::with_capacity(fields.len());
        let mut static_payload_length = 0usize;
        for (index, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(invalid(format!("field {index} has an empty name")));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("duplicate field name {}", field.name)));
            }
            match field.ty.width() {
                Some(width) => static_payload_length += width,
                None if index + 1 != fields.len() => {
                    return Err(invalid(format!(
                        "variable-length field {} must be the last field",
                        field.name
                    )));
                }
                None => {}
            }
        }

        if static_payload_length > usize::from(u16::MAX) {
            return Err(invalid(format!(
                "static payload length {static_payload_length} exceeds the 16-bit length field"
            )));
        }

        Ok(Self {
            type_id,
            name,
            fields,
            static_payload_length,
        })
    }

    pub fn type_id(&self) -> u16 {
        self.type_id
    }

    /// Human-readable message name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Sum of the fixed field widths, excluding any variable-length field.
    pub fn static_payload_length(&self) -> usize {
        self.static_payload_length
    }

    /// True when the last field is a variable-length byte sequence.
    pub fn is_variable(&self) -> bool {
        self.variable_field().is_some()
    }

    pub fn variable_field(&self) -> Option<&FieldSpec> {
        self.fields.last().filter(|field| field.ty == FieldType::Bytes)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Payload length for an instance whose trailing field holds `variable_len` bytes.
    ///
    /// Fixed-layout messages ignore `variable_len`.
    pub fn payload_length_for(&self, variable_len: usize) -> usize {
        if self.is_variable() {
            self.static_payload_length + variable_len
        } else {
            self.static_payload_length
        }
    }
}
