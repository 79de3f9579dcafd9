use std::io::{IsTerminal, Write};

use brping_message::{FieldValue, Message};
use brping_schema::SchemaEntry;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    message_id: u16,
    name: &'a str,
    src_device_id: u8,
    dst_device_id: u8,
    payload_length: u16,
    fields: Map<String, Value>,
    checksum: u16,
    checksum_valid: bool,
    frame: String,
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    message_id: u16,
    name: &'a str,
    frame: String,
}

#[derive(Serialize)]
struct SummaryOutput {
    parsed: u64,
    errors: u64,
}

/// Print a decoded message. `wire` is the frame it was decoded from.
pub fn print_message(message: &Message, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                message_id: message.message_id(),
                name: message.name(),
                src_device_id: message.src_device_id(),
                dst_device_id: message.dst_device_id(),
                payload_length: message.payload_length(),
                fields: message
                    .fields()
                    .map(|(name, value)| (name.to_string(), json_value(value)))
                    .collect(),
                checksum: message.checksum(),
                checksum_valid: message.verify_checksum(),
                frame: hex::encode(wire),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "TYPE", "VALUE"])
                .add_row(vec![
                    "message_id".to_string(),
                    "u16".to_string(),
                    format!("{} ({})", message.message_id(), message.name()),
                ])
                .add_row(vec![
                    "src/dst".to_string(),
                    "u8".to_string(),
                    format!("{}/{}", message.src_device_id(), message.dst_device_id()),
                ])
                .add_row(vec![
                    "payload_length".to_string(),
                    "u16".to_string(),
                    message.payload_length().to_string(),
                ]);
            for (name, value) in message.fields() {
                table.add_row(vec![
                    name.to_string(),
                    value.field_type().to_string(),
                    value.to_string(),
                ]);
            }
            table.add_row(vec![
                "checksum".to_string(),
                "u16".to_string(),
                format!(
                    "0x{:04x} ({})",
                    message.checksum(),
                    if message.verify_checksum() { "ok" } else { "MISMATCH" }
                ),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{message}"),
        OutputFormat::Raw => print_raw(wire),
    }
}

/// Print an encoded frame.
pub fn print_frame(message_id: u16, name: &str, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput {
            message_id,
            name,
            frame: hex::encode(wire),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "SIZE", "FRAME"])
                .add_row(vec![
                    message_id.to_string(),
                    name.to_string(),
                    wire.len().to_string(),
                    hex::encode(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

/// Print the registered message layouts.
pub fn print_schemas<'a>(entries: impl Iterator<Item = &'a SchemaEntry>, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            let entries: Vec<&SchemaEntry> = entries.collect();
            print_json(&entries);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "STATIC LEN", "FIELDS"]);
            for entry in entries {
                table.add_row(vec![
                    entry.type_id().to_string(),
                    entry.name().to_string(),
                    entry.static_payload_length().to_string(),
                    describe_fields(entry),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for entry in entries {
                println!("{:>5} {} [{}]", entry.type_id(), entry.name(), describe_fields(entry));
            }
        }
    }
}

/// Print parser counters at the end of a stream.
pub fn print_summary(parsed: u64, errors: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SummaryOutput { parsed, errors }),
        OutputFormat::Raw => {}
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("parsed: {parsed} errors: {errors}");
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn describe_fields(entry: &SchemaEntry) -> String {
    entry
        .fields()
        .iter()
        .map(|field| format!("{}:{}", field.name, field.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

fn json_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Bytes(bytes) => Value::String(hex::encode(bytes)),
        other => other.as_i64().map(Value::from).unwrap_or(Value::Null),
    }
}
