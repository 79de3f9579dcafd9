use std::path::{Path, PathBuf};
use std::sync::Arc;

use brping_message::Codec;
use brping_schema::{SchemaEntry, SchemaRegistry};
use clap::{Args, Subcommand};

use crate::exit::{schema_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod parse;
pub mod request;
pub mod schemas;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a single frame and print its fields.
    Decode(DecodeArgs),
    /// Encode a message from FIELD=VALUE pairs.
    Encode(EncodeArgs),
    /// Build an empty request frame for a message id.
    Request(RequestArgs),
    /// Parse a byte stream and print every valid message.
    Parse(ParseArgs),
    /// List the registered message layouts.
    Schemas(SchemasArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, registry: Option<&Path>, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, &load_codec(registry)?, format),
        Command::Encode(args) => encode::run(args, &load_codec(registry)?, format),
        Command::Request(args) => request::run(args, &load_codec(registry)?, format),
        Command::Parse(args) => parse::run(args, &load_codec(registry)?, format),
        Command::Schemas(args) => schemas::run(args, &load_codec(registry)?, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame as hex digits (spaces, colons and a 0x prefix are ignored).
    #[arg(required_unless_present = "file")]
    pub frame: Option<String>,
    /// Read the raw frame bytes from a file instead.
    #[arg(long, conflicts_with = "frame")]
    pub file: Option<PathBuf>,
    /// Print the message even when the checksum does not match.
    #[arg(long)]
    pub no_verify: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message name or numeric id.
    pub message: String,
    /// Field assignments (FIELD=VALUE). Unset fields are zero.
    pub fields: Vec<String>,
    /// Source device id.
    #[arg(long, default_value = "0")]
    pub src: u8,
    /// Destination device id.
    #[arg(long, default_value = "0")]
    pub dst: u8,
    /// Write this id into the header instead of the message's own id.
    #[arg(long, value_name = "ID")]
    pub request_id: Option<u16>,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Name or numeric id of the message to request.
    pub message: String,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Input file. Default: stdin.
    pub input: Option<PathBuf>,
    /// Input is hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Stop after N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct SchemasArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn load_codec(registry: Option<&Path>) -> CliResult<Codec> {
    match registry {
        Some(path) => {
            let registry = SchemaRegistry::from_file(path).map_err(|err| {
                schema_error(&format!("failed loading {}", path.display()), err)
            })?;
            tracing::debug!(path = %path.display(), entries = registry.len(), "loaded message table");
            Ok(Codec::new(registry))
        }
        None => Ok(Codec::ping1d()),
    }
}

/// Find a registered message by name or numeric id.
pub(crate) fn resolve_schema(codec: &Codec, message: &str) -> CliResult<Arc<SchemaEntry>> {
    let found = match message.parse::<u16>() {
        Ok(id) => codec.registry().lookup(id),
        Err(_) => codec.registry().lookup_name(message),
    };
    found.ok_or_else(|| CliError::new(USAGE, format!("unknown message: {message}")))
}

/// Decode hex text, ignoring whitespace, `:` separators and `0x` prefixes.
pub(crate) fn decode_hex_input(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .map(|chunk| {
            chunk
                .strip_prefix("0x")
                .or_else(|| chunk.strip_prefix("0X"))
                .unwrap_or(chunk)
        })
        .collect();
    hex::decode(&digits).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use brping_schema::ids;

    use super::*;

    #[test]
    fn hex_input_ignores_separators_and_prefixes() {
        assert_eq!(decode_hex_input("42 52").unwrap(), vec![0x42, 0x52]);
        assert_eq!(decode_hex_input("0x42:0x52\n").unwrap(), vec![0x42, 0x52]);
        assert_eq!(decode_hex_input("4252").unwrap(), vec![0x42, 0x52]);
    }

    #[test]
    fn hex_input_rejects_odd_digits() {
        let err = decode_hex_input("425").unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn resolves_schema_by_name_or_id() {
        let codec = Codec::ping1d();
        assert_eq!(resolve_schema(&codec, "voltage_5").unwrap().type_id(), ids::VOLTAGE_5);
        assert_eq!(resolve_schema(&codec, "1300").unwrap().name(), "profile");
        assert_eq!(resolve_schema(&codec, "warp_drive").unwrap_err().code, USAGE);
    }
}
