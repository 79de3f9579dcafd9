use std::fmt;
use std::io;

use brping_message::CodecError;
use brping_schema::SchemaError;

// Process exit codes shared by all subcommands.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    match err {
        CodecError::Io(source) => io_error(context, source),
        CodecError::UnknownSchema(_)
        | CodecError::UnknownField { .. }
        | CodecError::FieldTypeMismatch { .. }
        | CodecError::InvalidValue { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        CodecError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    match err {
        SchemaError::LoadFailed(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_errors_map_to_exit_codes() {
        let checksum = CodecError::ChecksumMismatch {
            message_id: 1,
            expected: 1,
            actual: 2,
        };
        assert_eq!(codec_error("decode", checksum).code, DATA_INVALID);
        assert_eq!(codec_error("encode", CodecError::UnknownSchema(9)).code, USAGE);
        assert_eq!(codec_error("read", CodecError::ConnectionClosed).code, FAILURE);

        let io = CodecError::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(codec_error("read", io).code, PERMISSION_DENIED);
    }

    #[test]
    fn error_message_keeps_context() {
        let err = codec_error("decode failed", CodecError::InvalidMagic);
        assert!(err.to_string().starts_with("decode failed: invalid frame magic"));
    }
}
