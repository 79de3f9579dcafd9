use std::fs;

use brping_message::Codec;

use crate::cmd::{decode_hex_input, DecodeArgs};
use crate::exit::{codec_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: DecodeArgs, codec: &Codec, format: OutputFormat) -> CliResult<i32> {
    let frame = match (&args.frame, &args.file) {
        (_, Some(path)) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        (Some(text), None) => decode_hex_input(text)?,
        (None, None) => return Err(CliError::new(USAGE, "no frame given")),
    };

    let message = codec
        .decode(&frame)
        .map_err(|err| codec_error("decode failed", err))?;

    if !message.verify_checksum() {
        let actual = message.calculate_checksum();
        if !args.no_verify {
            return Err(CliError::new(
                DATA_INVALID,
                format!(
                    "decode failed: checksum mismatch on message {}: expected 0x{:04x}, computed 0x{actual:04x}",
                    message.message_id(),
                    message.checksum()
                ),
            ));
        }
        tracing::warn!(
            message_id = message.message_id(),
            expected = message.checksum(),
            actual,
            "checksum mismatch ignored"
        );
    }

    let frame_length = message.header().frame_length();
    if frame.len() > frame_length {
        tracing::debug!(trailing = frame.len() - frame_length, "ignoring bytes after frame");
    }
    print_message(&message, &frame[..frame_length], format);
    Ok(SUCCESS)
}
