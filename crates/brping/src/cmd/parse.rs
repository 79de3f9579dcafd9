use std::fs::File;
use std::io::{self, Cursor, Read};

use brping_message::{Codec, CodecError, MessageReader, Parser};

use crate::cmd::{decode_hex_input, ParseArgs};
use crate::exit::{codec_error, io_error, CliResult, SUCCESS};
use crate::output::{print_message, print_summary, OutputFormat};

pub fn run(args: ParseArgs, codec: &Codec, format: OutputFormat) -> CliResult<i32> {
    let input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let input: Box<dyn Read> = if args.hex {
        let mut text = String::new();
        let mut input = input;
        input
            .read_to_string(&mut text)
            .map_err(|err| io_error("failed reading hex input", err))?;
        Box::new(Cursor::new(decode_hex_input(&text)?))
    } else {
        input
    };

    let mut reader = MessageReader::with_parser(input, Parser::new(codec.clone()));
    let mut printed = 0usize;
    while args.count.is_none_or(|limit| printed < limit) {
        let message = match reader.read_message() {
            Ok(message) => message,
            Err(CodecError::ConnectionClosed) => break,
            Err(err) => return Err(codec_error("read failed", err)),
        };
        let wire = match reader.parser().last_frame() {
            Some(frame) => frame.to_vec(),
            None => codec
                .encode(&message)
                .map_err(|err| codec_error("encode failed", err))?
                .to_vec(),
        };
        print_message(&message, &wire, format);
        printed += 1;
    }

    let parser = reader.parser();
    tracing::info!(parsed = parser.parsed(), errors = parser.errors(), "stream finished");
    if !matches!(format, OutputFormat::Raw) {
        print_summary(parser.parsed(), parser.errors(), format);
    }
    Ok(SUCCESS)
}
