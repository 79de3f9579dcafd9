use brping_message::Codec;

use crate::cmd::{resolve_schema, RequestArgs};
use crate::exit::{codec_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: RequestArgs, codec: &Codec, format: OutputFormat) -> CliResult<i32> {
    let schema = resolve_schema(codec, &args.message)?;
    let frame = codec
        .request(schema.type_id())
        .map_err(|err| codec_error("request failed", err))?;
    print_frame(schema.type_id(), schema.name(), &frame, format);
    Ok(SUCCESS)
}
