use brping_message::{Codec, FieldValue, Message};

use crate::cmd::{resolve_schema, EncodeArgs};
use crate::exit::{codec_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, codec: &Codec, format: OutputFormat) -> CliResult<i32> {
    let schema = resolve_schema(codec, &args.message)?;
    let mut message = Message::new(schema);
    message.set_src_device_id(args.src);
    message.set_dst_device_id(args.dst);

    for assignment in &args.fields {
        apply_assignment(&mut message, assignment)?;
    }

    let frame = codec
        .encode_as(&message, args.request_id)
        .map_err(|err| codec_error("encode failed", err))?;
    tracing::debug!(
        message_id = message.message_id(),
        size = frame.len(),
        "encoded frame"
    );

    print_frame(
        args.request_id.unwrap_or(message.message_id()),
        message.name(),
        &frame,
        format,
    );
    Ok(SUCCESS)
}

fn apply_assignment(message: &mut Message, assignment: &str) -> CliResult<()> {
    let (name, raw) = assignment.split_once('=').ok_or_else(|| {
        CliError::new(USAGE, format!("expected FIELD=VALUE, got {assignment:?}"))
    })?;
    let ty = message
        .schema()
        .field(name)
        .map(|field| field.ty)
        .ok_or_else(|| {
            CliError::new(
                USAGE,
                format!("message {} has no field {name:?}", message.name()),
            )
        })?;
    let value = FieldValue::parse(ty, raw).map_err(|err| codec_error("invalid value", err))?;
    message
        .set(name, value)
        .map_err(|err| codec_error("invalid value", err))
}
