use brping_message::Codec;

use crate::cmd::SchemasArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_schemas, OutputFormat};

pub fn run(_args: SchemasArgs, codec: &Codec, format: OutputFormat) -> CliResult<i32> {
    print_schemas(codec.registry().iter().map(|entry| entry.as_ref()), format);
    Ok(SUCCESS)
}
