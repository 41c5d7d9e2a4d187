use crate::bridge::Bridge;
use crate::cmd::{SendArgs, SessionArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_exchange, OutputFormat};

pub fn run(args: SendArgs, session: &SessionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = Bridge::open(session)?;

    let mut request = Vec::with_capacity(args.bytes.len() + 1);
    request.push(args.tag);
    request.extend_from_slice(&args.bytes);

    let exchange = bridge.exchange(&request)?;
    print_exchange(&exchange, format);
    bridge.finish();

    Ok(SUCCESS)
}
