use ssif_frame::Request;
use tracing::debug;

use crate::cmd::{parse_byte, RawArgs};
use crate::exit::{ssif_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_response, OutputFormat};

pub fn run(args: RawArgs, format: OutputFormat) -> CliResult<i32> {
    let net_function = parse_byte("NETFN", &args.net_function)?;
    let command = parse_byte("CMD", &args.command)?;
    let lun = parse_byte("--lun", &args.lun)?;
    let data = args
        .data
        .iter()
        .map(|byte| parse_byte("DATA", byte))
        .collect::<CliResult<Vec<u8>>>()?;

    // Reject malformed requests before touching the adapter.
    Request::new(net_function, lun, command, &data)
        .map_err(|err| CliError::new(USAGE, format!("invalid request: {err}")))?;

    let mut endpoint = args.bus.open()?;
    debug!(address = %endpoint.address(), net_function, command, "submitting raw request");

    if args.no_response {
        endpoint
            .send(net_function, lun, command, &data)
            .map_err(|err| ssif_error("send failed", err))?;
        return Ok(SUCCESS);
    }

    let response = endpoint
        .submit(net_function, lun, command, &data)
        .map_err(|err| ssif_error("submit failed", err))?;
    print_response(net_function, command, &response, &endpoint.health(), format);
    Ok(SUCCESS)
}
