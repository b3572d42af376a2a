use crate::cmd::SelftestArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{print_selftest, OutputFormat};

pub fn run(args: SelftestArgs, format: OutputFormat) -> CliResult<i32> {
    let mut endpoint = args.bus.open()?;
    let outcome = endpoint.run_self_test();
    print_selftest(&outcome, &endpoint.health(), format);

    if outcome.passed() {
        Ok(SUCCESS)
    } else {
        Ok(HEALTH_CHECK_FAILED)
    }
}
