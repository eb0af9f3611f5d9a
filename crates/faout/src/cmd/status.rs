use faout_device::regmap::REG_STATUS;
use faout_device::StatusFlags;

use crate::cmd::StatusArgs;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: StatusArgs, format: OutputFormat) -> CliResult<i32> {
    let mut dev = args.link.open()?;

    let raw = dev
        .read_raw(REG_STATUS)
        .map_err(|err| device_error("read status", err))?;
    print_status(raw, &StatusFlags::decode(raw), format);
    Ok(SUCCESS)
}
