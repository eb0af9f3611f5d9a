use faout_proto::RegAddr;

use crate::cmd::PokeArgs;
use crate::exit::{device_error, proto_error, CliResult, SUCCESS};

pub fn run(args: PokeArgs) -> CliResult<i32> {
    let reg = RegAddr::try_new(args.addr, args.port)
        .map_err(|err| proto_error("register address", err))?;

    let mut dev = args.link.open()?;
    dev.write_raw(reg, args.value)
        .map_err(|err| device_error("write register", err))?;

    Ok(SUCCESS)
}
