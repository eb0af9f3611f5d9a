use faout_proto::RegAddr;
use serde::Serialize;

use crate::cmd::PeekArgs;
use crate::exit::{device_error, proto_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct PeekOutput {
    addr: u8,
    port: u8,
    value: u16,
}

pub fn run(args: PeekArgs, format: OutputFormat) -> CliResult<i32> {
    let reg = RegAddr::try_new(args.addr, args.port)
        .map_err(|err| proto_error("register address", err))?;

    let mut dev = args.link.open()?;
    let value = dev
        .read_raw(reg)
        .map_err(|err| device_error("read register", err))?;

    match format {
        OutputFormat::Json => {
            let out = PeekOutput {
                addr: args.addr,
                port: args.port,
                value,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{reg} = {value} ({value:#06x})");
        }
        OutputFormat::Raw => {
            println!("{value}");
        }
    }
    Ok(SUCCESS)
}
