use faout_device::StatusFlags;
use serde::Serialize;

use crate::cmd::ProbeArgs;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{version_string, OutputFormat};

#[derive(Serialize)]
struct ProbeOutput {
    version_raw: u16,
    version: String,
    status_raw: u16,
    status: StatusFlags,
}

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut dev = args.link.open()?;

    let version_raw = dev
        .version()
        .map_err(|err| device_error("read version", err))?;
    let status_raw = dev
        .read_raw(faout_device::regmap::REG_STATUS)
        .map_err(|err| device_error("read status", err))?;
    let status = StatusFlags::decode(status_raw);

    let out = ProbeOutput {
        version_raw,
        version: version_string(version_raw),
        status_raw,
        status,
    };
    print_probe(&out, format);
    Ok(SUCCESS)
}

fn print_probe(out: &ProbeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Device:");
            println!("  Firmware:  {} ({:#06x})", out.version, out.version_raw);
            println!("  Status:    {:#06x}", out.status_raw);
            println!(
                "  State:     {} (running={})",
                out.status.state, out.status.running
            );
            if out.status.has_error() {
                println!(
                    "  Errors:    seq_error={} comm_error={}",
                    out.status.seq_error, out.status.comm_error
                );
            }
        }
        OutputFormat::Raw => {
            println!("{}", out.version);
        }
    }
}
