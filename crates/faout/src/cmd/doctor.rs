use std::time::Duration;

use serde::Serialize;

use faout_device::{Device, DeviceError, SimLink};
use faout_proto::{decode_header, encode_header, Opcode, RegAddr};
use faout_transport::{CharDevLink, NoopSleep, RetryPolicy};

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        codec_roundtrip_check(),
        soft_model_stream_check(),
        retry_accumulation_check(),
        flow_control_check(),
        device_node_check(&args),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput { checks, overall };
    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn sim_device() -> Device<SimLink, NoopSleep> {
    Device::with_parts(
        SimLink::new(),
        RetryPolicy {
            max_attempts: 4,
            interval: Duration::from_millis(1),
        },
        NoopSleep::default(),
    )
}

fn codec_roundtrip_check() -> CheckResult {
    for op in [
        Opcode::ReadReg,
        Opcode::WriteReg,
        Opcode::ReadRegN,
        Opcode::WriteRegN,
    ] {
        for addr in [0u8, 1, 31, 63] {
            for port in [0u8, 5, 32, 63] {
                let reg = match RegAddr::try_new(addr, port) {
                    Ok(reg) => reg,
                    Err(err) => {
                        return CheckResult {
                            name: "codec_roundtrip".to_string(),
                            status: CheckStatus::Fail,
                            detail: format!("address construction failed: {err}"),
                        }
                    }
                };
                match decode_header(encode_header(op, reg)) {
                    Ok((got_op, got_reg)) if got_op == op && got_reg == reg => {}
                    other => {
                        return CheckResult {
                            name: "codec_roundtrip".to_string(),
                            status: CheckStatus::Fail,
                            detail: format!("header {op:?} {reg} decoded as {other:?}"),
                        }
                    }
                }
            }
        }
    }
    CheckResult {
        name: "codec_roundtrip".to_string(),
        status: CheckStatus::Pass,
        detail: "header words decode back to opcode/addr/port".to_string(),
    }
}

fn soft_model_stream_check() -> CheckResult {
    let mut dev = sim_device();
    let data: Vec<u16> = (0..70_000u32).map(|i| (i % 65_536) as u16).collect();

    let result = dev
        .sdram_write(&data)
        .and_then(|_| dev.sdram_read(Some(70_000)));

    match result {
        Ok(back) if back == data => CheckResult {
            name: "soft_model_stream".to_string(),
            status: CheckStatus::Pass,
            detail: "70000-word stream crossed the chunk boundary intact".to_string(),
        },
        Ok(back) => CheckResult {
            name: "soft_model_stream".to_string(),
            status: CheckStatus::Fail,
            detail: format!("stream corrupted ({} of 70000 words match)", matching(&data, &back)),
        },
        Err(err) => CheckResult {
            name: "soft_model_stream".to_string(),
            status: CheckStatus::Fail,
            detail: format!("stream failed: {err}"),
        },
    }
}

fn matching(a: &[u16], b: &[u16]) -> usize {
    a.iter().zip(b.iter()).filter(|(x, y)| x == y).count()
}

fn retry_accumulation_check() -> CheckResult {
    let mut dev = Device::with_parts(
        SimLink::new().with_max_recv(1),
        RetryPolicy {
            max_attempts: 4,
            interval: Duration::from_millis(1),
        },
        NoopSleep::default(),
    );

    match dev.version() {
        Ok(_) => CheckResult {
            name: "retry_accumulation".to_string(),
            status: CheckStatus::Pass,
            detail: "byte-at-a-time responses reassemble".to_string(),
        },
        Err(err) => CheckResult {
            name: "retry_accumulation".to_string(),
            status: CheckStatus::Fail,
            detail: format!("split response read failed: {err}"),
        },
    }
}

fn flow_control_check() -> CheckResult {
    let mut dev = sim_device();
    if let Err(err) = dev.sdram_write(&[1, 2, 3]) {
        return CheckResult {
            name: "flow_control".to_string(),
            status: CheckStatus::Fail,
            detail: format!("priming write failed: {err}"),
        };
    }

    match dev.sdram_read(Some(4)) {
        Err(DeviceError::BufferUnderflow {
            requested: 4,
            available: 3,
        }) => CheckResult {
            name: "flow_control".to_string(),
            status: CheckStatus::Pass,
            detail: "over-length read rejected with underflow".to_string(),
        },
        Ok(_) => CheckResult {
            name: "flow_control".to_string(),
            status: CheckStatus::Fail,
            detail: "over-length read unexpectedly succeeded".to_string(),
        },
        Err(err) => CheckResult {
            name: "flow_control".to_string(),
            status: CheckStatus::Fail,
            detail: format!("unexpected error kind: {err}"),
        },
    }
}

fn device_node_check(args: &DoctorArgs) -> CheckResult {
    let path = match &args.dev {
        Some(path) => path,
        None => {
            return CheckResult {
                name: "device_node".to_string(),
                status: CheckStatus::Skip,
                detail: "no --dev given".to_string(),
            }
        }
    };

    match CharDevLink::open(path) {
        Ok(link) => {
            let detail = format!("{} opened read/write", path.display());
            let _ = link.close();
            CheckResult {
                name: "device_node".to_string(),
                status: CheckStatus::Pass,
                detail,
            }
        }
        Err(err) => CheckResult {
            name: "device_node".to_string(),
            status: CheckStatus::Fail,
            detail: format!("{err}"),
        },
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("faout doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<22} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Skip => "SKIP",
    }
}
