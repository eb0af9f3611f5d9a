use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use faout_device::StatusFlags;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    raw: u16,
    #[serde(flatten)]
    flags: &'a StatusFlags,
}

pub fn print_status(raw: u16, flags: &StatusFlags, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatusOutput { raw, flags };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FLAG", "VALUE"]);
            for (name, value) in flag_rows(flags) {
                table.add_row(vec![name.to_string(), value]);
            }
            table.add_row(vec!["raw".to_string(), format!("{raw:#06x}")]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (name, value) in flag_rows(flags) {
                println!("  {name:<18} {value}");
            }
            println!("  {:<18} {raw:#06x}", "raw");
        }
        OutputFormat::Raw => {
            println!("{raw:#06x}");
        }
    }
}

fn flag_rows(flags: &StatusFlags) -> Vec<(&'static str, String)> {
    vec![
        ("state", flags.state.to_string()),
        ("running", flags.running.to_string()),
        ("fifo_full", flags.fifo_full.to_string()),
        ("fifo_empty", flags.fifo_empty.to_string()),
        ("sdram_empty", flags.sdram_empty.to_string()),
        ("sdram_full", flags.sdram_full.to_string()),
        ("seq_error", flags.seq_error.to_string()),
        ("comm_error", flags.comm_error.to_string()),
        ("clk_ext_locked", flags.clk_ext_locked.to_string()),
        ("clk_ext_selected", flags.clk_ext_selected.to_string()),
    ]
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Render a firmware version word as `major.minor`.
pub fn version_string(version: u16) -> String {
    format!("{}.{}", version >> 8, version & 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_word_renders_major_minor() {
        assert_eq!(version_string(0x0104), "1.4");
        assert_eq!(version_string(0x020A), "2.10");
    }

    #[test]
    fn status_json_includes_raw_and_flags() {
        let flags = StatusFlags::decode(1 << 3);
        let out = StatusOutput {
            raw: 1 << 3,
            flags: &flags,
        };
        let json = serde_json::to_string(&out).expect("status should serialize");
        assert!(json.contains("\"raw\":8"));
        assert!(json.contains("\"running\":true"));
    }
}
