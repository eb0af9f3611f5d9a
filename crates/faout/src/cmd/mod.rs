use std::path::PathBuf;

use clap::{Args, Subcommand};

use faout_device::{Device, SimLink};
use faout_transport::{CharDevLink, Link};

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod download;
pub mod peek;
pub mod poke;
pub mod probe;
pub mod status;
pub mod upload;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show version information.
    Version(VersionArgs),
    /// Read firmware version and decoded status from a device.
    Probe(ProbeArgs),
    /// Print the decoded status register.
    Status(StatusArgs),
    /// Read a single register.
    Peek(PeekArgs),
    /// Write a single register.
    Poke(PokeArgs),
    /// Stream a sample file into the SDRAM buffer.
    Upload(UploadArgs),
    /// Stream buffered samples out of the SDRAM buffer.
    Download(DownloadArgs),
    /// Run driver self-checks.
    Doctor(DoctorArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args),
        Command::Probe(args) => probe::run(args, format),
        Command::Status(args) => status::run(args, format),
        Command::Peek(args) => peek::run(args, format),
        Command::Poke(args) => poke::run(args),
        Command::Upload(args) => upload::run(args, format),
        Command::Download(args) => download::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
    }
}

/// Which link to drive: a character device node or the bundled soft model.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Character device exposing the instrument (e.g. /dev/faout0).
    #[arg(long, value_name = "PATH", conflicts_with = "sim")]
    pub dev: Option<PathBuf>,
    /// Drive the bundled soft device model instead of hardware.
    #[arg(long)]
    pub sim: bool,
}

impl LinkArgs {
    pub fn open(&self) -> CliResult<Device<Box<dyn Link>>> {
        if self.sim {
            let link: Box<dyn Link> = Box::new(SimLink::new());
            return Ok(Device::new(link));
        }
        match &self.dev {
            Some(path) => {
                let link = CharDevLink::open(path)
                    .map_err(|err| transport_error("open device link", err))?;
                let link: Box<dyn Link> = Box::new(link);
                Ok(Device::new(link))
            }
            None => Err(CliError::new(USAGE, "pass --dev PATH or --sim")),
        }
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub link: LinkArgs,
}

#[derive(Args, Debug)]
pub struct PeekArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Functional block address (0-63).
    #[arg(long)]
    pub addr: u8,
    /// Sub-register port (0-63).
    #[arg(long)]
    pub port: u8,
}

#[derive(Args, Debug)]
pub struct PokeArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Functional block address (0-63).
    #[arg(long)]
    pub addr: u8,
    /// Sub-register port (0-63).
    #[arg(long)]
    pub port: u8,
    /// Value to write (decimal, or hex with 0x prefix).
    #[arg(long, value_parser = parse_word)]
    pub value: u16,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Sample file: raw big-endian 16-bit words.
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Number of words to read. Default: everything available.
    #[arg(long)]
    pub count: Option<u32>,
    /// Write raw big-endian words here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    /// Also check that this device node can be opened.
    #[arg(long, value_name = "PATH")]
    pub dev: Option<PathBuf>,
}

/// Parse a 16-bit word from decimal or `0x`-prefixed hex.
pub fn parse_word(input: &str) -> Result<u16, String> {
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid 16-bit word: {input}"))
}
