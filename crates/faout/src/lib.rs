//! Host-side driver for the FAOUT FPGA DAC/sequencer.
//!
//! FAOUT exposes its registers and a bounded on-board sample buffer through
//! a synchronous byte-stream link. This crate bundles the driver stack:
//!
//! # Crate Structure
//!
//! - [`transport`] — byte-link capability (partial transfers, bounded-retry
//!   reads, character-device backend)
//! - [`proto`] — 16-bit big-endian command-word codec
//! - [`device`] — register access, bulk streaming with chunking, SDRAM flow
//!   control, status decoding, and the device facade
//!
//! The `faout` binary (behind the `cli` feature) drives a device — or the
//! bundled soft model — from the command line.

/// Re-export transport types.
pub mod transport {
    pub use faout_transport::*;
}

/// Re-export protocol codec types.
pub mod proto {
    pub use faout_proto::*;
}

/// Re-export device types.
pub mod device {
    pub use faout_device::*;
}
