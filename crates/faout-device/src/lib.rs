//! Register access, bulk streaming, and SDRAM flow control for the FAOUT
//! instrument.
//!
//! Layering, bottom up:
//!
//! - [`bus`] — half-duplex command channel: single-register reads/writes
//!   and bulk transfers chunked around the protocol's 16-bit count field
//! - [`sdram`] — bounded linear buffer bookkeeping (pointer pairs,
//!   available/free space)
//! - [`status`] — pure decode of the STATUS bitfield
//! - [`device`] — the facade callers use: reset and sequence control,
//!   DAC/interpolator access, SDRAM streaming with overflow/underflow
//!   protection
//! - [`sim`] — soft FAOUT model behind the same link trait, for tests and
//!   hardware-less operation

pub mod bus;
pub mod device;
pub mod error;
pub mod regmap;
pub mod sdram;
pub mod sim;
pub mod status;

pub use bus::Bus;
pub use device::Device;
pub use error::{DeviceError, Result};
pub use sdram::PointerPair;
pub use sim::{SimCommand, SimLink, SIM_VERSION};
pub use status::StatusFlags;
