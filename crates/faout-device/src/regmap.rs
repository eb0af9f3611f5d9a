//! FAOUT register map.
//!
//! Fixed `(addr, port)` assignments the firmware decodes. The control block
//! lives at addr 0, the SDRAM block at addr 1, DAC channels at addr 2, and
//! the interpolators at addr 3.

use faout_proto::RegAddr;

/// Control register; write a single bit to trigger the matching command.
pub const REG_CMD: RegAddr = RegAddr::new(0, 0);
/// Status bitfield, decoded by [`crate::status::StatusFlags`].
pub const REG_STATUS: RegAddr = RegAddr::new(0, 1);
/// Persistent configuration bits.
pub const REG_CONFIG: RegAddr = RegAddr::new(0, 2);
/// Firmware version (read-only).
pub const REG_VERSION: RegAddr = RegAddr::new(0, 3);

/// SDRAM read pointer, low and high halves.
pub const REG_SDRAM_RD_LO: RegAddr = RegAddr::new(1, 0);
pub const REG_SDRAM_RD_HI: RegAddr = RegAddr::new(1, 1);
/// SDRAM write pointer, low and high halves.
pub const REG_SDRAM_WR_LO: RegAddr = RegAddr::new(1, 2);
pub const REG_SDRAM_WR_HI: RegAddr = RegAddr::new(1, 3);
/// SDRAM bulk data port for ReadRegN/WriteRegN.
pub const REG_SDRAM_DATA: RegAddr = RegAddr::new(1, 4);

/// DAC channel block; ports 0..=5 are the six channels.
pub const ADDR_DAC: u8 = 2;
/// Interpolator block; ports 0..=5 are target values, 6..=11 ramp steps.
pub const ADDR_INTERP: u8 = 3;
/// Port offset from an interpolator value register to its step register.
pub const INTERP_STEP_OFFSET: u8 = 6;

/// Number of DAC (and interpolator) channels.
pub const NUM_CHANNELS: u8 = 6;

/// Control bits in [`REG_CMD`].
pub const CMD_BIT_RESET: u8 = 0;
pub const CMD_BIT_SEQ_START: u8 = 1;
pub const CMD_BIT_SEQ_STOP: u8 = 2;
pub const CMD_BIT_SDRAM_REWIND: u8 = 5;
pub const CMD_BIT_SDRAM_CLEAR: u8 = 6;

/// Capacity of the on-board sample buffer in 16-bit words.
pub const SDRAM_CAPACITY: u32 = (1 << 23) - 1;
