use tracing::debug;

use faout_proto::RegAddr;
use faout_transport::{Link, RetryPolicy, Sleep, ThreadSleep};

use crate::bus::Bus;
use crate::error::{DeviceError, Result};
use crate::regmap::{
    ADDR_DAC, ADDR_INTERP, CMD_BIT_RESET, CMD_BIT_SDRAM_CLEAR, CMD_BIT_SDRAM_REWIND,
    CMD_BIT_SEQ_START, CMD_BIT_SEQ_STOP, INTERP_STEP_OFFSET, NUM_CHANNELS, REG_CMD, REG_CONFIG,
    REG_SDRAM_DATA, REG_SDRAM_RD_HI, REG_SDRAM_RD_LO, REG_SDRAM_WR_HI, REG_SDRAM_WR_LO,
    REG_STATUS, REG_VERSION,
};
use crate::sdram::{join_halves, PointerPair};
use crate::status::StatusFlags;

const CONFIG_BITS: u8 = 16;

/// Handle to a FAOUT instrument.
///
/// Owns the link for its whole lifetime; the protocol is strictly
/// half-duplex request/response with no correlation identifiers, so
/// serializing all access through one exclusively owned handle is what
/// keeps commands and responses paired. Every operation takes `&mut self`.
pub struct Device<L: Link, S: Sleep = ThreadSleep> {
    bus: Bus<L, S>,
}

impl<L: Link, S: Sleep> core::fmt::Debug for Device<L, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device").finish_non_exhaustive()
    }
}

impl<L: Link> Device<L> {
    /// Take ownership of a link with default retry behavior.
    pub fn new(link: L) -> Self {
        Self { bus: Bus::new(link) }
    }
}

impl<L: Link, S: Sleep> Device<L, S> {
    /// Take ownership of a link with an explicit retry policy and sleeper.
    pub fn with_parts(link: L, retry: RetryPolicy, sleeper: S) -> Self {
        Self {
            bus: Bus::with_parts(link, retry, sleeper),
        }
    }

    /// Release the underlying link.
    pub fn into_link(self) -> L {
        self.bus.into_link()
    }

    /// Borrow the underlying link.
    pub fn link(&self) -> &L {
        self.bus.link()
    }

    /// Mutably borrow the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        self.bus.link_mut()
    }

    fn write_cmd_bit(&mut self, bit: u8) -> Result<()> {
        self.bus.write_reg(REG_CMD, 1 << bit)
    }

    /// Global device reset.
    pub fn reset(&mut self) -> Result<()> {
        debug!("reset");
        self.write_cmd_bit(CMD_BIT_RESET)
    }

    /// Start sequence playback.
    pub fn sequence_start(&mut self) -> Result<()> {
        self.write_cmd_bit(CMD_BIT_SEQ_START)
    }

    /// Stop sequence playback.
    pub fn sequence_stop(&mut self) -> Result<()> {
        self.write_cmd_bit(CMD_BIT_SEQ_STOP)
    }

    /// Rewind the SDRAM read pointer for replay.
    pub fn sdram_rewind(&mut self) -> Result<()> {
        self.write_cmd_bit(CMD_BIT_SDRAM_REWIND)
    }

    /// Discard all buffered SDRAM data and reset both pointers.
    pub fn sdram_clear(&mut self) -> Result<()> {
        self.write_cmd_bit(CMD_BIT_SDRAM_CLEAR)
    }

    /// Firmware version word.
    pub fn version(&mut self) -> Result<u16> {
        self.bus.read_reg(REG_VERSION)
    }

    /// Decoded device status.
    pub fn status(&mut self) -> Result<StatusFlags> {
        Ok(StatusFlags::decode(self.bus.read_reg(REG_STATUS)?))
    }

    /// Read a single configuration bit.
    pub fn config_bit(&mut self, bit: u8) -> Result<bool> {
        check_index(bit, CONFIG_BITS)?;
        let config = self.bus.read_reg(REG_CONFIG)?;
        Ok(config & (1 << bit) != 0)
    }

    /// Set or clear a single configuration bit (read-modify-write).
    pub fn set_config_bit(&mut self, bit: u8, enabled: bool) -> Result<()> {
        check_index(bit, CONFIG_BITS)?;
        let mut config = self.bus.read_reg(REG_CONFIG)?;
        if enabled {
            config |= 1 << bit;
        } else {
            config &= !(1 << bit);
        }
        self.bus.write_reg(REG_CONFIG, config)
    }

    /// Read back a DAC channel.
    pub fn dac_read(&mut self, index: u8) -> Result<u16> {
        check_index(index, NUM_CHANNELS)?;
        self.bus.read_reg(RegAddr::new(ADDR_DAC, index))
    }

    /// Set a DAC channel directly.
    pub fn dac_write(&mut self, index: u8, value: u16) -> Result<()> {
        check_index(index, NUM_CHANNELS)?;
        self.bus.write_reg(RegAddr::new(ADDR_DAC, index), value)
    }

    /// Read an interpolator channel: `(target value, ramp steps)`.
    pub fn interp_read(&mut self, index: u8) -> Result<(u16, u16)> {
        check_index(index, NUM_CHANNELS)?;
        let steps = self
            .bus
            .read_reg(RegAddr::new(ADDR_INTERP, index + INTERP_STEP_OFFSET))?;
        let value = self.bus.read_reg(RegAddr::new(ADDR_INTERP, index))?;
        Ok((value, steps))
    }

    /// Program an interpolator ramp.
    ///
    /// The step count must be written first: the value write is what arms
    /// the ramp in hardware.
    pub fn interp_write(&mut self, index: u8, value: u16, steps: u16) -> Result<()> {
        check_index(index, NUM_CHANNELS)?;
        self.bus
            .write_reg(RegAddr::new(ADDR_INTERP, index + INTERP_STEP_OFFSET), steps)?;
        self.bus.write_reg(RegAddr::new(ADDR_INTERP, index), value)
    }

    /// Query the SDRAM pointer pair, fresh from the device.
    pub fn sdram_pointers(&mut self) -> Result<PointerPair> {
        let rd_lo = self.bus.read_reg(REG_SDRAM_RD_LO)?;
        let rd_hi = self.bus.read_reg(REG_SDRAM_RD_HI)?;
        let wr_lo = self.bus.read_reg(REG_SDRAM_WR_LO)?;
        let wr_hi = self.bus.read_reg(REG_SDRAM_WR_HI)?;
        PointerPair::new(join_halves(rd_lo, rd_hi), join_halves(wr_lo, wr_hi))
    }

    /// Stream words out of the SDRAM buffer.
    ///
    /// `n_words` defaults to everything available. Requesting more than is
    /// buffered fails with [`DeviceError::BufferUnderflow`] before any bulk
    /// command is issued; an empty buffer returns an empty sequence without
    /// touching the data port.
    pub fn sdram_read(&mut self, n_words: Option<u32>) -> Result<Vec<u16>> {
        let ptrs = self.sdram_pointers()?;
        let available = ptrs.available();
        let wanted = n_words.unwrap_or(available);

        if wanted > available {
            return Err(DeviceError::BufferUnderflow {
                requested: wanted,
                available,
            });
        }
        if available == 0 {
            return Ok(Vec::new());
        }

        self.bus.read_reg_n(REG_SDRAM_DATA, wanted)
    }

    /// Stream words into the SDRAM buffer.
    ///
    /// Fails with [`DeviceError::BufferOverflow`] if the data does not fit
    /// the space remaining before the end of the region. The buffer is
    /// linear: space is only reclaimed by an explicit [`Self::sdram_clear`],
    /// which this layer never issues on its own.
    pub fn sdram_write(&mut self, data: &[u16]) -> Result<()> {
        let ptrs = self.sdram_pointers()?;
        let free = ptrs.free_space();

        if data.len() as u64 > free as u64 {
            return Err(DeviceError::BufferOverflow {
                requested: data.len() as u64,
                free,
            });
        }

        self.bus.write_reg_n(REG_SDRAM_DATA, data)
    }

    /// Read an arbitrary register. Escape hatch for debugging surfaces.
    pub fn read_raw(&mut self, reg: RegAddr) -> Result<u16> {
        self.bus.read_reg(reg)
    }

    /// Write an arbitrary register. Escape hatch for debugging surfaces.
    pub fn write_raw(&mut self, reg: RegAddr, value: u16) -> Result<()> {
        self.bus.write_reg(reg, value)
    }
}

fn check_index(index: u8, limit: u8) -> Result<()> {
    if index >= limit {
        return Err(DeviceError::IndexOutOfRange { index, limit });
    }
    Ok(())
}
