use serde::Serialize;

/// Decoded STATUS register.
///
/// Pure view over the hardware bitfield; recomputed on every query and
/// never cached. Bit positions are fixed by the register map:
/// state code in bits 0..=2, then one flag per bit from 3 upward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    /// Sequencer state code (low 3 bits).
    pub state: u8,
    pub running: bool,
    pub fifo_full: bool,
    pub fifo_empty: bool,
    pub sdram_empty: bool,
    pub sdram_full: bool,
    pub seq_error: bool,
    pub comm_error: bool,
    pub clk_ext_locked: bool,
    pub clk_ext_selected: bool,
}

impl StatusFlags {
    /// Decode a raw STATUS register value.
    pub fn decode(value: u16) -> Self {
        Self {
            state: (value & 0x7) as u8,
            running: bit(value, 3),
            fifo_full: bit(value, 4),
            fifo_empty: bit(value, 5),
            sdram_empty: bit(value, 6),
            sdram_full: bit(value, 7),
            seq_error: bit(value, 8),
            comm_error: bit(value, 9),
            clk_ext_locked: bit(value, 10),
            clk_ext_selected: bit(value, 11),
        }
    }

    /// True if the device flags any error condition.
    pub fn has_error(&self) -> bool {
        self.seq_error || self.comm_error
    }
}

impl From<u16> for StatusFlags {
    fn from(value: u16) -> Self {
        Self::decode(value)
    }
}

fn bit(value: u16, n: u8) -> bool {
    value & (1 << n) != 0
}
