//! SDRAM pointer bookkeeping.
//!
//! The on-board sample buffer is a bounded *linear* region: 32-bit read and
//! write pointers advance monotonically through a fixed address space and
//! are only ever reset by the explicit rewind/clear commands, never by
//! modulo arithmetic. Free space is therefore measured from the write
//! pointer to the end of the region, not from the amount of unread data.

use crate::error::{DeviceError, Result};
use crate::regmap::SDRAM_CAPACITY;

/// Snapshot of the SDRAM read/write pointer pair.
///
/// Assembled from two 16-bit register reads per pointer and validated
/// against the buffer invariant `read_ptr <= write_ptr <= capacity`.
/// Always queried fresh; never cached between operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerPair {
    pub read_ptr: u32,
    pub write_ptr: u32,
}

impl PointerPair {
    /// Validate a pointer pair reported by the device.
    pub fn new(read_ptr: u32, write_ptr: u32) -> Result<Self> {
        if read_ptr > write_ptr || write_ptr > SDRAM_CAPACITY {
            return Err(DeviceError::InconsistentPointers {
                read_ptr,
                write_ptr,
            });
        }
        Ok(Self {
            read_ptr,
            write_ptr,
        })
    }

    /// Words buffered and not yet read.
    pub fn available(&self) -> u32 {
        self.write_ptr - self.read_ptr
    }

    /// Words that can still be written before the region is exhausted.
    pub fn free_space(&self) -> u32 {
        SDRAM_CAPACITY - self.write_ptr
    }
}

/// Join the low/high register halves of a 32-bit pointer.
pub fn join_halves(lo: u16, hi: u16) -> u32 {
    (hi as u32) << 16 | lo as u32
}
