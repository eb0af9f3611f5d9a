/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Link-level error (partial write, read timeout, I/O).
    #[error("transport error: {0}")]
    Transport(#[from] faout_transport::TransportError),

    /// Malformed command or response at the codec level.
    #[error("protocol error: {0}")]
    Proto(#[from] faout_proto::ProtoError),

    /// A channel or bit index outside the valid range.
    #[error("index {index} out of range (limit {limit})")]
    IndexOutOfRange { index: u8, limit: u8 },

    /// Not enough data in SDRAM for the requested read.
    #[error("not enough data in sdram ({requested} words requested, {available} available)")]
    BufferUnderflow { requested: u32, available: u32 },

    /// Too much data for the remaining SDRAM space.
    #[error("too much data for sdram ({requested} words, {free} free)")]
    BufferOverflow { requested: u64, free: u32 },

    /// The device reported a pointer pair that violates the buffer
    /// invariant `read_ptr <= write_ptr <= capacity`.
    #[error("inconsistent sdram pointers (read {read_ptr}, write {write_ptr})")]
    InconsistentPointers { read_ptr: u32, write_ptr: u32 },
}

pub type Result<T> = std::result::Result<T, DeviceError>;
