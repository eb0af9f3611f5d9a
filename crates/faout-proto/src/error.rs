/// Errors that can occur while encoding or decoding command words.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// A register address or port exceeds the 6-bit field.
    #[error("register address out of range (addr={addr}, port={port}, max 63)")]
    AddrOutOfRange { addr: u8, port: u8 },

    /// A single command cannot carry this many words.
    #[error("chunk of {words} words does not fit the 16-bit count field (max 65535)")]
    ChunkTooLarge { words: usize },

    /// The header word carries an opcode nibble the protocol does not define.
    #[error("unknown opcode nibble {0:#x}")]
    BadOpcode(u8),

    /// A response byte sequence is not a whole number of 16-bit words.
    #[error("response of {len} bytes is not a whole number of 16-bit words")]
    OddByteCount { len: usize },

    /// A response carried a different word count than requested.
    #[error("response carried {got} words, expected {expected}")]
    WordCountMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, ProtoError>;
