use std::path::PathBuf;

/// Errors that can occur on the instrument byte link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the link device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The link accepted fewer bytes than offered.
    #[error("partial write ({written} of {expected} bytes accepted)")]
    PartialWrite { written: usize, expected: usize },

    /// The bounded-retry read loop exhausted its attempts.
    #[error("read timeout ({got} of {wanted} bytes after {attempts} attempts)")]
    ReadTimeout {
        wanted: usize,
        got: usize,
        attempts: u32,
    },

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
