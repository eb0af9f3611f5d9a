use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::link::Link;

/// Character-device link.
///
/// Wraps a kernel character device (for example an FTDI FIFO exposed by a
/// vendor driver) as a [`Link`]. Opening either yields a usable link or
/// fails atomically; no half-initialized handle is retained. Single
/// transfers are capped at a configurable chunk size so oversized requests
/// degrade into partial transfers instead of driver-dependent behavior.
pub struct CharDevLink {
    file: File,
    path: PathBuf,
    chunk_bytes: usize,
}

impl CharDevLink {
    /// Default cap for a single read or write transfer.
    pub const DEFAULT_CHUNK_BYTES: usize = 1024;

    /// Open the device node read/write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        info!(?path, "opened character-device link");

        Ok(Self {
            file,
            path,
            chunk_bytes: Self::DEFAULT_CHUNK_BYTES,
        })
    }

    /// Override the single-transfer cap. Values below one word are clamped.
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(2);
        self
    }

    /// Path this link was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the link, releasing the device node.
    pub fn close(self) -> Result<()> {
        info!(path = ?self.path, "closing character-device link");
        drop(self.file);
        Ok(())
    }
}

impl Link for CharDevLink {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        let cap = buf.len().min(self.chunk_bytes);
        let written = self.file.write(&buf[..cap])?;
        debug!(written, offered = buf.len(), "link send");
        Ok(written)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let cap = buf.len().min(self.chunk_bytes);
        let read = self.file.read(&mut buf[..cap])?;
        debug!(read, requested = buf.len(), "link recv");
        Ok(read)
    }
}

impl std::fmt::Debug for CharDevLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharDevLink")
            .field("path", &self.path)
            .field("chunk_bytes", &self.chunk_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_device_fails_atomically() {
        let err = CharDevLink::open("/nonexistent/faout0").unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn null_device_round_trips_writes() {
        // /dev/null accepts everything and reads back nothing, which is
        // exactly the partial-read contract a dry link exhibits.
        let mut link = CharDevLink::open("/dev/null").expect("/dev/null should open");
        assert_eq!(link.send(&[1, 2, 3, 4]).expect("write should succeed"), 4);

        let mut buf = [0u8; 4];
        assert_eq!(link.recv(&mut buf).expect("read should succeed"), 0);
    }

    #[cfg(unix)]
    #[test]
    fn chunk_cap_limits_single_transfer() {
        let mut link = CharDevLink::open("/dev/zero")
            .expect("/dev/zero should open")
            .with_chunk_bytes(4);

        let mut buf = [0xFFu8; 16];
        let n = link.recv(&mut buf).expect("read should succeed");
        assert_eq!(n, 4);
        assert_eq!(&buf[..4], &[0, 0, 0, 0]);
        assert_eq!(buf[4], 0xFF);
    }
}
