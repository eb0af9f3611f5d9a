use crate::error::{Result, TransportError};

/// A synchronous byte-stream link to the instrument.
///
/// Both operations have explicit partial-transfer semantics: `send` may
/// accept fewer bytes than offered, `recv` may deliver fewer bytes than
/// requested (including zero when nothing is pending). The protocol layer
/// owns the policy for dealing with short transfers.
///
/// A link carries exactly one half-duplex command stream. Callers must not
/// interleave commands from multiple owners on the same link.
pub trait Link {
    /// Offer `buf` to the link. Returns the number of bytes accepted.
    fn send(&mut self, buf: &[u8]) -> Result<usize>;

    /// Read up to `buf.len()` bytes into `buf`. Returns the number of bytes
    /// delivered; zero means nothing was pending.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).recv(buf)
    }
}

impl<L: Link + ?Sized> Link for &mut L {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).recv(buf)
    }
}

/// Offer the whole buffer in a single `send` call.
///
/// The command protocol requires packets to be accepted atomically; a short
/// write leaves the device mid-packet, so it is surfaced immediately as
/// [`TransportError::PartialWrite`] rather than retried here. Callers that
/// want to retry must re-issue the whole operation.
pub fn send_all<L: Link + ?Sized>(link: &mut L, buf: &[u8]) -> Result<()> {
    let written = link.send(buf)?;
    if written != buf.len() {
        return Err(TransportError::PartialWrite {
            written,
            expected: buf.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HalfAcceptingLink;

    impl Link for HalfAcceptingLink {
        fn send(&mut self, buf: &[u8]) -> Result<usize> {
            Ok(buf.len() / 2)
        }

        fn recv(&mut self, _buf: &mut [u8]) -> Result<usize> {
            Ok(0)
        }
    }

    struct EagerLink {
        sent: Vec<u8>,
    }

    impl Link for EagerLink {
        fn send(&mut self, buf: &[u8]) -> Result<usize> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn recv(&mut self, _buf: &mut [u8]) -> Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn send_all_accepts_full_buffer() {
        let mut link = EagerLink { sent: Vec::new() };
        send_all(&mut link, &[1, 2, 3, 4]).expect("full write should succeed");
        assert_eq!(link.sent, vec![1, 2, 3, 4]);
    }

    #[test]
    fn send_all_surfaces_partial_write() {
        let mut link = HalfAcceptingLink;
        let err = send_all(&mut link, &[0u8; 8]).unwrap_err();
        assert!(matches!(
            err,
            TransportError::PartialWrite {
                written: 4,
                expected: 8
            }
        ));
    }

    #[test]
    fn boxed_link_forwards() {
        let mut link: Box<dyn Link> = Box::new(EagerLink { sent: Vec::new() });
        send_all(&mut link, b"ok").expect("boxed link should forward");
    }
}
