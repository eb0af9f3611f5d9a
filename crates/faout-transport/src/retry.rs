use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::link::Link;

/// Bounded-retry budget for blocking reads.
///
/// The link delivers response bytes whenever the device has produced them;
/// a response to a just-issued command may arrive in several short pieces.
/// Reads are retried with a fixed inter-attempt delay up to `max_attempts`
/// times, after which the read fails deterministically. Worst-case wait is
/// `max_attempts * interval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the initial read.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(100),
        }
    }
}

/// Sleep capability, injectable so tests run without wall-clock delay.
pub trait Sleep {
    fn sleep(&mut self, duration: Duration);
}

/// Real sleeper backed by `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// No-op sleeper for tests; records how often it was invoked.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSleep {
    pub slept: u32,
}

impl Sleep for NoopSleep {
    fn sleep(&mut self, _duration: Duration) {
        self.slept += 1;
    }
}

/// Fill `buf` completely, accumulating possibly short reads.
///
/// Issues an initial `recv`, then retries per `policy` while sleeping
/// between attempts. Fails with [`TransportError::ReadTimeout`] if the
/// buffer is still short once the retry budget is exhausted.
pub fn recv_exact<L, S>(
    link: &mut L,
    buf: &mut [u8],
    policy: &RetryPolicy,
    sleeper: &mut S,
) -> Result<()>
where
    L: Link + ?Sized,
    S: Sleep,
{
    let wanted = buf.len();
    let mut got = link.recv(buf)?;
    let mut attempts = 0;

    while got < wanted && attempts < policy.max_attempts {
        sleeper.sleep(policy.interval);
        got += link.recv(&mut buf[got..])?;
        attempts += 1;
    }

    if got < wanted {
        return Err(TransportError::ReadTimeout {
            wanted,
            got,
            attempts,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Delivers pre-scripted byte pieces, one per `recv` call.
    struct ScriptedLink {
        pieces: VecDeque<Vec<u8>>,
    }

    impl ScriptedLink {
        fn new(pieces: &[&[u8]]) -> Self {
            Self {
                pieces: pieces.iter().map(|p| p.to_vec()).collect(),
            }
        }
    }

    impl Link for ScriptedLink {
        fn send(&mut self, buf: &[u8]) -> Result<usize> {
            Ok(buf.len())
        }

        fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
            match self.pieces.pop_front() {
                Some(piece) => {
                    let n = piece.len().min(buf.len());
                    buf[..n].copy_from_slice(&piece[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn single_delivery_needs_no_retry() {
        let mut link = ScriptedLink::new(&[&[0xAB, 0xCD]]);
        let mut sleeper = NoopSleep::default();
        let mut buf = [0u8; 2];

        recv_exact(&mut link, &mut buf, &RetryPolicy::default(), &mut sleeper)
            .expect("complete delivery should succeed");

        assert_eq!(buf, [0xAB, 0xCD]);
        assert_eq!(sleeper.slept, 0);
    }

    #[test]
    fn accumulates_across_partial_deliveries() {
        let mut link = ScriptedLink::new(&[&[0x12], &[0x34]]);
        let mut sleeper = NoopSleep::default();
        let mut buf = [0u8; 2];

        recv_exact(&mut link, &mut buf, &RetryPolicy::default(), &mut sleeper)
            .expect("two-piece delivery should succeed");

        assert_eq!(buf, [0x12, 0x34]);
        assert_eq!(sleeper.slept, 1);
    }

    #[test]
    fn times_out_after_budget() {
        let mut link = ScriptedLink::new(&[&[0x12]]);
        let mut sleeper = NoopSleep::default();
        let policy = RetryPolicy {
            max_attempts: 3,
            interval: Duration::from_millis(1),
        };
        let mut buf = [0u8; 4];

        let err = recv_exact(&mut link, &mut buf, &policy, &mut sleeper).unwrap_err();

        assert!(matches!(
            err,
            TransportError::ReadTimeout {
                wanted: 4,
                got: 1,
                attempts: 3
            }
        ));
        assert_eq!(sleeper.slept, 3);
    }

    #[test]
    fn empty_request_is_immediate() {
        let mut link = ScriptedLink::new(&[]);
        let mut sleeper = NoopSleep::default();
        let mut buf = [0u8; 0];

        recv_exact(&mut link, &mut buf, &RetryPolicy::default(), &mut sleeper)
            .expect("zero-byte read should be a no-op");
        assert_eq!(sleeper.slept, 0);
    }
}
