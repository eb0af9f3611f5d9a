use bytes::BytesMut;
use tracing::{debug, trace};

use faout_proto::{
    decode_words, encode_read_reg, encode_read_reg_n, encode_write_reg, encode_write_reg_n,
    ProtoError, RegAddr, MAX_CHUNK_WORDS, WORD_BYTES,
};
use faout_transport::{recv_exact, send_all, Link, RetryPolicy, Sleep, ThreadSleep};

use crate::error::Result;

/// Half-duplex command channel to the instrument.
///
/// Owns the link exclusively; every operation takes `&mut self`, so at most
/// one command is in flight and its response is fully consumed before the
/// next command is issued. Single-register operations map to one packet
/// each; bulk operations split transfers into chunks that fit the
/// protocol's 16-bit count field, issued strictly sequentially.
pub struct Bus<L: Link, S: Sleep = ThreadSleep> {
    link: L,
    retry: RetryPolicy,
    sleeper: S,
}

impl<L: Link> Bus<L> {
    /// Wrap a link with the default retry policy and a real sleeper.
    pub fn new(link: L) -> Self {
        Self::with_parts(link, RetryPolicy::default(), ThreadSleep)
    }
}

impl<L: Link, S: Sleep> Bus<L, S> {
    /// Wrap a link with an explicit retry policy and sleep capability.
    pub fn with_parts(link: L, retry: RetryPolicy, sleeper: S) -> Self {
        Self {
            link,
            retry,
            sleeper,
        }
    }

    /// Read a single register.
    pub fn read_reg(&mut self, reg: RegAddr) -> Result<u16> {
        let mut pkt = BytesMut::with_capacity(WORD_BYTES);
        encode_read_reg(reg, &mut pkt);
        send_all(&mut self.link, &pkt)?;

        let mut resp = [0u8; WORD_BYTES];
        recv_exact(&mut self.link, &mut resp, &self.retry, &mut self.sleeper)?;

        let value = u16::from_be_bytes(resp);
        trace!(%reg, value, "read_reg");
        Ok(value)
    }

    /// Write a single register. No response is expected or read.
    pub fn write_reg(&mut self, reg: RegAddr, value: u16) -> Result<()> {
        let mut pkt = BytesMut::with_capacity(2 * WORD_BYTES);
        encode_write_reg(reg, value, &mut pkt);
        send_all(&mut self.link, &pkt)?;
        trace!(%reg, value, "write_reg");
        Ok(())
    }

    /// Stream an arbitrarily long word sequence to a register.
    ///
    /// Chunks preserve order and each packet must be accepted in full; a
    /// short write surfaces immediately without issuing further chunks.
    pub fn write_reg_n(&mut self, reg: RegAddr, data: &[u16]) -> Result<()> {
        for chunk in data.chunks(MAX_CHUNK_WORDS) {
            let mut pkt = BytesMut::with_capacity((2 + chunk.len()) * WORD_BYTES);
            encode_write_reg_n(reg, chunk, &mut pkt)?;
            send_all(&mut self.link, &pkt)?;
        }
        debug!(%reg, words = data.len(), "write_reg_n");
        Ok(())
    }

    /// Stream `count` words out of a register.
    ///
    /// Each chunk request is followed by a bounded-retry blocking read of
    /// exactly the chunk's byte length; a shortfall after the retry budget
    /// is a read timeout, so the returned sequence always has `count` words.
    pub fn read_reg_n(&mut self, reg: RegAddr, count: u32) -> Result<Vec<u16>> {
        let mut out = Vec::with_capacity(count as usize);
        let mut remaining = count;

        while remaining > 0 {
            let chunk = remaining.min(MAX_CHUNK_WORDS as u32) as u16;
            let mut pkt = BytesMut::with_capacity(2 * WORD_BYTES);
            encode_read_reg_n(reg, chunk, &mut pkt);
            send_all(&mut self.link, &pkt)?;

            let mut resp = vec![0u8; chunk as usize * WORD_BYTES];
            recv_exact(&mut self.link, &mut resp, &self.retry, &mut self.sleeper)?;

            let words = decode_words(&resp)?;
            if words.len() != chunk as usize {
                return Err(ProtoError::WordCountMismatch {
                    expected: chunk as usize,
                    got: words.len(),
                }
                .into());
            }
            out.extend_from_slice(&words);
            remaining -= chunk as u32;
        }

        debug!(%reg, words = out.len(), "read_reg_n");
        Ok(out)
    }

    /// Borrow the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Consume the bus and return the link.
    pub fn into_link(self) -> L {
        self.link
    }

    /// The retry policy applied to blocking reads.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use faout_transport::{NoopSleep, Result as TransportResult, TransportError};

    use super::*;

    /// Records every packet sent and serves pre-scripted response pieces.
    struct ScriptedLink {
        packets: Vec<Vec<u8>>,
        responses: VecDeque<Vec<u8>>,
    }

    impl ScriptedLink {
        fn new(responses: &[&[u8]]) -> Self {
            Self {
                packets: Vec::new(),
                responses: responses.iter().map(|r| r.to_vec()).collect(),
            }
        }
    }

    impl Link for ScriptedLink {
        fn send(&mut self, buf: &[u8]) -> TransportResult<usize> {
            self.packets.push(buf.to_vec());
            Ok(buf.len())
        }

        fn recv(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
            match self.responses.pop_front() {
                Some(piece) => {
                    let n = piece.len().min(buf.len());
                    buf[..n].copy_from_slice(&piece[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }
    }

    fn quiet_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            interval: std::time::Duration::from_millis(1),
        }
    }

    #[test]
    fn read_reg_sends_one_packet_and_decodes_response() {
        let link = ScriptedLink::new(&[&[0x12, 0x34]]);
        let mut bus = Bus::with_parts(link, quiet_policy(), NoopSleep::default());

        let value = bus
            .read_reg(RegAddr::new(0, 3))
            .expect("scripted read should succeed");

        assert_eq!(value, 0x1234);
        assert_eq!(bus.link().packets, vec![vec![0x10, 0x03]]);
    }

    #[test]
    fn read_reg_accumulates_split_response() {
        let link = ScriptedLink::new(&[&[0x12], &[0x34]]);
        let mut bus = Bus::with_parts(link, quiet_policy(), NoopSleep::default());

        let value = bus
            .read_reg(RegAddr::new(0, 3))
            .expect("split response should be accumulated");
        assert_eq!(value, 0x1234);
    }

    #[test]
    fn read_reg_times_out_on_silent_link() {
        let link = ScriptedLink::new(&[]);
        let mut bus = Bus::with_parts(link, quiet_policy(), NoopSleep::default());

        let err = bus.read_reg(RegAddr::new(0, 1)).unwrap_err();
        assert!(matches!(
            err,
            crate::DeviceError::Transport(TransportError::ReadTimeout { wanted: 2, .. })
        ));
    }

    #[test]
    fn write_reg_n_splits_into_max_sized_chunks() {
        let link = ScriptedLink::new(&[]);
        let mut bus = Bus::with_parts(link, quiet_policy(), NoopSleep::default());
        let data = vec![0xAAAAu16; MAX_CHUNK_WORDS + 10];

        bus.write_reg_n(RegAddr::new(1, 4), &data)
            .expect("chunked write should succeed");

        let packets = &bus.link().packets;
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].len(), (2 + MAX_CHUNK_WORDS) * WORD_BYTES);
        assert_eq!(packets[1].len(), (2 + 10) * WORD_BYTES);
        // Count field of the tail chunk.
        assert_eq!(&packets[1][2..4], &[0x00, 0x0A]);
    }

    #[test]
    fn write_reg_n_empty_sends_nothing() {
        let link = ScriptedLink::new(&[]);
        let mut bus = Bus::with_parts(link, quiet_policy(), NoopSleep::default());

        bus.write_reg_n(RegAddr::new(1, 4), &[])
            .expect("empty write is a no-op");
        assert!(bus.link().packets.is_empty());
    }

    #[test]
    fn read_reg_n_reassembles_chunked_response() {
        // Request 4 words; scripted link answers each 4-word chunk in full.
        let link = ScriptedLink::new(&[&[0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04]]);
        let mut bus = Bus::with_parts(link, quiet_policy(), NoopSleep::default());

        let words = bus
            .read_reg_n(RegAddr::new(1, 4), 4)
            .expect("bulk read should succeed");
        assert_eq!(words, vec![1, 2, 3, 4]);
    }

    #[test]
    fn partial_write_aborts_bulk_transfer() {
        struct StingyLink {
            calls: usize,
        }

        impl Link for StingyLink {
            fn send(&mut self, buf: &[u8]) -> TransportResult<usize> {
                self.calls += 1;
                Ok(buf.len() - 1)
            }

            fn recv(&mut self, _buf: &mut [u8]) -> TransportResult<usize> {
                Ok(0)
            }
        }

        let mut bus = Bus::with_parts(
            StingyLink { calls: 0 },
            quiet_policy(),
            NoopSleep::default(),
        );
        let err = bus.write_reg_n(RegAddr::new(1, 4), &[1, 2, 3]).unwrap_err();

        assert!(matches!(
            err,
            crate::DeviceError::Transport(TransportError::PartialWrite { .. })
        ));
        assert_eq!(bus.link().calls, 1);
    }
}
