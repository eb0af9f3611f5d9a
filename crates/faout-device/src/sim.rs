//! Soft FAOUT model.
//!
//! An in-memory rendition of the instrument behind the same [`Link`] trait
//! the hardware uses: command packets are parsed incrementally from an
//! inbox, applied to modelled register state, and response bytes queued in
//! an outbox. The model mirrors the hardware contract the driver relies on
//! (monotonic SDRAM pointers, explicit rewind/clear, half-duplex
//! request/response) and exposes its decoded command log so tests can
//! assert exactly which packets a driver operation produced.

use std::collections::VecDeque;

use bytes::{Buf, BytesMut};

use faout_proto::{decode_header, Opcode, RegAddr, WORD_BYTES};
use faout_transport::{Link, Result as TransportResult};

use crate::regmap::{
    CMD_BIT_RESET, CMD_BIT_SDRAM_CLEAR, CMD_BIT_SDRAM_REWIND, CMD_BIT_SEQ_START,
    CMD_BIT_SEQ_STOP, NUM_CHANNELS, REG_SDRAM_DATA, SDRAM_CAPACITY,
};

/// Firmware version the model reports.
pub const SIM_VERSION: u16 = 0x0104;

/// A command the model decoded from its inbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimCommand {
    ReadReg(RegAddr),
    WriteReg(RegAddr, u16),
    ReadRegN(RegAddr, u16),
    WriteRegN(RegAddr, u16),
}

/// In-memory FAOUT instrument.
pub struct SimLink {
    inbox: BytesMut,
    outbox: VecDeque<u8>,
    commands: Vec<SimCommand>,
    /// Cap on bytes delivered per `recv` call, to exercise retry loops.
    max_recv: usize,

    config: u16,
    running: bool,
    comm_error: bool,
    dac: [u16; NUM_CHANNELS as usize],
    interp_value: [u16; NUM_CHANNELS as usize],
    interp_steps: [u16; NUM_CHANNELS as usize],

    /// Words retained since the last clear; `sdram[i]` sits at address
    /// `sdram_base + i`.
    sdram: Vec<u16>,
    sdram_base: u32,
    rd_ptr: u32,
}

impl SimLink {
    pub fn new() -> Self {
        Self {
            inbox: BytesMut::new(),
            outbox: VecDeque::new(),
            commands: Vec::new(),
            max_recv: usize::MAX,
            config: 0,
            running: false,
            comm_error: false,
            dac: [0; NUM_CHANNELS as usize],
            interp_value: [0; NUM_CHANNELS as usize],
            interp_steps: [0; NUM_CHANNELS as usize],
            sdram: Vec::new(),
            sdram_base: 0,
            rd_ptr: 0,
        }
    }

    /// Limit how many bytes a single `recv` delivers.
    pub fn with_max_recv(mut self, max_recv: usize) -> Self {
        self.max_recv = max_recv.max(1);
        self
    }

    /// Commands decoded so far, in arrival order.
    pub fn commands(&self) -> &[SimCommand] {
        &self.commands
    }

    /// Forget the command log (keeps all device state).
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Preset the pointer pair without buffering data.
    ///
    /// Reads past the presented write pointer still return zero words; this
    /// exists so flow-control paths near capacity can be exercised without
    /// materializing megabytes of samples.
    pub fn set_sdram_pointers(&mut self, read_ptr: u32, write_ptr: u32) {
        self.sdram.clear();
        self.sdram_base = write_ptr;
        self.rd_ptr = read_ptr;
    }

    fn wr_ptr(&self) -> u32 {
        self.sdram_base + self.sdram.len() as u32
    }

    fn status_word(&self) -> u16 {
        let state: u16 = if self.running { 0b010 } else { 0b001 };
        let mut word = state;
        if self.running {
            word |= 1 << 3;
        }
        // The playback FIFO drains instantly in the model.
        word |= 1 << 5;
        if self.wr_ptr() == self.rd_ptr {
            word |= 1 << 6;
        }
        if self.wr_ptr() >= SDRAM_CAPACITY {
            word |= 1 << 7;
        }
        if self.comm_error {
            word |= 1 << 9;
        }
        word
    }

    fn apply_cmd_bits(&mut self, value: u16) {
        if value & (1 << CMD_BIT_RESET) != 0 {
            self.running = false;
            self.comm_error = false;
            self.config = 0;
            self.dac = [0; NUM_CHANNELS as usize];
            self.interp_value = [0; NUM_CHANNELS as usize];
            self.interp_steps = [0; NUM_CHANNELS as usize];
            self.sdram.clear();
            self.sdram_base = 0;
            self.rd_ptr = 0;
        }
        if value & (1 << CMD_BIT_SEQ_START) != 0 {
            self.running = true;
        }
        if value & (1 << CMD_BIT_SEQ_STOP) != 0 {
            self.running = false;
        }
        if value & (1 << CMD_BIT_SDRAM_REWIND) != 0 {
            self.rd_ptr = 0;
        }
        if value & (1 << CMD_BIT_SDRAM_CLEAR) != 0 {
            self.sdram.clear();
            self.sdram_base = 0;
            self.rd_ptr = 0;
        }
    }

    fn reg_read(&mut self, reg: RegAddr) -> u16 {
        match (reg.addr(), reg.port()) {
            (0, 1) => self.status_word(),
            (0, 2) => self.config,
            (0, 3) => SIM_VERSION,
            (1, 0) => self.rd_ptr as u16,
            (1, 1) => (self.rd_ptr >> 16) as u16,
            (1, 2) => self.wr_ptr() as u16,
            (1, 3) => (self.wr_ptr() >> 16) as u16,
            (1, 4) => self.sdram_pop(),
            (2, p) if p < NUM_CHANNELS => self.dac[p as usize],
            (3, p) if p < NUM_CHANNELS => self.interp_value[p as usize],
            (3, p) if p >= 6 && p < 6 + NUM_CHANNELS => self.interp_steps[(p - 6) as usize],
            _ => 0,
        }
    }

    fn reg_write(&mut self, reg: RegAddr, value: u16) {
        match (reg.addr(), reg.port()) {
            (0, 0) => self.apply_cmd_bits(value),
            (0, 2) => self.config = value,
            (2, p) if p < NUM_CHANNELS => self.dac[p as usize] = value,
            (3, p) if p < NUM_CHANNELS => self.interp_value[p as usize] = value,
            (3, p) if p >= 6 && p < 6 + NUM_CHANNELS => {
                self.interp_steps[(p - 6) as usize] = value;
            }
            _ => {}
        }
    }

    fn sdram_pop(&mut self) -> u16 {
        if self.rd_ptr >= self.wr_ptr() {
            // Dry read; the pointer never passes the write pointer.
            return 0;
        }
        let word = self
            .rd_ptr
            .checked_sub(self.sdram_base)
            .and_then(|idx| self.sdram.get(idx as usize))
            .copied()
            .unwrap_or(0);
        self.rd_ptr += 1;
        word
    }

    fn sdram_push(&mut self, word: u16) {
        if self.wr_ptr() < SDRAM_CAPACITY {
            self.sdram.push(word);
        }
    }

    fn push_word(&mut self, word: u16) {
        self.outbox.extend(word.to_be_bytes());
    }

    /// Decode and apply every complete packet currently in the inbox.
    fn pump(&mut self) {
        loop {
            if self.inbox.len() < WORD_BYTES {
                return;
            }
            let header = u16::from_be_bytes([self.inbox[0], self.inbox[1]]);
            let (op, reg) = match decode_header(header) {
                Ok(decoded) => decoded,
                Err(_) => {
                    self.comm_error = true;
                    self.inbox.advance(WORD_BYTES);
                    continue;
                }
            };

            match op {
                Opcode::ReadReg => {
                    self.inbox.advance(WORD_BYTES);
                    let value = self.reg_read(reg);
                    self.push_word(value);
                    self.commands.push(SimCommand::ReadReg(reg));
                }
                Opcode::WriteReg => {
                    if self.inbox.len() < 2 * WORD_BYTES {
                        return;
                    }
                    let value = u16::from_be_bytes([self.inbox[2], self.inbox[3]]);
                    self.inbox.advance(2 * WORD_BYTES);
                    self.reg_write(reg, value);
                    self.commands.push(SimCommand::WriteReg(reg, value));
                }
                Opcode::ReadRegN => {
                    if self.inbox.len() < 2 * WORD_BYTES {
                        return;
                    }
                    let count = u16::from_be_bytes([self.inbox[2], self.inbox[3]]);
                    self.inbox.advance(2 * WORD_BYTES);
                    for _ in 0..count {
                        let word = if reg == REG_SDRAM_DATA {
                            self.sdram_pop()
                        } else {
                            self.reg_read(reg)
                        };
                        self.push_word(word);
                    }
                    self.commands.push(SimCommand::ReadRegN(reg, count));
                }
                Opcode::WriteRegN => {
                    if self.inbox.len() < 2 * WORD_BYTES {
                        return;
                    }
                    let count = u16::from_be_bytes([self.inbox[2], self.inbox[3]]) as usize;
                    let packet_len = (2 + count) * WORD_BYTES;
                    if self.inbox.len() < packet_len {
                        return;
                    }
                    for i in 0..count {
                        let at = (2 + i) * WORD_BYTES;
                        let word = u16::from_be_bytes([self.inbox[at], self.inbox[at + 1]]);
                        if reg == REG_SDRAM_DATA {
                            self.sdram_push(word);
                        } else {
                            self.reg_write(reg, word);
                        }
                    }
                    self.inbox.advance(packet_len);
                    self.commands.push(SimCommand::WriteRegN(reg, count as u16));
                }
            }
        }
    }
}

impl Default for SimLink {
    fn default() -> Self {
        Self::new()
    }
}

impl Link for SimLink {
    fn send(&mut self, buf: &[u8]) -> TransportResult<usize> {
        self.inbox.extend_from_slice(buf);
        self.pump();
        Ok(buf.len())
    }

    fn recv(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        let n = buf.len().min(self.max_recv).min(self.outbox.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.outbox.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl std::fmt::Debug for SimLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimLink")
            .field("rd_ptr", &self.rd_ptr)
            .field("wr_ptr", &self.wr_ptr())
            .field("running", &self.running)
            .field("pending_out", &self.outbox.len())
            .finish()
    }
}
