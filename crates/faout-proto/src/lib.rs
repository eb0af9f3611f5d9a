//! Command-word codec for the FAOUT register protocol.
//!
//! Every command is a sequence of 16-bit big-endian words: a header word
//! carrying opcode, block address, and port, optionally followed by a count
//! word and payload words. Responses are bare word sequences with no framing
//! or checksum; the link is trusted for ordering and completeness.
//!
//! The codec is pure: it never performs I/O and never splits transfers.
//! Chunking around the 16-bit count field belongs to the bulk layer in
//! `faout-device`.

pub mod codec;
pub mod error;

pub use codec::{
    decode_header, decode_words, encode_header, encode_read_reg, encode_read_reg_n,
    encode_write_reg, encode_write_reg_n, Opcode, RegAddr, MAX_CHUNK_WORDS, WORD_BYTES,
};
pub use error::{ProtoError, Result};
