// Forward-only bit stream over a hex-encoded transmission

use super::hex::pack_hex;
use nom::{bits::complete::take, IResult};
use std::fmt;
use thiserror::Error;

/// Widest single read supported by [`BitStream::read`]
pub const MAX_READ_BITS: usize = 64;

/// Bits contributed by each hex digit of a transmission
pub const BITS_PER_HEX_DIGIT: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Invalid hex digit {ch:?} at index {index} (bit {bit})", bit = .index * BITS_PER_HEX_DIGIT)]
    InvalidHexDigit { ch: char, index: usize },

    #[error("Read of {requested} bits at bit {position} exceeds the {remaining} bits remaining")]
    OutOfBits {
        requested: usize,
        remaining: usize,
        position: usize,
    },

    #[error("Read of {requested} bits at bit {position} is wider than {max} bits", max = MAX_READ_BITS)]
    ReadTooWide { requested: usize, position: usize },
}

pub type Result<T> = std::result::Result<T, StreamError>;

type BitInput<'a> = (&'a [u8], usize);

fn take_bits(input: BitInput<'_>, count: usize) -> IResult<BitInput<'_>, u64> {
    take(count)(input)
}

/// A sequence of bits with a cursor that only moves forward.
///
/// Bits are stored packed, most significant bit first. The cursor never
/// exceeds the bit length and every read is big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<u8>,
    len: usize,
    cursor: usize,
}

impl BitStream {
    /// Build a stream from hex text; every digit expands to exactly 4 bits
    pub fn from_hex(text: &str) -> Result<Self> {
        let data =
            pack_hex(text).map_err(|(ch, index)| StreamError::InvalidHexDigit { ch, index })?;
        let len = text.chars().count() * BITS_PER_HEX_DIGIT;

        Ok(Self {
            data,
            len,
            cursor: 0,
        })
    }

    /// Build a stream from packed bytes holding `len` meaningful bits
    pub(crate) fn from_packed(data: Vec<u8>, len: usize) -> Self {
        debug_assert!(len <= data.len() * 8);
        Self {
            data,
            len,
            cursor: 0,
        }
    }

    /// Consume the next `n` bits as a big-endian unsigned integer.
    ///
    /// A zero-width read returns 0 and leaves the cursor where it is.
    pub fn read(&mut self, n: usize) -> Result<u64> {
        if n == 0 {
            return Ok(0);
        }
        if n > MAX_READ_BITS {
            return Err(StreamError::ReadTooWide {
                requested: n,
                position: self.cursor,
            });
        }

        let remaining = self.remaining();
        let out_of_bits = StreamError::OutOfBits {
            requested: n,
            remaining,
            position: self.cursor,
        };
        if n > remaining {
            return Err(out_of_bits);
        }

        let input = (&self.data[self.cursor / 8..], self.cursor % 8);
        let (_, value) = take_bits(input, n).map_err(|_| out_of_bits)?;
        self.cursor += n;

        Ok(value)
    }

    /// Consume a single bit
    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read(1)? == 1)
    }

    /// Bits left unconsumed
    pub fn remaining(&self) -> usize {
        self.len - self.cursor
    }

    /// Current cursor offset from the start, in bits
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Total number of bits in the stream
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once every bit has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.len
    }

    /// Render every bit of the stream as '0'/'1', ignoring the cursor
    pub fn to_bit_string(&self) -> String {
        (0..self.len)
            .map(|i| {
                if (self.data[i / 8] >> (7 - i % 8)) & 1 == 1 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect()
    }
}

impl fmt::Display for BitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitStream({} of {} bits consumed)", self.cursor, self.len)
    }
}
