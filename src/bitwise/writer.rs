// MSB-first bit writer, the counterpart of BitStream

use super::hex::nibble_to_hex_digit;
use super::stream::{BitStream, BITS_PER_HEX_DIGIT, MAX_READ_BITS};

/// Accumulates bits most significant first into a packed byte buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitWriter {
    buf: Vec<u8>,
    len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single bit
    pub fn push_bit(&mut self, bit: bool) {
        let offset = self.len % 8;
        if offset == 0 {
            self.buf.push(0);
        }
        if bit {
            if let Some(last) = self.buf.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.len += 1;
    }

    /// Append the low `width` bits of `value`, most significant first.
    /// Bits of `value` above `width` are dropped.
    pub fn push(&mut self, value: u64, width: usize) {
        debug_assert!(width <= MAX_READ_BITS);
        for shift in (0..width).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
    }

    /// Overwrite `width` bits starting at bit `offset` with the low bits of
    /// `value`, most significant first. The span must already be written.
    pub fn patch(&mut self, offset: usize, value: u64, width: usize) {
        debug_assert!(offset + width <= self.len);
        for (i, shift) in (0..width).rev().enumerate() {
            let index = offset + i;
            let mask = 0x80 >> (index % 8);
            if (value >> shift) & 1 == 1 {
                self.buf[index / 8] |= mask;
            } else {
                self.buf[index / 8] &= !mask;
            }
        }
    }

    /// Append every bit written to `other`
    pub fn append(&mut self, other: &BitWriter) {
        for i in 0..other.len {
            self.push_bit((other.buf[i / 8] >> (7 - i % 8)) & 1 == 1);
        }
    }

    /// Number of bits written so far
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zero-pad up to the next hex digit boundary
    pub fn pad_to_hex_digit(&mut self) {
        while self.len % BITS_PER_HEX_DIGIT != 0 {
            self.push_bit(false);
        }
    }

    /// Render as hex text, zero-padding the final digit if needed
    pub fn to_hex(&self) -> String {
        let digits = (self.len + BITS_PER_HEX_DIGIT - 1) / BITS_PER_HEX_DIGIT;
        (0..digits)
            .map(|i| {
                let byte = self.buf[i / 2];
                let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
                nibble_to_hex_digit(nibble)
            })
            .collect()
    }

    /// Turn the written bits into a readable stream, without padding
    pub fn into_stream(self) -> BitStream {
        BitStream::from_packed(self.buf, self.len)
    }
}
