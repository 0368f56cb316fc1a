// Bit-level reading and writing for hex-encoded transmissions

pub mod hex;
pub mod stream;
pub mod writer;

pub use hex::{hex_digit_to_nibble, nibble_to_hex_digit};
pub use stream::{BitStream, StreamError, BITS_PER_HEX_DIGIT, MAX_READ_BITS};
pub use writer::BitWriter;
