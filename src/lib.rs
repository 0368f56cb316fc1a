// PACKET-DECODER: hex transmission decoder and expression evaluator
// Copyright 2024 - Licensed under GPLv3

pub mod bitwise;
pub mod formats;
pub mod packet;

// Re-export commonly used types
pub use bitwise::{BitStream, BitWriter, StreamError};
pub use formats::{load_transmission, TransmissionError};
pub use packet::{
    decode, encode, evaluate, iter_version_numbers, parse_packet, summarize, version_sum,
    ErrorCategory, LengthType, Operator, Packet, PacketError, PacketParser, ParseOptions, Summary,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
