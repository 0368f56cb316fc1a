// Packet decoding, evaluation and checksum

pub mod encoder;
pub mod error;
pub mod eval;
pub mod parser;
pub mod types;
pub mod versions;

pub use encoder::encode;
pub use error::{ErrorCategory, PacketError, Result};
pub use eval::evaluate;
pub use parser::{decode, parse_packet, PacketParser, ParseOptions};
pub use types::{LengthType, Operator, Packet, LITERAL_TYPE_ID};
pub use versions::{iter_version_numbers, version_sum, VersionNumbers};

use crate::bitwise::BitStream;
use num_bigint::BigUint;

/// The two results produced for a transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Sum of every packet's version
    pub version_sum: u64,
    /// Value of the outermost packet's expression
    pub value: BigUint,
}

impl Summary {
    pub fn of(packet: &Packet) -> Result<Self> {
        Ok(Self {
            version_sum: version_sum(packet),
            value: evaluate(packet)?,
        })
    }
}

/// Decode a stream with `options` and compute its checksum and value
pub fn summarize_stream(stream: &mut BitStream, options: ParseOptions) -> Result<Summary> {
    let packet = PacketParser::new(options).parse(stream)?;
    Summary::of(&packet)
}

/// Decode a hex transmission and compute its checksum and value
pub fn summarize(hex: &str) -> Result<Summary> {
    Summary::of(&decode(hex)?)
}
