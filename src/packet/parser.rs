// Decoder from a BitStream into a Packet tree

use super::error::{PacketError, Result};
use super::types::{LengthType, Operator, Packet};
use crate::bitwise::{BitStream, BITS_PER_HEX_DIGIT};
use num_bigint::BigUint;
use num_traits::Zero;

const VERSION_BITS: usize = 3;
const TYPE_ID_BITS: usize = 3;
const GROUP_PAYLOAD_BITS: usize = 4;

/// Decoder settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest sub-packet nesting accepted, the outermost packet being
    /// depth 0. `None` accepts any depth.
    pub max_depth: Option<usize>,
}

/// Packet decoder. Holds only its options; all parse state lives in the
/// stream passed to each call.
///
/// Nesting is tracked on an explicit stack of open operators, so depth is
/// bounded by memory rather than the call stack.
#[derive(Debug, Clone, Default)]
pub struct PacketParser {
    options: ParseOptions,
}

/// How an open operator knows it has all of its sub-packets
#[derive(Debug, Clone, Copy)]
enum Bound {
    Bits { declared: usize, body_start: usize },
    Count(usize),
}

/// An operator whose sub-packets are still being read
#[derive(Debug)]
struct OpenOperator {
    version: u8,
    operator: Operator,
    framing: LengthType,
    start: usize,
    bound: Bound,
    children: Vec<Packet>,
}

impl OpenOperator {
    fn wants_more(&self, position: usize) -> bool {
        match self.bound {
            Bound::Bits {
                declared,
                body_start,
            } => position - body_start < declared,
            Bound::Count(count) => self.children.len() < count,
        }
    }

    fn finish(self, position: usize) -> Result<Packet> {
        if let Bound::Bits {
            declared,
            body_start,
        } = self.bound
        {
            let consumed = position - body_start;
            if consumed != declared {
                return Err(PacketError::LengthMismatch {
                    declared,
                    consumed,
                    position,
                });
            }
        }

        if self.children.is_empty() {
            return Err(PacketError::EmptyOperator {
                operator: self.operator,
                position: self.start,
            });
        }

        Ok(Packet::Operator {
            version: self.version,
            operator: self.operator,
            framing: self.framing,
            children: self.children,
        })
    }
}

/// A packet header and whatever follows it up to the first sub-packet
enum Header {
    Literal(Packet),
    Operator(OpenOperator),
}

impl PacketParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse an outermost packet, consuming its trailing padding
    pub fn parse(&self, stream: &mut BitStream) -> Result<Packet> {
        self.parse_packet(stream, true)
    }

    /// Parse one packet starting at the stream cursor.
    ///
    /// Padding up to the next hex digit is only consumed and checked when
    /// `is_outermost` is set.
    pub fn parse_packet(&self, stream: &mut BitStream, is_outermost: bool) -> Result<Packet> {
        let packet = self.parse_tree(stream)?;

        if is_outermost {
            read_padding(stream)?;
            if !stream.is_exhausted() {
                tracing::debug!(
                    "Ignoring {} bits after outermost packet",
                    stream.remaining()
                );
            }
        }

        Ok(packet)
    }

    fn parse_tree(&self, stream: &mut BitStream) -> Result<Packet> {
        let mut open: Vec<OpenOperator> = Vec::new();

        loop {
            let mut completed = match self.read_header(stream, open.len())? {
                Header::Literal(packet) => Some(packet),
                Header::Operator(operator) if operator.wants_more(stream.position()) => {
                    open.push(operator);
                    None
                }
                Header::Operator(operator) => Some(operator.finish(stream.position())?),
            };

            // Hand finished packets to their parents, closing every parent
            // that is now complete
            while let Some(packet) = completed.take() {
                let Some(parent) = open.last_mut() else {
                    return Ok(packet);
                };
                parent.children.push(packet);
                if !parent.wants_more(stream.position()) {
                    if let Some(parent) = open.pop() {
                        completed = Some(parent.finish(stream.position())?);
                    }
                }
            }
        }
    }

    fn read_header(&self, stream: &mut BitStream, depth: usize) -> Result<Header> {
        let start = stream.position();
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Err(PacketError::TooDeep {
                    limit,
                    position: start,
                });
            }
        }

        let version = stream.read(VERSION_BITS)? as u8;
        let type_id = stream.read(TYPE_ID_BITS)? as u8;
        tracing::trace!(
            "Packet header at bit {}: version={} type_id={} depth={}",
            start,
            version,
            type_id,
            depth
        );

        // Every 3-bit type ID except the literal one names an operator
        let Some(operator) = Operator::from_type_id(type_id) else {
            let value = read_literal(stream)?;
            return Ok(Header::Literal(Packet::Literal { version, value }));
        };

        let framing = LengthType::from_flag(stream.read_flag()?);
        let length = stream.read(framing.field_width())? as usize;
        let bound = match framing {
            LengthType::TotalLength => {
                tracing::trace!("Sub-packets span {} bits", length);
                Bound::Bits {
                    declared: length,
                    body_start: stream.position(),
                }
            }
            LengthType::Count => {
                tracing::trace!("{} sub-packets", length);
                Bound::Count(length)
            }
        };

        Ok(Header::Operator(OpenOperator {
            version,
            operator,
            framing,
            start,
            bound,
            children: Vec::new(),
        }))
    }
}

/// Read 5-bit groups (continuation flag + nibble) up to and including the
/// first group whose flag is clear
fn read_literal(stream: &mut BitStream) -> Result<BigUint> {
    let mut value = BigUint::zero();
    loop {
        let more = stream.read_flag()?;
        let nibble = stream.read(GROUP_PAYLOAD_BITS)?;
        value = (value << GROUP_PAYLOAD_BITS) + nibble;
        if !more {
            return Ok(value);
        }
    }
}

/// Consume the zero bits that align the outermost packet to a hex digit
fn read_padding(stream: &mut BitStream) -> Result<()> {
    let position = stream.position();
    let width = (BITS_PER_HEX_DIGIT - position % BITS_PER_HEX_DIGIT) % BITS_PER_HEX_DIGIT;
    let bits = stream.read(width)?;
    if bits != 0 {
        return Err(PacketError::NonZeroPadding { bits, position });
    }
    Ok(())
}

/// Parse one packet with default options
pub fn parse_packet(stream: &mut BitStream, is_outermost: bool) -> Result<Packet> {
    PacketParser::default().parse_packet(stream, is_outermost)
}

/// Decode a complete hex transmission into its outermost packet
pub fn decode(hex: &str) -> Result<Packet> {
    let mut stream = BitStream::from_hex(hex)?;
    PacketParser::default().parse(&mut stream)
}
