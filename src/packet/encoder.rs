// Packet tree -> hex transmission

use super::error::{PacketError, Result};
use super::types::{LengthType, Packet, LITERAL_TYPE_ID};
use crate::bitwise::BitWriter;
use num_bigint::BigUint;

/// Encode a packet tree as an outermost transmission.
///
/// Literals use the fewest groups that hold their value, operators keep the
/// framing they were built with, and the result is zero-padded to a whole
/// hex digit.
pub fn encode(packet: &Packet) -> Result<String> {
    let mut writer = BitWriter::new();
    let mut open = Vec::new();

    if let Some(frame) = write_header(&mut writer, packet)? {
        open.push(frame);
    }
    while let Some(frame) = open.last_mut() {
        match frame.children.next() {
            Some(child) => {
                if let Some(child_frame) = write_header(&mut writer, child)? {
                    open.push(child_frame);
                }
            }
            None => {
                if let Some(frame) = open.pop() {
                    frame.close(&mut writer)?;
                }
            }
        }
    }

    writer.pad_to_hex_digit();
    Ok(writer.to_hex())
}

/// An operator whose sub-packets are still being written
struct OpenFrame<'a> {
    children: std::slice::Iter<'a, Packet>,
    /// Bit offset of a 15-bit length field to fill in once the body is known
    length_field: Option<usize>,
}

impl OpenFrame<'_> {
    fn close(self, writer: &mut BitWriter) -> Result<()> {
        let Some(offset) = self.length_field else {
            return Ok(());
        };
        let width = LengthType::TotalLength.field_width();
        let bits = writer.len() - offset - width;
        if bits >= 1 << width {
            return Err(PacketError::LengthTooLarge { bits });
        }
        writer.patch(offset, bits as u64, width);
        Ok(())
    }
}

/// Write everything up to the sub-packets; operators hand back a frame for
/// their children
fn write_header<'a>(writer: &mut BitWriter, packet: &'a Packet) -> Result<Option<OpenFrame<'a>>> {
    let version = packet.version();
    if version > 7 {
        return Err(PacketError::VersionTooWide { version });
    }
    writer.push(u64::from(version), 3);
    writer.push(u64::from(packet.type_id()), 3);

    let Packet::Operator {
        operator,
        framing,
        children,
        ..
    } = packet
    else {
        debug_assert_eq!(packet.type_id(), LITERAL_TYPE_ID);
        if let Some(value) = packet.value() {
            write_literal(writer, value);
        }
        return Ok(None);
    };

    if children.is_empty() {
        return Err(PacketError::NoOperands {
            operator: *operator,
        });
    }
    writer.push_bit(framing.flag());

    let width = framing.field_width();
    let length_field = match framing {
        LengthType::TotalLength => {
            let offset = writer.len();
            writer.push(0, width);
            Some(offset)
        }
        LengthType::Count => {
            if children.len() >= 1 << width {
                return Err(PacketError::CountTooLarge {
                    count: children.len(),
                });
            }
            writer.push(children.len() as u64, width);
            None
        }
    };

    Ok(Some(OpenFrame {
        children: children.iter(),
        length_field,
    }))
}

fn write_literal(writer: &mut BitWriter, value: &BigUint) {
    // Zero still takes one group
    let nibbles = value.to_radix_be(16);
    let last = nibbles.len() - 1;
    for (i, nibble) in nibbles.iter().enumerate() {
        writer.push_bit(i != last);
        writer.push(u64::from(*nibble), 4);
    }
}
