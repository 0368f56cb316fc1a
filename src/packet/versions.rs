// Pre-order version traversal and checksum

use super::types::Packet;

/// Lazy pre-order walk yielding each packet's version.
///
/// Uses an explicit stack, so deep trees do not grow the call stack.
#[derive(Debug, Clone)]
pub struct VersionNumbers<'a> {
    stack: Vec<&'a Packet>,
}

impl<'a> Iterator for VersionNumbers<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let packet = self.stack.pop()?;
        // Reversed so the first child is visited next
        self.stack.extend(packet.children().iter().rev());
        Some(packet.version())
    }
}

/// Versions of `packet` and every sub-packet, parent before children
pub fn iter_version_numbers(packet: &Packet) -> VersionNumbers<'_> {
    VersionNumbers {
        stack: vec![packet],
    }
}

/// Sum of every version number in the tree
pub fn version_sum(packet: &Packet) -> u64 {
    iter_version_numbers(packet).map(u64::from).sum()
}
