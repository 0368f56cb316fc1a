// Packet decode/evaluate errors

use super::types::Operator;
use crate::bitwise::StreamError;
use thiserror::Error;

/// Coarse failure classes reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transmission text contains a non-hex character
    Format,
    /// A read ran past the end of the transmission
    Bounds,
    /// The bits decode to a structurally malformed packet
    Protocol,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Length mismatch at bit {position}: sub-packets consumed {consumed} of {declared} declared bits")]
    LengthMismatch {
        declared: usize,
        consumed: usize,
        position: usize,
    },

    #[error("Non-zero padding at bit {position}: {bits:#b}")]
    NonZeroPadding { bits: u64, position: usize },

    #[error("{operator} packet at bit {position} has no sub-packets")]
    EmptyOperator { operator: Operator, position: usize },

    #[error("{operator} expects exactly 2 sub-packets, found {found}")]
    Arity { operator: Operator, found: usize },

    #[error("{operator} has no sub-packets")]
    NoOperands { operator: Operator },

    #[error("Nesting deeper than {limit} packets at bit {position}")]
    TooDeep { limit: usize, position: usize },

    #[error("Version {version} does not fit in 3 bits")]
    VersionTooWide { version: u8 },

    #[error("{count} sub-packets do not fit in an 11-bit count")]
    CountTooLarge { count: usize },

    #[error("Sub-packets spanning {bits} bits do not fit in a 15-bit length")]
    LengthTooLarge { bits: usize },
}

impl PacketError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PacketError::Stream(StreamError::InvalidHexDigit { .. }) => ErrorCategory::Format,
            PacketError::Stream(_) => ErrorCategory::Bounds,
            _ => ErrorCategory::Protocol,
        }
    }

    /// Bit offset the failure was detected at, where one is known
    pub fn position(&self) -> Option<usize> {
        match self {
            PacketError::Stream(StreamError::InvalidHexDigit { index, .. }) => {
                Some(index * crate::bitwise::BITS_PER_HEX_DIGIT)
            }
            PacketError::Stream(StreamError::OutOfBits { position, .. })
            | PacketError::Stream(StreamError::ReadTooWide { position, .. })
            | PacketError::LengthMismatch { position, .. }
            | PacketError::NonZeroPadding { position, .. }
            | PacketError::EmptyOperator { position, .. }
            | PacketError::TooDeep { position, .. } => Some(*position),
            PacketError::Arity { .. }
            | PacketError::NoOperands { .. }
            | PacketError::VersionTooWide { .. }
            | PacketError::CountTooLarge { .. }
            | PacketError::LengthTooLarge { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PacketError>;
