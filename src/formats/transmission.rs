// Transmission text file loader

use crate::bitwise::{BitStream, StreamError};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransmissionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transmission file is empty")]
    Empty,

    #[error("Invalid transmission: {0}")]
    Stream(#[from] StreamError),
}

pub type Result<T> = std::result::Result<T, TransmissionError>;

/// Read a transmission file and return its hex text with surrounding
/// whitespace (including the trailing newline) removed
pub fn read_transmission_text(filename: impl AsRef<Path>) -> Result<String> {
    let text = fs::read_to_string(filename)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TransmissionError::Empty);
    }
    Ok(trimmed.to_string())
}

/// Load a transmission file as a bit stream ready for decoding
pub fn load_transmission(filename: impl AsRef<Path>) -> Result<BitStream> {
    let filename = filename.as_ref();
    let text = read_transmission_text(filename)?;
    let stream = BitStream::from_hex(&text)?;
    tracing::debug!(
        "Loaded {} bits from {}",
        stream.len(),
        filename.display()
    );
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_transmission() {
        let file = write_temp("D2FE28\n");
        let stream = load_transmission(file.path()).unwrap();
        assert_eq!(stream.len(), 24);
        assert_eq!(stream.to_bit_string(), "110100101111111000101000");
    }

    #[test]
    fn test_read_transmission_text() {
        let file = write_temp("  38006F45291200\r\n");
        assert_eq!(
            read_transmission_text(file.path()).unwrap(),
            "38006F45291200"
        );
    }

    #[test]
    fn test_empty_file() {
        let file = write_temp("\n\n");
        assert!(matches!(
            load_transmission(file.path()),
            Err(TransmissionError::Empty)
        ));
    }

    #[test]
    fn test_invalid_contents() {
        let file = write_temp("D2 FE28\n");
        assert!(matches!(
            load_transmission(file.path()),
            Err(TransmissionError::Stream(StreamError::InvalidHexDigit { ch: ' ', index: 2 }))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("input.txt");
        assert!(matches!(
            load_transmission(&missing),
            Err(TransmissionError::Io(_))
        ));
    }
}
