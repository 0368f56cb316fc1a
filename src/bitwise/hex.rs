// Hex digit <-> nibble conversion for transmission text

/// Convert a single hex digit (either case) to its 4-bit value
/// Example: '7' -> 7, 'e' -> 14, 'E' -> 14
pub fn hex_digit_to_nibble(ch: char) -> Option<u8> {
    match ch {
        '0'..='9' => Some(ch as u8 - b'0'),
        'a'..='f' => Some(ch as u8 - b'a' + 10),
        'A'..='F' => Some(ch as u8 - b'A' + 10),
        _ => None,
    }
}

/// Convert a nibble to its uppercase hex digit
/// Only the low 4 bits are used
pub fn nibble_to_hex_digit(nibble: u8) -> char {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    DIGITS[(nibble & 0x0F) as usize] as char
}

/// Pack hex text into bytes, high nibble first.
///
/// Odd-length input leaves the low nibble of the last byte zeroed. On failure
/// returns the offending character and its index in `text`.
pub fn pack_hex(text: &str) -> Result<Vec<u8>, (char, usize)> {
    let mut bytes = Vec::with_capacity((text.len() + 1) / 2);

    for (index, ch) in text.chars().enumerate() {
        let nibble = hex_digit_to_nibble(ch).ok_or((ch, index))?;
        if index % 2 == 0 {
            bytes.push(nibble << 4);
        } else if let Some(last) = bytes.last_mut() {
            *last |= nibble;
        }
    }

    Ok(bytes)
}
