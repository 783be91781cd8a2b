//! UTF-16BE text encoding for FDF strings.
//!
//! Every field name and value written to an FDF file goes through here, so any
//! Unicode text survives the trip to pdftk without PDF string escaping.

/// Byte-order mark for big-endian UTF-16.
pub const BOM: [u8; 2] = [0xFE, 0xFF];

/// Encode text as big-endian UTF-16 with a leading byte-order mark.
///
/// Characters outside the BMP become a surrogate pair (two code units).
pub fn encode_utf16_bom(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&BOM);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

/// Lowercase hex of [`encode_utf16_bom`], the token written between `<` and `>`.
pub fn hex_utf16_bom(text: &str) -> String {
    hex::encode(encode_utf16_bom(text))
}
