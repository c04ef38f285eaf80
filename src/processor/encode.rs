//! Width-directed value encoders shared by the assembler and the default
//! writers.

use crate::error::EncodeError;
use crate::processor::blob::DataBlob;

/// Write the low `width` bytes of `bits` big-endian at the cursor.
pub fn write_integer(blob: &mut DataBlob, bits: u64, width: usize) -> Result<(), EncodeError> {
    match width {
        1 => blob.write_byte(bits as u8),
        2 => blob.write_word(bits as u16),
        4 => blob.write_long(bits as u32),
        8 => blob.write_quad(bits),
        other => return Err(EncodeError::IllegalWidth(other)),
    }
    Ok(())
}

/// Parse `text` as a base-10 integer and write it at `width` bytes.
///
/// The width is checked before the text so that a broken schema is reported
/// as such even when the input is also bad.
pub fn encode_integer(
    blob: &mut DataBlob,
    text: &str,
    width: usize,
    signed: bool,
) -> Result<(), EncodeError> {
    if !matches!(width, 1 | 2 | 4 | 8) {
        return Err(EncodeError::IllegalWidth(width));
    }
    let bits = parse_integer(text, signed)?;
    write_integer(blob, bits, width)
}

/// Two's-complement bit pattern of a signed or unsigned decimal.
pub fn parse_integer(text: &str, signed: bool) -> Result<u64, EncodeError> {
    let text = text.trim();
    if signed {
        text.parse::<i64>()
            .map(|v| v as u64)
            .map_err(|_| invalid(text, "signed integer"))
    } else {
        text.parse::<u64>()
            .map_err(|_| invalid(text, "unsigned integer"))
    }
}

pub fn parse_resource_id(text: &str) -> Result<i16, EncodeError> {
    let text = text.trim();
    text.parse::<i16>().map_err(|_| invalid(text, "resource id"))
}

/// Packed `0x00RRGGBB`. Accepts decimal, `0x` hex and `#` hex.
pub fn parse_color(text: &str) -> Result<u32, EncodeError> {
    let text = text.trim();
    let parsed = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('#'))
    {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse::<u32>()
    };
    parsed.map_err(|_| invalid(text, "colour"))
}

fn invalid(text: &str, expected: &'static str) -> EncodeError {
    EncodeError::InvalidInteger {
        text: text.to_string(),
        expected,
    }
}
