//! Growable, cursor-addressed output buffer.
//!
//! All multi-byte integers are written big-endian. Writes land at the
//! insertion point, overwrite whatever is there, extend the buffer if they run
//! past the end, and leave the cursor just after the written bytes.

use crate::error::BlobError;

/// Longest text a length-prefixed string can carry.
pub const PSTR_MAX_LEN: usize = u8::MAX as usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataBlob {
    bytes: Vec<u8>,
    insertion_point: usize,
}

impl DataBlob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn insertion_point(&self) -> usize {
        self.insertion_point
    }

    /// Move the cursor. Anything in `0..=size` is valid; grow the blob with
    /// [`DataBlob::pad_to_size`] first to seek further.
    pub fn set_insertion_point(&mut self, offset: usize) -> Result<(), BlobError> {
        if offset > self.bytes.len() {
            return Err(BlobError::OutOfBounds {
                offset,
                size: self.bytes.len(),
            });
        }
        self.insertion_point = offset;
        Ok(())
    }

    /// Zero-extend to at least `size` bytes. Never shrinks, never moves the
    /// cursor.
    pub fn pad_to_size(&mut self, size: usize) {
        if size > self.bytes.len() {
            self.bytes.resize(size, 0);
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        let start = self.insertion_point;
        let end = start + data.len();
        if end > self.bytes.len() {
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(data);
        self.insertion_point = end;
    }

    pub fn write_byte(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_word(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_long(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_quad(&mut self, value: u64) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_signed_byte(&mut self, value: i8) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_signed_word(&mut self, value: i16) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_signed_long(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_signed_quad(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Fixed-width string: exactly `width` bytes, truncated or zero padded.
    pub fn write_cstr(&mut self, text: &str, width: usize) {
        let raw = text.as_bytes();
        let len = raw.len().min(width);
        self.write_bytes(&raw[..len]);
        self.write_bytes(&vec![0; width - len]);
    }

    /// Length byte followed by the text. Text beyond [`PSTR_MAX_LEN`] bytes is
    /// dropped; the number of text bytes written is returned.
    pub fn write_pstr(&mut self, text: &str) -> usize {
        self.write_pstr_within(text, PSTR_MAX_LEN + 1)
    }

    /// Like [`DataBlob::write_pstr`], but the length byte and text together
    /// never take more than `width` bytes. Nothing is written for a zero width.
    pub fn write_pstr_within(&mut self, text: &str, width: usize) -> usize {
        if width == 0 {
            return 0;
        }
        let raw = text.as_bytes();
        let len = raw.len().min(pstr_capacity(width));
        self.write_byte(len as u8);
        self.write_bytes(&raw[..len]);
        len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Text bytes a length-prefixed string can hold in `width` bytes.
pub fn pstr_capacity(width: usize) -> usize {
    width.saturating_sub(1).min(PSTR_MAX_LEN)
}

impl From<DataBlob> for Vec<u8> {
    fn from(blob: DataBlob) -> Self {
        blob.into_bytes()
    }
}
