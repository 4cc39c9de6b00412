//! Data output traits and the growable byte sink used by the marshaller.

use bytes::Bytes;

use super::unsigned_numeric;
use crate::error::{CacheGridError, Result};

/// Default initial size of a [`BytesObjectOutput`].
pub const DEFAULT_INITIAL_SIZE: usize = 512;

/// Default size up to which a [`BytesObjectOutput`] grows by doubling.
pub const DEFAULT_MAX_DOUBLING_SIZE: usize = 4 * 1024 * 1024;

pub(crate) const STRING_EMPTY: u8 = 0;
pub(crate) const STRING_SMALL_ASCII: u8 = 1;
pub(crate) const STRING_UTF8: u8 = 2;

/// Longest ASCII string written with a single length byte.
pub(crate) const SMALL_STRING_LIMIT: usize = 0x3F;

/// Trait for writing primitive values in the marshaller's binary format.
///
/// All multi-byte values are written in big-endian byte order.
pub trait DataOutput {
    /// Writes a single byte (i8).
    fn write_byte(&mut self, v: i8) -> Result<()>;

    /// Writes a boolean as a single byte (0 for false, 1 for true).
    fn write_bool(&mut self, v: bool) -> Result<()>;

    /// Writes a 16-bit signed integer in big-endian order.
    fn write_short(&mut self, v: i16) -> Result<()>;

    /// Writes a 32-bit signed integer in big-endian order.
    fn write_int(&mut self, v: i32) -> Result<()>;

    /// Writes a 64-bit signed integer in big-endian order.
    fn write_long(&mut self, v: i64) -> Result<()>;

    /// Writes a 32-bit floating point in big-endian order.
    fn write_float(&mut self, v: f32) -> Result<()>;

    /// Writes a 64-bit floating point in big-endian order.
    fn write_double(&mut self, v: f64) -> Result<()>;

    /// Writes raw bytes without length prefix.
    fn write_bytes(&mut self, v: &[u8]) -> Result<()>;

    /// Writes a string using the selector-byte string encoding.
    fn write_string(&mut self, v: &str) -> Result<()>;

    /// Writes a single unsigned byte.
    fn write_unsigned_byte(&mut self, v: u8) -> Result<()> {
        self.write_byte(v as i8)
    }

    /// Writes a character as one UTF-16 code unit.
    ///
    /// Characters outside the basic multilingual plane do not fit in a single
    /// unit and are rejected.
    fn write_char(&mut self, v: char) -> Result<()> {
        let code = u32::from(v);
        if code > 0xFFFF {
            return Err(CacheGridError::Serialization(format!(
                "character U+{code:X} does not fit in a single UTF-16 unit"
            )));
        }
        self.write_short(code as u16 as i16)
    }

    /// Writes a variable-length unsigned 32-bit integer.
    fn write_unsigned_int(&mut self, v: u32) -> Result<()> {
        unsigned_numeric::write_unsigned_int(self, v)
    }

    /// Writes a variable-length unsigned 64-bit integer.
    fn write_unsigned_long(&mut self, v: u64) -> Result<()> {
        unsigned_numeric::write_unsigned_long(self, v)
    }
}

/// A growable, array-backed implementation of `DataOutput`.
///
/// The backing array doubles while it is smaller than the configured
/// maximum doubling size and grows by a quarter afterwards, always at least
/// to the size a write requires. Written bytes are addressed by position so
/// that length placeholders can be patched after the fact.
#[derive(Debug, Clone)]
pub struct BytesObjectOutput {
    buffer: Vec<u8>,
    pos: usize,
    max_doubling_size: usize,
}

impl BytesObjectOutput {
    /// Creates an output whose backing array starts at `initial_size` bytes.
    pub fn new(initial_size: usize) -> Self {
        Self::with_growth(initial_size, DEFAULT_MAX_DOUBLING_SIZE)
    }

    /// Creates an output with an explicit doubling threshold.
    pub fn with_growth(initial_size: usize, max_doubling_size: usize) -> Self {
        Self {
            buffer: vec![0; initial_size],
            pos: 0,
            max_doubling_size,
        }
    }

    /// Returns the current write position, which is also the written length.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the size of the backing array.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.pos
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Resets the write position, keeping the backing array.
    pub fn clear(&mut self) {
        self.pos = 0;
    }

    /// Returns the written bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.pos]
    }

    /// Returns a trimmed copy of the written bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Consumes the output and returns the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buffer.truncate(self.pos);
        self.buffer.shrink_to_fit();
        self.buffer
    }

    /// Consumes the output and returns the written bytes as a [`Bytes`] buffer.
    pub fn freeze(self) -> Bytes {
        Bytes::from(self.into_bytes())
    }

    /// Makes room for `extra` more bytes past the current position.
    pub fn ensure_capacity(&mut self, extra: usize) {
        let required = self.pos + extra;
        if required > self.buffer.len() {
            let new_size = self.grown_size(required);
            self.buffer.resize(new_size, 0);
        }
    }

    fn grown_size(&self, required: usize) -> usize {
        let current = self.buffer.len();
        let grown = if current < self.max_doubling_size {
            current << 1
        } else {
            current + (current >> 2)
        };
        grown.max(required)
    }

    /// Reserves four bytes for a length that is patched later.
    ///
    /// Returns the position of the placeholder.
    pub fn write_int_placeholder(&mut self) -> usize {
        self.ensure_capacity(4);
        let start = self.pos;
        self.pos += 4;
        start
    }

    /// Overwrites four already written bytes at `pos` with `v`.
    pub fn write_int_at(&mut self, pos: usize, v: i32) -> Result<()> {
        if pos + 4 > self.pos {
            return Err(CacheGridError::Serialization(format!(
                "cannot patch int at {pos}, only {} bytes written",
                self.pos
            )));
        }
        self.buffer[pos..pos + 4].copy_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.buffer[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_u8(&mut self, v: u8) {
        self.ensure_capacity(1);
        self.buffer[self.pos] = v;
        self.pos += 1;
    }

    /// Encodes every UTF-16 unit of `s` in modified UTF-8 and returns the
    /// number of bytes produced.
    fn put_modified_utf8(&mut self, s: &str) -> usize {
        // NUL and 4-byte sequences are the worst cases at two bytes per input byte.
        self.ensure_capacity(s.len() * 2);
        let start = self.pos;
        for unit in s.encode_utf16() {
            match unit {
                0x0001..=0x007F => self.put_u8(unit as u8),
                0x0000 | 0x0080..=0x07FF => {
                    self.put_u8(0xC0 | ((unit >> 6) & 0x1F) as u8);
                    self.put_u8(0x80 | (unit & 0x3F) as u8);
                }
                _ => {
                    self.put_u8(0xE0 | ((unit >> 12) & 0x0F) as u8);
                    self.put_u8(0x80 | ((unit >> 6) & 0x3F) as u8);
                    self.put_u8(0x80 | (unit & 0x3F) as u8);
                }
            }
        }
        self.pos - start
    }
}

impl Default for BytesObjectOutput {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_SIZE)
    }
}

impl DataOutput for BytesObjectOutput {
    fn write_byte(&mut self, v: i8) -> Result<()> {
        self.put_u8(v as u8);
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.put_u8(u8::from(v));
        Ok(())
    }

    fn write_short(&mut self, v: i16) -> Result<()> {
        self.put(&v.to_be_bytes());
        Ok(())
    }

    fn write_int(&mut self, v: i32) -> Result<()> {
        self.put(&v.to_be_bytes());
        Ok(())
    }

    fn write_long(&mut self, v: i64) -> Result<()> {
        self.put(&v.to_be_bytes());
        Ok(())
    }

    fn write_float(&mut self, v: f32) -> Result<()> {
        self.put(&v.to_bits().to_be_bytes());
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.put(&v.to_bits().to_be_bytes());
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.put(v);
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        if v.is_empty() {
            self.put_u8(STRING_EMPTY);
            return Ok(());
        }
        if v.len() <= SMALL_STRING_LIMIT && v.is_ascii() {
            self.ensure_capacity(2 + v.len());
            self.put_u8(STRING_SMALL_ASCII);
            self.put_u8(v.len() as u8);
            self.put(v.as_bytes());
            return Ok(());
        }
        self.put_u8(STRING_UTF8);
        let start = self.write_int_placeholder();
        let written = self.put_modified_utf8(v);
        let written = i32::try_from(written).map_err(|_| {
            CacheGridError::Serialization(format!("string of {written} bytes is too long"))
        })?;
        self.write_int_at(start, written)
    }

    fn write_unsigned_byte(&mut self, v: u8) -> Result<()> {
        self.put_u8(v);
        Ok(())
    }
}
