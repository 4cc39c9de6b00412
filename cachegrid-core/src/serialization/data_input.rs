//! Data input traits and the positional byte source used by the marshaller.

use bytes::Buf;
use std::io::Cursor;

use super::data_output::{SMALL_STRING_LIMIT, STRING_EMPTY, STRING_SMALL_ASCII, STRING_UTF8};
use super::unsigned_numeric;
use crate::error::{CacheGridError, Result};

/// Trait for reading primitive values from the marshaller's binary format.
///
/// All multi-byte values are read in big-endian byte order.
pub trait DataInput {
    /// Reads a single byte (i8).
    fn read_byte(&mut self) -> Result<i8>;

    /// Reads a boolean from a single byte.
    fn read_bool(&mut self) -> Result<bool>;

    /// Reads a 16-bit signed integer in big-endian order.
    fn read_short(&mut self) -> Result<i16>;

    /// Reads a 32-bit signed integer in big-endian order.
    fn read_int(&mut self) -> Result<i32>;

    /// Reads a 64-bit signed integer in big-endian order.
    fn read_long(&mut self) -> Result<i64>;

    /// Reads a 32-bit floating point in big-endian order.
    fn read_float(&mut self) -> Result<f32>;

    /// Reads a 64-bit floating point in big-endian order.
    fn read_double(&mut self) -> Result<f64>;

    /// Reads the specified number of raw bytes.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Fills `buf` completely from the input.
    fn read_fully(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Reads a string written with the selector-byte string encoding.
    fn read_string(&mut self) -> Result<String>;

    /// Returns the number of bytes remaining to be read.
    fn remaining(&self) -> usize;

    /// Reads a single unsigned byte.
    fn read_unsigned_byte(&mut self) -> Result<u8> {
        Ok(self.read_byte()? as u8)
    }

    /// Reads a 16-bit unsigned integer in big-endian order.
    fn read_unsigned_short(&mut self) -> Result<u16> {
        Ok(self.read_short()? as u16)
    }

    /// Reads a character stored as one UTF-16 code unit.
    fn read_char(&mut self) -> Result<char> {
        let unit = self.read_unsigned_short()?;
        char::from_u32(u32::from(unit)).ok_or_else(|| {
            CacheGridError::Deserialization(format!("unpaired surrogate {unit:#06x}"))
        })
    }

    /// Reads a variable-length unsigned 32-bit integer.
    fn read_unsigned_int(&mut self) -> Result<u32> {
        unsigned_numeric::read_unsigned_int(self)
    }

    /// Reads a variable-length unsigned 64-bit integer.
    fn read_unsigned_long(&mut self) -> Result<u64> {
        unsigned_numeric::read_unsigned_long(self)
    }
}

/// A slice-backed implementation of `DataInput`.
///
/// The read position can be moved in both directions with [`skip`](Self::skip)
/// and [`rewind`](Self::rewind).
#[derive(Debug)]
pub struct BytesObjectInput<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BytesObjectInput<'a> {
    /// Creates a new `BytesObjectInput` from the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Creates an input over `len` bytes of `data` starting at `offset`.
    pub fn with_offset(data: &'a [u8], offset: usize, len: usize) -> Result<Self> {
        let end = offset.checked_add(len).filter(|end| *end <= data.len());
        match end {
            Some(end) => Ok(Self::new(&data[offset..end])),
            None => Err(CacheGridError::Deserialization(format!(
                "range {offset}+{len} is outside a buffer of {} bytes",
                data.len()
            ))),
        }
    }

    /// Returns the current position in the buffer.
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Moves the read position to `pos`.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.cursor.get_ref().len() {
            return Err(CacheGridError::Deserialization(format!(
                "position {pos} is past the end of a {} byte input",
                self.cursor.get_ref().len()
            )));
        }
        self.cursor.set_position(pos as u64);
        Ok(())
    }

    /// Moves the read position by `n` bytes; negative values move backward.
    pub fn skip(&mut self, n: isize) -> Result<()> {
        let target = self.position() as isize + n;
        if target < 0 {
            return Err(CacheGridError::Deserialization(format!(
                "cannot move {} bytes before the start of the input",
                -target
            )));
        }
        self.set_position(target as usize)
    }

    /// Moves the read position `n` bytes backward.
    pub fn rewind(&mut self, n: usize) -> Result<()> {
        let pos = self.position();
        if n > pos {
            return Err(CacheGridError::Deserialization(format!(
                "cannot rewind {n} bytes from position {pos}"
            )));
        }
        self.cursor.set_position((pos - n) as u64);
        Ok(())
    }

    /// Borrows the next `len` bytes without copying.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure_remaining(len)?;
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position();
        self.cursor.advance(len);
        Ok(&data[start..start + len])
    }

    fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.cursor.remaining() < n {
            Err(CacheGridError::Truncated {
                needed: n,
                remaining: self.cursor.remaining(),
            })
        } else {
            Ok(())
        }
    }
}

fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let malformed = |at: usize| {
        CacheGridError::Deserialization(format!("malformed modified UTF-8 at byte {at}"))
    };
    let continuation = |at: usize| match bytes.get(at) {
        Some(b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        _ => Err(malformed(at)),
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b >> 4 {
            0..=7 => {
                units.push(u16::from(b));
                i += 1;
            }
            12 | 13 => {
                let low = continuation(i + 1)?;
                units.push((u16::from(b & 0x1F) << 6) | low);
                i += 2;
            }
            14 => {
                let mid = continuation(i + 1)?;
                let low = continuation(i + 2)?;
                units.push((u16::from(b & 0x0F) << 12) | (mid << 6) | low);
                i += 3;
            }
            _ => return Err(malformed(i)),
        }
    }
    String::from_utf16(&units)
        .map_err(|e| CacheGridError::Deserialization(format!("invalid UTF-16 string: {e}")))
}

impl DataInput for BytesObjectInput<'_> {
    fn read_byte(&mut self) -> Result<i8> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_i8())
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_u8() != 0)
    }

    fn read_short(&mut self) -> Result<i16> {
        self.ensure_remaining(2)?;
        Ok(self.cursor.get_i16())
    }

    fn read_int(&mut self) -> Result<i32> {
        self.ensure_remaining(4)?;
        Ok(self.cursor.get_i32())
    }

    fn read_long(&mut self) -> Result<i64> {
        self.ensure_remaining(8)?;
        Ok(self.cursor.get_i64())
    }

    fn read_float(&mut self) -> Result<f32> {
        self.ensure_remaining(4)?;
        Ok(self.cursor.get_f32())
    }

    fn read_double(&mut self) -> Result<f64> {
        self.ensure_remaining(8)?;
        Ok(self.cursor.get_f64())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.read_slice(len)?.to_vec())
    }

    fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_remaining(buf.len())?;
        self.cursor.copy_to_slice(buf);
        Ok(())
    }

    fn read_string(&mut self) -> Result<String> {
        match self.read_unsigned_byte()? {
            STRING_EMPTY => Ok(String::new()),
            STRING_SMALL_ASCII => {
                let len = usize::from(self.read_unsigned_byte()?);
                if len > SMALL_STRING_LIMIT {
                    return Err(CacheGridError::Deserialization(format!(
                        "short string length {len} exceeds {SMALL_STRING_LIMIT}"
                    )));
                }
                let bytes = self.read_slice(len)?;
                if !bytes.is_ascii() {
                    return Err(CacheGridError::Deserialization(
                        "short string contains non-ASCII bytes".to_string(),
                    ));
                }
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
            STRING_UTF8 => {
                let len = self.read_int()?;
                if len < 0 {
                    return Err(CacheGridError::Deserialization(format!(
                        "invalid string length: {len}"
                    )));
                }
                let bytes = self.read_slice(len as usize)?;
                decode_modified_utf8(bytes)
            }
            other => Err(CacheGridError::Deserialization(format!(
                "unknown string encoding {other}"
            ))),
        }
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    fn read_unsigned_byte(&mut self) -> Result<u8> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_u8())
    }
}
