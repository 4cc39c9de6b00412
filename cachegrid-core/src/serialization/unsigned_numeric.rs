//! Variable-length encoding of unsigned integers.
//!
//! Values are split into 7-bit groups, least significant group first. Every
//! byte except the last has its high bit set.

use super::{DataInput, DataOutput};
use crate::error::{CacheGridError, Result};

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u8 = 0x7F;

/// Writes `v` as a variable-length unsigned integer.
pub fn write_unsigned_int<O: DataOutput + ?Sized>(out: &mut O, mut v: u32) -> Result<()> {
    while v & !u32::from(GROUP_MASK) != 0 {
        out.write_unsigned_byte((v as u8 & GROUP_MASK) | CONTINUATION)?;
        v >>= 7;
    }
    out.write_unsigned_byte(v as u8)
}

/// Writes `v` as a variable-length unsigned long.
pub fn write_unsigned_long<O: DataOutput + ?Sized>(out: &mut O, mut v: u64) -> Result<()> {
    while v & !u64::from(GROUP_MASK) != 0 {
        out.write_unsigned_byte((v as u8 & GROUP_MASK) | CONTINUATION)?;
        v >>= 7;
    }
    out.write_unsigned_byte(v as u8)
}

/// Reads a variable-length unsigned integer.
pub fn read_unsigned_int<I: DataInput + ?Sized>(input: &mut I) -> Result<u32> {
    let value = read_groups(input, 32)?;
    Ok(value as u32)
}

/// Reads a variable-length unsigned long.
pub fn read_unsigned_long<I: DataInput + ?Sized>(input: &mut I) -> Result<u64> {
    read_groups(input, 64)
}

fn read_groups<I: DataInput + ?Sized>(input: &mut I, bits: u32) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let b = input.read_unsigned_byte()?;
        let group = u64::from(b & GROUP_MASK);
        let available = bits.saturating_sub(shift);
        if available == 0 || (available < 7 && group >> available != 0) {
            return Err(CacheGridError::Deserialization(format!(
                "variable-length integer exceeds {bits} bits"
            )));
        }
        value |= group << shift;
        if b & CONTINUATION == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

/// Returns the number of bytes [`write_unsigned_int`] produces for `v`.
pub fn unsigned_int_size(v: u32) -> usize {
    let bits = 32 - v.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}
