//! Encoding of primitive values, strings and primitive arrays.
//!
//! Every primitive is written as a one-byte sub-id followed by its raw
//! payload. Arrays carry a size-class byte so that short arrays spend only
//! one or two bytes on their length.

#![allow(missing_docs)]

use std::any::TypeId;

use super::class_map::{IdentityTypeMap, SPARSE_LOAD_FACTOR};
use super::object::{expect_ref, Marshallable, Object};
use super::{DataInput, DataOutput};
use crate::error::{CacheGridError, Result};

pub const ID_BYTE_ARRAY: u8 = 0x01;
pub const ID_STRING: u8 = 0x02;

pub const ID_BOOLEAN_OBJ: u8 = 0x10;
pub const ID_BYTE_OBJ: u8 = 0x11;
pub const ID_CHAR_OBJ: u8 = 0x12;
pub const ID_DOUBLE_OBJ: u8 = 0x13;
pub const ID_FLOAT_OBJ: u8 = 0x14;
pub const ID_INT_OBJ: u8 = 0x15;
pub const ID_LONG_OBJ: u8 = 0x16;
pub const ID_SHORT_OBJ: u8 = 0x17;

pub const ID_BOOLEAN_ARRAY: u8 = 0x18;
pub const ID_CHAR_ARRAY: u8 = 0x19;
pub const ID_DOUBLE_ARRAY: u8 = 0x1A;
pub const ID_FLOAT_ARRAY: u8 = 0x1B;
pub const ID_INT_ARRAY: u8 = 0x1C;
pub const ID_LONG_ARRAY: u8 = 0x1D;
pub const ID_SHORT_ARRAY: u8 = 0x1E;

pub const ID_ARRAY_EMPTY: u8 = 0x28;
pub const ID_ARRAY_SMALL: u8 = 0x29;
pub const ID_ARRAY_MEDIUM: u8 = 0x2A;
pub const ID_ARRAY_LARGE: u8 = 0x2B;

const SMALL_ARRAY_MAX: usize = 0x100;
const MEDIUM_ARRAY_MIN: usize = 0x101;
const MEDIUM_ARRAY_MAX: usize = 0x10100;

/// Builds the table from primitive runtime types to their sub-ids.
pub(crate) fn primitive_table() -> IdentityTypeMap<u8> {
    let entries = [
        (TypeId::of::<Vec<u8>>(), ID_BYTE_ARRAY),
        (TypeId::of::<String>(), ID_STRING),
        (TypeId::of::<&'static str>(), ID_STRING),
        (TypeId::of::<bool>(), ID_BOOLEAN_OBJ),
        (TypeId::of::<i8>(), ID_BYTE_OBJ),
        (TypeId::of::<char>(), ID_CHAR_OBJ),
        (TypeId::of::<f64>(), ID_DOUBLE_OBJ),
        (TypeId::of::<f32>(), ID_FLOAT_OBJ),
        (TypeId::of::<i32>(), ID_INT_OBJ),
        (TypeId::of::<i64>(), ID_LONG_OBJ),
        (TypeId::of::<i16>(), ID_SHORT_OBJ),
        (TypeId::of::<Vec<bool>>(), ID_BOOLEAN_ARRAY),
        (TypeId::of::<Vec<char>>(), ID_CHAR_ARRAY),
        (TypeId::of::<Vec<f64>>(), ID_DOUBLE_ARRAY),
        (TypeId::of::<Vec<f32>>(), ID_FLOAT_ARRAY),
        (TypeId::of::<Vec<i32>>(), ID_INT_ARRAY),
        (TypeId::of::<Vec<i64>>(), ID_LONG_ARRAY),
        (TypeId::of::<Vec<i16>>(), ID_SHORT_ARRAY),
    ];
    let mut table = IdentityTypeMap::with_capacity_and_load_factor(32, SPARSE_LOAD_FACTOR);
    for (type_id, id) in entries {
        table.put(type_id, id);
    }
    table
}

/// Writes the payload of a primitive whose sub-id is `id`.
pub(crate) fn write_raw(out: &mut dyn DataOutput, id: u8, obj: &dyn Marshallable) -> Result<()> {
    match id {
        ID_BYTE_ARRAY => {
            let bytes = expect_ref::<Vec<u8>>(obj)?;
            write_array_len(out, bytes.len())?;
            out.write_bytes(bytes)
        }
        ID_STRING => match obj.as_any().downcast_ref::<String>() {
            Some(s) => out.write_string(s),
            None => out.write_string(expect_ref::<&'static str>(obj)?),
        },
        ID_BOOLEAN_OBJ => out.write_bool(*expect_ref::<bool>(obj)?),
        ID_BYTE_OBJ => out.write_byte(*expect_ref::<i8>(obj)?),
        ID_CHAR_OBJ => out.write_char(*expect_ref::<char>(obj)?),
        ID_DOUBLE_OBJ => out.write_double(*expect_ref::<f64>(obj)?),
        ID_FLOAT_OBJ => out.write_float(*expect_ref::<f32>(obj)?),
        ID_INT_OBJ => out.write_int(*expect_ref::<i32>(obj)?),
        ID_LONG_OBJ => out.write_long(*expect_ref::<i64>(obj)?),
        ID_SHORT_OBJ => out.write_short(*expect_ref::<i16>(obj)?),
        ID_BOOLEAN_ARRAY => write_boolean_array(out, expect_ref::<Vec<bool>>(obj)?),
        ID_CHAR_ARRAY => write_array(out, expect_ref::<Vec<char>>(obj)?, |o, v| o.write_char(*v)),
        ID_DOUBLE_ARRAY => {
            write_array(out, expect_ref::<Vec<f64>>(obj)?, |o, v| o.write_double(*v))
        }
        ID_FLOAT_ARRAY => write_array(out, expect_ref::<Vec<f32>>(obj)?, |o, v| o.write_float(*v)),
        ID_INT_ARRAY => write_array(out, expect_ref::<Vec<i32>>(obj)?, |o, v| o.write_int(*v)),
        ID_LONG_ARRAY => write_array(out, expect_ref::<Vec<i64>>(obj)?, |o, v| o.write_long(*v)),
        ID_SHORT_ARRAY => write_array(out, expect_ref::<Vec<i16>>(obj)?, |o, v| o.write_short(*v)),
        other => Err(CacheGridError::Serialization(format!(
            "unknown primitive id {other:#04x}"
        ))),
    }
}

/// Reads the payload of a primitive whose sub-id is `id`.
pub(crate) fn read_raw(input: &mut dyn DataInput, id: u8) -> Result<Object> {
    let value: Object = match id {
        ID_BYTE_ARRAY => {
            let len = read_array_len(input, 1)?;
            Box::new(input.read_bytes(len)?)
        }
        ID_STRING => Box::new(input.read_string()?),
        ID_BOOLEAN_OBJ => Box::new(input.read_bool()?),
        ID_BYTE_OBJ => Box::new(input.read_byte()?),
        ID_CHAR_OBJ => Box::new(input.read_char()?),
        ID_DOUBLE_OBJ => Box::new(input.read_double()?),
        ID_FLOAT_OBJ => Box::new(input.read_float()?),
        ID_INT_OBJ => Box::new(input.read_int()?),
        ID_LONG_OBJ => Box::new(input.read_long()?),
        ID_SHORT_OBJ => Box::new(input.read_short()?),
        ID_BOOLEAN_ARRAY => Box::new(read_boolean_array(input)?),
        ID_CHAR_ARRAY => Box::new(read_array(input, 2, |i| i.read_char())?),
        ID_DOUBLE_ARRAY => Box::new(read_array(input, 8, |i| i.read_double())?),
        ID_FLOAT_ARRAY => Box::new(read_array(input, 4, |i| i.read_float())?),
        ID_INT_ARRAY => Box::new(read_array(input, 4, |i| i.read_int())?),
        ID_LONG_ARRAY => Box::new(read_array(input, 8, |i| i.read_long())?),
        ID_SHORT_ARRAY => Box::new(read_array(input, 2, |i| i.read_short())?),
        other => {
            return Err(CacheGridError::Deserialization(format!(
                "unknown primitive id {other:#04x}"
            )))
        }
    };
    Ok(value)
}

/// Writes an array length using the smallest size class that fits.
pub(crate) fn write_array_len(out: &mut dyn DataOutput, len: usize) -> Result<()> {
    if len == 0 {
        out.write_unsigned_byte(ID_ARRAY_EMPTY)
    } else if len <= SMALL_ARRAY_MAX {
        out.write_unsigned_byte(ID_ARRAY_SMALL)?;
        out.write_unsigned_byte((len - 1) as u8)
    } else if len <= MEDIUM_ARRAY_MAX {
        out.write_unsigned_byte(ID_ARRAY_MEDIUM)?;
        out.write_short((len - MEDIUM_ARRAY_MIN) as u16 as i16)
    } else {
        let len = i32::try_from(len).map_err(|_| {
            CacheGridError::Serialization(format!("array of {len} elements is too long"))
        })?;
        out.write_unsigned_byte(ID_ARRAY_LARGE)?;
        out.write_int(len)
    }
}

/// Reads an array length and checks that `len * element_size` bytes remain.
///
/// An `element_size` of zero denotes bit-packed booleans.
pub(crate) fn read_array_len(input: &mut dyn DataInput, element_size: usize) -> Result<usize> {
    let len = match input.read_unsigned_byte()? {
        ID_ARRAY_EMPTY => 0,
        ID_ARRAY_SMALL => usize::from(input.read_unsigned_byte()?) + 1,
        ID_ARRAY_MEDIUM => usize::from(input.read_unsigned_short()?) + MEDIUM_ARRAY_MIN,
        ID_ARRAY_LARGE => {
            let len = input.read_int()?;
            usize::try_from(len).map_err(|_| {
                CacheGridError::Deserialization(format!("invalid array length: {len}"))
            })?
        }
        other => {
            return Err(CacheGridError::Deserialization(format!(
                "unknown array size class {other:#04x}"
            )))
        }
    };
    let needed = if element_size == 0 {
        len.div_ceil(8)
    } else {
        len.saturating_mul(element_size)
    };
    if needed > input.remaining() {
        return Err(CacheGridError::Truncated {
            needed,
            remaining: input.remaining(),
        });
    }
    Ok(len)
}

fn write_array<T>(
    out: &mut dyn DataOutput,
    values: &[T],
    mut write: impl FnMut(&mut dyn DataOutput, &T) -> Result<()>,
) -> Result<()> {
    write_array_len(out, values.len())?;
    for value in values {
        write(&mut *out, value)?;
    }
    Ok(())
}

fn read_array<T>(
    input: &mut dyn DataInput,
    element_size: usize,
    mut read: impl FnMut(&mut dyn DataInput) -> Result<T>,
) -> Result<Vec<T>> {
    let len = read_array_len(input, element_size)?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(read(&mut *input)?);
    }
    Ok(values)
}

fn write_boolean_array(out: &mut dyn DataOutput, values: &[bool]) -> Result<()> {
    write_array_len(out, values.len())?;
    for chunk in values.chunks(8) {
        let packed = chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, &v)| acc | (u8::from(v) << bit));
        out.write_unsigned_byte(packed)?;
    }
    Ok(())
}

fn read_boolean_array(input: &mut dyn DataInput) -> Result<Vec<bool>> {
    let len = read_array_len(input, 0)?;
    let mut values = Vec::with_capacity(len);
    while values.len() < len {
        let packed = input.read_unsigned_byte()?;
        let bits = (len - values.len()).min(8);
        values.extend((0..bits).map(|bit| packed & (1 << bit) != 0));
    }
    Ok(values)
}
