//! Helpers shared by externalizers for common field shapes.

use super::externalizer::{ObjectInput, ObjectOutput};
use super::object::{downcast, Marshallable, Object};
use super::{DataInput, DataOutput};
use crate::error::{CacheGridError, Result};

/// Writes a string that may be absent.
pub fn write_nullable_string<O: DataOutput + ?Sized>(out: &mut O, s: Option<&str>) -> Result<()> {
    match s {
        Some(s) => {
            out.write_bool(true)?;
            out.write_string(s)
        }
        None => out.write_bool(false),
    }
}

/// Reads a string written by [`write_nullable_string`].
pub fn read_nullable_string<I: DataInput + ?Sized>(input: &mut I) -> Result<Option<String>> {
    if input.read_bool()? {
        Ok(Some(input.read_string()?))
    } else {
        Ok(None)
    }
}

/// Writes a collection size as a variable-length unsigned integer.
pub fn write_size<O: DataOutput + ?Sized>(out: &mut O, len: usize) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| {
        CacheGridError::Serialization(format!("collection of {len} elements is too large"))
    })?;
    out.write_unsigned_int(len)
}

/// Reads a collection size, rejecting sizes the remaining input cannot hold.
///
/// Every element occupies at least `min_element_bytes` bytes.
pub fn read_size<I: DataInput + ?Sized>(input: &mut I, min_element_bytes: usize) -> Result<usize> {
    let len = input.read_unsigned_int()? as usize;
    let needed = len.saturating_mul(min_element_bytes);
    if needed > input.remaining() {
        return Err(CacheGridError::Truncated {
            needed,
            remaining: input.remaining(),
        });
    }
    Ok(len)
}

/// Writes a sized sequence of non-null objects.
pub fn write_objects<'a, I>(out: &mut dyn ObjectOutput, items: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Object>,
    I::IntoIter: ExactSizeIterator,
{
    let items = items.into_iter();
    write_size(out, items.len())?;
    for item in items {
        out.write_object(Some(item.as_ref()))?;
    }
    Ok(())
}

/// Reads a sequence written by [`write_objects`].
pub fn read_objects(input: &mut dyn ObjectInput) -> Result<Vec<Object>> {
    let len = read_size(input, 1)?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(super::externalizer::read_required(input)?);
    }
    Ok(items)
}

/// Reads a sequence written by [`write_objects`] whose elements are all `T`.
pub fn read_typed_objects<T: Marshallable>(input: &mut dyn ObjectInput) -> Result<Vec<T>> {
    read_objects(input)?.into_iter().map(downcast).collect()
}

/// Writes a byte array with a 4-byte length prefix.
pub fn write_byte_array<O: DataOutput + ?Sized>(out: &mut O, bytes: &[u8]) -> Result<()> {
    let len = i32::try_from(bytes.len()).map_err(|_| {
        CacheGridError::Serialization(format!("byte array of {} bytes is too long", bytes.len()))
    })?;
    out.write_int(len)?;
    out.write_bytes(bytes)
}

/// Reads a byte array written by [`write_byte_array`].
pub fn read_byte_array<I: DataInput + ?Sized>(input: &mut I) -> Result<Vec<u8>> {
    let len = input.read_int()?;
    let len = usize::try_from(len).map_err(|_| {
        CacheGridError::Deserialization(format!("invalid byte array length: {len}"))
    })?;
    input.read_bytes(len)
}

/// Writes a sized sequence of ints.
pub fn write_int_array<O: DataOutput + ?Sized>(out: &mut O, values: &[i32]) -> Result<()> {
    write_size(out, values.len())?;
    values.iter().try_for_each(|v| out.write_int(*v))
}

/// Reads a sequence written by [`write_int_array`].
pub fn read_int_array<I: DataInput + ?Sized>(input: &mut I) -> Result<Vec<i32>> {
    let len = read_size(input, 4)?;
    (0..len).map(|_| input.read_int()).collect()
}
