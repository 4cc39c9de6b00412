//! The marshaller used for values no externalizer handles.

use super::object::{Marshallable, Object};
use super::{DataInput, DataOutput};
use crate::error::{CacheGridError, Result};

/// Marshaller for values of otherwise unknown types.
///
/// A fallback that does not support streaming is only asked for whole byte
/// arrays, which the global marshaller frames with a 4-byte length. A
/// streaming fallback writes directly into the enclosing stream and must
/// read back exactly what it wrote.
pub trait FallbackMarshaller: Send + Sync {
    /// Returns true if this marshaller can encode `obj`.
    fn is_marshallable(&self, obj: &dyn Marshallable) -> bool;

    /// Returns true if this marshaller reads and writes the enclosing stream
    /// directly.
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Encodes `obj` to a standalone byte array.
    fn object_to_bytes(&self, obj: &dyn Marshallable) -> Result<Vec<u8>>;

    /// Decodes a value from a byte array produced by
    /// [`object_to_bytes`](Self::object_to_bytes).
    fn object_from_bytes(&self, bytes: &[u8]) -> Result<Object>;

    /// Encodes `obj` into the enclosing stream.
    fn write_to_stream(&self, output: &mut dyn DataOutput, obj: &dyn Marshallable) -> Result<()> {
        let _ = (output, obj);
        Err(CacheGridError::Serialization(
            "fallback marshaller does not support streaming".to_string(),
        ))
    }

    /// Decodes a value from the enclosing stream.
    fn read_from_stream(&self, input: &mut dyn DataInput) -> Result<Object> {
        let _ = input;
        Err(CacheGridError::Deserialization(
            "fallback marshaller does not support streaming".to_string(),
        ))
    }
}
