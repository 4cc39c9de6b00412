//! Serde-based fallback marshaller.
//!
//! Any type implementing `serde::Serialize` and `serde::DeserializeOwned`
//! can be registered with a [`SerdeMarshaller`] and used as a cache key or
//! value without writing an externalizer.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use serde::{Deserialize, Serialize};
//! use cachegrid_core::serialization::SerdeMarshaller;
//! use cachegrid_core::{GlobalMarshaller, SerializationConfig};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Product {
//!     id: u64,
//!     name: String,
//! }
//!
//! let fallback = SerdeMarshaller::new().with_type::<Product>();
//! let config = SerializationConfig::builder()
//!     .fallback_marshaller(Arc::new(fallback))
//!     .build()?;
//! let marshaller = GlobalMarshaller::new(config);
//! marshaller.start()?;
//! ```
//!
//! # Wire Format
//!
//! The registered name of the type as a string, followed by the bincode
//! payload with a 4-byte big-endian length prefix.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use super::marshall_util::{read_byte_array, write_byte_array};
use super::object::{concrete_type_id, expect_ref, unwrap_boxed, Marshallable, Object};
use super::{BytesObjectInput, BytesObjectOutput, DataInput, DataOutput, FallbackMarshaller};
use crate::error::{CacheGridError, Result};

type EncodeFn = fn(&dyn Marshallable) -> Result<Vec<u8>>;
type DecodeFn = fn(&[u8]) -> Result<Object>;

#[derive(Clone, Copy)]
struct SerdeType {
    name: &'static str,
    encode: EncodeFn,
    decode: DecodeFn,
}

fn encode_as<T: Serialize + Marshallable>(obj: &dyn Marshallable) -> Result<Vec<u8>> {
    bincode::serialize(expect_ref::<T>(obj)?)
        .map_err(|e| CacheGridError::Serialization(format!("bincode serialize failed: {e}")))
}

fn decode_as<T: DeserializeOwned + Marshallable>(bytes: &[u8]) -> Result<Object> {
    let value: T = bincode::deserialize(bytes)
        .map_err(|e| CacheGridError::Deserialization(format!("bincode deserialize failed: {e}")))?;
    Ok(Box::new(value))
}

/// Fallback marshaller for registered serde types, encoded with bincode.
#[derive(Clone, Default)]
pub struct SerdeMarshaller {
    by_type: HashMap<TypeId, SerdeType>,
    by_name: HashMap<&'static str, SerdeType>,
}

impl SerdeMarshaller {
    /// Creates a marshaller with no registered types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its Rust type name.
    pub fn with_type<T>(self) -> Self
    where
        T: Serialize + DeserializeOwned + Marshallable,
    {
        self.with_type_named::<T>(std::any::type_name::<T>())
    }

    /// Registers `T` under `name`, which must be the same on every member.
    ///
    /// Registering a second type under the same name replaces the first.
    pub fn with_type_named<T>(mut self, name: &'static str) -> Self
    where
        T: Serialize + DeserializeOwned + Marshallable,
    {
        let entry = SerdeType {
            name,
            encode: encode_as::<T>,
            decode: decode_as::<T>,
        };
        self.by_type.insert(TypeId::of::<T>(), entry);
        self.by_name.insert(name, entry);
        self
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Returns `true` if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    fn entry_for(&self, obj: &dyn Marshallable) -> Result<&SerdeType> {
        self.by_type
            .get(&concrete_type_id(obj))
            .ok_or(CacheGridError::NotSerializable {
                type_name: unwrap_boxed(obj).type_name(),
            })
    }

    fn entry_named(&self, name: &str) -> Result<&SerdeType> {
        self.by_name.get(name).ok_or_else(|| {
            CacheGridError::Deserialization(format!("no serde type registered as {name}"))
        })
    }
}

impl fmt::Debug for SerdeMarshaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("SerdeMarshaller").field("types", &names).finish()
    }
}

impl FallbackMarshaller for SerdeMarshaller {
    fn is_marshallable(&self, obj: &dyn Marshallable) -> bool {
        self.by_type.contains_key(&concrete_type_id(obj))
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn object_to_bytes(&self, obj: &dyn Marshallable) -> Result<Vec<u8>> {
        let mut output = BytesObjectOutput::new(64);
        self.write_to_stream(&mut output, obj)?;
        Ok(output.into_bytes())
    }

    fn object_from_bytes(&self, bytes: &[u8]) -> Result<Object> {
        self.read_from_stream(&mut BytesObjectInput::new(bytes))
    }

    fn write_to_stream(&self, output: &mut dyn DataOutput, obj: &dyn Marshallable) -> Result<()> {
        let entry = self.entry_for(obj)?;
        let payload = (entry.encode)(obj)?;
        output.write_string(entry.name)?;
        write_byte_array(output, &payload)
    }

    fn read_from_stream(&self, input: &mut dyn DataInput) -> Result<Object> {
        let name = input.read_string()?;
        let entry = self.entry_named(&name)?;
        let payload = read_byte_array(input)?;
        (entry.decode)(&payload)
    }
}
