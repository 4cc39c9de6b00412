//! Externalizers for small utility types.

use std::any::TypeId;

use uuid::Uuid;

use crate::error::Result;
use crate::serialization::externalizer::{read_required, Externalizer, ObjectInput, ObjectOutput};
use crate::serialization::ids;
use crate::serialization::marshall_util::{read_byte_array, write_byte_array};
use crate::serialization::object::{expect_ref, Marshallable, Object};

/// A key together with its value.
#[derive(Debug, PartialEq)]
pub struct KeyValuePair {
    key: Object,
    value: Object,
}

impl KeyValuePair {
    /// Creates a new pair.
    pub fn new(key: impl Marshallable, value: impl Marshallable) -> Self {
        Self {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Creates a pair from already boxed objects.
    pub fn from_objects(key: Object, value: Object) -> Self {
        Self { key, value }
    }

    /// Returns the key.
    pub fn key(&self) -> &dyn Marshallable {
        self.key.as_ref()
    }

    /// Returns the value.
    pub fn value(&self) -> &dyn Marshallable {
        self.value.as_ref()
    }

    /// Splits the pair into its key and value.
    pub fn into_parts(self) -> (Object, Object) {
        (self.key, self.value)
    }
}

/// Writes [`KeyValuePair`] as two objects.
pub struct KeyValuePairExternalizer;

impl Externalizer for KeyValuePairExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<KeyValuePair>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::KEY_VALUE_PAIR.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let pair = expect_ref::<KeyValuePair>(obj)?;
        output.write_object(Some(pair.key()))?;
        output.write_object(Some(pair.value()))
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let key = read_required(input)?;
        let value = read_required(input)?;
        Ok(Box::new(KeyValuePair::from_objects(key, value)))
    }
}

/// Writes a [`Uuid`] as its most and least significant longs.
pub struct UuidExternalizer;

impl Externalizer for UuidExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Uuid>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::UUID.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let bits = expect_ref::<Uuid>(obj)?.as_u128();
        output.write_long((bits >> 64) as i64)?;
        output.write_long(bits as i64)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let most = input.read_long()? as u64;
        let least = input.read_long()? as u64;
        Ok(Box::new(Uuid::from_u128(
            (u128::from(most) << 64) | u128::from(least),
        )))
    }
}

/// An opaque byte payload, typically an already marshalled key or value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WrappedBytes {
    bytes: Vec<u8>,
}

impl WrappedBytes {
    /// Wraps `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the wrapped bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Writes [`WrappedBytes`] with a 4-byte length prefix.
pub struct WrappedBytesExternalizer;

impl Externalizer for WrappedBytesExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<WrappedBytes>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::WRAPPED_BYTES.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        write_byte_array(output, expect_ref::<WrappedBytes>(obj)?.bytes())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(WrappedBytes::new(read_byte_array(input)?)))
    }
}
