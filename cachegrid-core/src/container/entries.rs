//! Cache entries and values as stored in the data container.
//!
//! Entries carry their key, values do not. Timestamps are milliseconds since
//! the epoch; lifespan and max idle are durations in milliseconds.

use std::any::TypeId;

use super::metadata::{EmbeddedMetadata, EmbeddedMetadataExternalizer};
use crate::error::Result;
use crate::serialization::ids;
use crate::serialization::{
    expect_ref, read_required, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// An entry that never expires.
#[derive(Debug, PartialEq)]
pub struct ImmortalCacheEntry {
    /// The entry key.
    pub key: Object,
    /// The entry value.
    pub value: Object,
}

impl ImmortalCacheEntry {
    /// Creates an entry.
    pub fn new(key: impl Marshallable, value: impl Marshallable) -> Self {
        Self {
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

/// An entry that expires a fixed time after creation.
#[derive(Debug, PartialEq)]
pub struct MortalCacheEntry {
    /// The entry key.
    pub key: Object,
    /// The entry value.
    pub value: Object,
    /// Lifespan in milliseconds.
    pub lifespan: i64,
    /// Creation timestamp.
    pub created: u64,
}

/// An entry that expires after a period without access.
#[derive(Debug, PartialEq)]
pub struct TransientCacheEntry {
    /// The entry key.
    pub key: Object,
    /// The entry value.
    pub value: Object,
    /// Maximum idle time in milliseconds.
    pub max_idle: i64,
    /// Last access timestamp.
    pub last_used: u64,
}

/// An entry with both a lifespan and a maximum idle time.
#[derive(Debug, PartialEq)]
pub struct TransientMortalCacheEntry {
    /// The entry key.
    pub key: Object,
    /// The entry value.
    pub value: Object,
    /// Lifespan in milliseconds.
    pub lifespan: i64,
    /// Maximum idle time in milliseconds.
    pub max_idle: i64,
    /// Creation timestamp.
    pub created: u64,
    /// Last access timestamp.
    pub last_used: u64,
}

/// An immortal entry that carries its full metadata.
#[derive(Debug, PartialEq)]
pub struct MetadataImmortalCacheEntry {
    /// The entry key.
    pub key: Object,
    /// The entry value.
    pub value: Object,
    /// Metadata attached to the entry.
    pub metadata: EmbeddedMetadata,
}

/// A value that never expires.
#[derive(Debug, PartialEq)]
pub struct ImmortalCacheValue {
    /// The stored value.
    pub value: Object,
}

/// A value that expires a fixed time after creation.
#[derive(Debug, PartialEq)]
pub struct MortalCacheValue {
    /// The stored value.
    pub value: Object,
    /// Lifespan in milliseconds.
    pub lifespan: i64,
    /// Creation timestamp.
    pub created: u64,
}

/// A value that expires after a period without access.
#[derive(Debug, PartialEq)]
pub struct TransientCacheValue {
    /// The stored value.
    pub value: Object,
    /// Maximum idle time in milliseconds.
    pub max_idle: i64,
    /// Last access timestamp.
    pub last_used: u64,
}

/// A value with both a lifespan and a maximum idle time.
#[derive(Debug, PartialEq)]
pub struct TransientMortalCacheValue {
    /// The stored value.
    pub value: Object,
    /// Lifespan in milliseconds.
    pub lifespan: i64,
    /// Maximum idle time in milliseconds.
    pub max_idle: i64,
    /// Creation timestamp.
    pub created: u64,
    /// Last access timestamp.
    pub last_used: u64,
}

fn write_pair(output: &mut dyn ObjectOutput, key: &Object, value: &Object) -> Result<()> {
    output.write_object(Some(key.as_ref()))?;
    output.write_object(Some(value.as_ref()))
}

fn read_pair(input: &mut dyn ObjectInput) -> Result<(Object, Object)> {
    let key = read_required(input)?;
    let value = read_required(input)?;
    Ok((key, value))
}

/// Writes [`ImmortalCacheEntry`].
pub struct ImmortalCacheEntryExternalizer;

impl Externalizer for ImmortalCacheEntryExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<ImmortalCacheEntry>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::IMMORTAL_ENTRY.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let entry = expect_ref::<ImmortalCacheEntry>(obj)?;
        write_pair(output, &entry.key, &entry.value)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let (key, value) = read_pair(input)?;
        Ok(Box::new(ImmortalCacheEntry { key, value }))
    }
}

/// Writes [`MortalCacheEntry`].
pub struct MortalCacheEntryExternalizer;

impl Externalizer for MortalCacheEntryExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<MortalCacheEntry>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::MORTAL_ENTRY.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let entry = expect_ref::<MortalCacheEntry>(obj)?;
        write_pair(output, &entry.key, &entry.value)?;
        output.write_unsigned_long(entry.created)?;
        output.write_long(entry.lifespan)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let (key, value) = read_pair(input)?;
        let created = input.read_unsigned_long()?;
        let lifespan = input.read_long()?;
        Ok(Box::new(MortalCacheEntry {
            key,
            value,
            lifespan,
            created,
        }))
    }
}

/// Writes [`TransientCacheEntry`].
pub struct TransientCacheEntryExternalizer;

impl Externalizer for TransientCacheEntryExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<TransientCacheEntry>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::TRANSIENT_ENTRY.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let entry = expect_ref::<TransientCacheEntry>(obj)?;
        write_pair(output, &entry.key, &entry.value)?;
        output.write_unsigned_long(entry.last_used)?;
        output.write_long(entry.max_idle)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let (key, value) = read_pair(input)?;
        let last_used = input.read_unsigned_long()?;
        let max_idle = input.read_long()?;
        Ok(Box::new(TransientCacheEntry {
            key,
            value,
            max_idle,
            last_used,
        }))
    }
}

/// Writes [`TransientMortalCacheEntry`].
pub struct TransientMortalCacheEntryExternalizer;

impl Externalizer for TransientMortalCacheEntryExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<TransientMortalCacheEntry>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::TRANSIENT_MORTAL_ENTRY.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let entry = expect_ref::<TransientMortalCacheEntry>(obj)?;
        write_pair(output, &entry.key, &entry.value)?;
        output.write_unsigned_long(entry.created)?;
        output.write_long(entry.lifespan)?;
        output.write_unsigned_long(entry.last_used)?;
        output.write_long(entry.max_idle)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let (key, value) = read_pair(input)?;
        let created = input.read_unsigned_long()?;
        let lifespan = input.read_long()?;
        let last_used = input.read_unsigned_long()?;
        let max_idle = input.read_long()?;
        Ok(Box::new(TransientMortalCacheEntry {
            key,
            value,
            lifespan,
            max_idle,
            created,
            last_used,
        }))
    }
}

/// Writes [`MetadataImmortalCacheEntry`].
pub struct MetadataImmortalCacheEntryExternalizer;

impl Externalizer for MetadataImmortalCacheEntryExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<MetadataImmortalCacheEntry>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::METADATA_IMMORTAL_ENTRY.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let entry = expect_ref::<MetadataImmortalCacheEntry>(obj)?;
        write_pair(output, &entry.key, &entry.value)?;
        EmbeddedMetadataExternalizer::write_fields(output, &entry.metadata)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let (key, value) = read_pair(input)?;
        let metadata = EmbeddedMetadataExternalizer::read_fields(input)?;
        Ok(Box::new(MetadataImmortalCacheEntry {
            key,
            value,
            metadata,
        }))
    }
}

/// Writes [`ImmortalCacheValue`].
pub struct ImmortalCacheValueExternalizer;

impl Externalizer for ImmortalCacheValueExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<ImmortalCacheValue>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::IMMORTAL_VALUE.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let value = expect_ref::<ImmortalCacheValue>(obj)?;
        output.write_object(Some(value.value.as_ref()))
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(ImmortalCacheValue {
            value: read_required(input)?,
        }))
    }
}

/// Writes [`MortalCacheValue`].
pub struct MortalCacheValueExternalizer;

impl Externalizer for MortalCacheValueExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<MortalCacheValue>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::MORTAL_VALUE.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let value = expect_ref::<MortalCacheValue>(obj)?;
        output.write_object(Some(value.value.as_ref()))?;
        output.write_unsigned_long(value.created)?;
        output.write_long(value.lifespan)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let value = read_required(input)?;
        let created = input.read_unsigned_long()?;
        let lifespan = input.read_long()?;
        Ok(Box::new(MortalCacheValue {
            value,
            lifespan,
            created,
        }))
    }
}

/// Writes [`TransientCacheValue`].
pub struct TransientCacheValueExternalizer;

impl Externalizer for TransientCacheValueExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<TransientCacheValue>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::TRANSIENT_VALUE.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let value = expect_ref::<TransientCacheValue>(obj)?;
        output.write_object(Some(value.value.as_ref()))?;
        output.write_unsigned_long(value.last_used)?;
        output.write_long(value.max_idle)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let value = read_required(input)?;
        let last_used = input.read_unsigned_long()?;
        let max_idle = input.read_long()?;
        Ok(Box::new(TransientCacheValue {
            value,
            max_idle,
            last_used,
        }))
    }
}

/// Writes [`TransientMortalCacheValue`].
pub struct TransientMortalCacheValueExternalizer;

impl Externalizer for TransientMortalCacheValueExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<TransientMortalCacheValue>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::TRANSIENT_MORTAL_VALUE.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let value = expect_ref::<TransientMortalCacheValue>(obj)?;
        output.write_object(Some(value.value.as_ref()))?;
        output.write_unsigned_long(value.created)?;
        output.write_long(value.lifespan)?;
        output.write_unsigned_long(value.last_used)?;
        output.write_long(value.max_idle)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let value = read_required(input)?;
        let created = input.read_unsigned_long()?;
        let lifespan = input.read_long()?;
        let last_used = input.read_unsigned_long()?;
        let max_idle = input.read_long()?;
        Ok(Box::new(TransientMortalCacheValue {
            value,
            lifespan,
            max_idle,
            created,
            last_used,
        }))
    }
}
