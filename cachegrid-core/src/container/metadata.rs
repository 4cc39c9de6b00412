//! Entry versions and expiration metadata.

use std::any::TypeId;

use crate::error::Result;
use crate::serialization::ids;
use crate::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// A version backed by a single counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericVersion {
    /// The version counter.
    pub version: i64,
}

impl NumericVersion {
    /// Creates a version.
    pub fn new(version: i64) -> Self {
        Self { version }
    }
}

/// A version scoped to the topology it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimpleClusteredVersion {
    /// Topology in which the version was generated.
    pub topology_id: i32,
    /// The version counter.
    pub version: i64,
}

/// Expiration settings and version attached to a cache entry.
#[derive(Debug, PartialEq)]
pub struct EmbeddedMetadata {
    /// Lifespan in milliseconds, negative for none.
    pub lifespan: i64,
    /// Maximum idle time in milliseconds, negative for none.
    pub max_idle: i64,
    /// Entry version, if versioning is enabled.
    pub version: Option<Object>,
}

impl EmbeddedMetadata {
    /// Creates metadata without a version.
    pub fn new(lifespan: i64, max_idle: i64) -> Self {
        Self {
            lifespan,
            max_idle,
            version: None,
        }
    }

    /// Attaches a version.
    pub fn with_version(mut self, version: impl Marshallable) -> Self {
        self.version = Some(Box::new(version));
        self
    }
}

/// Writes [`NumericVersion`] as a single long.
pub struct NumericVersionExternalizer;

impl Externalizer for NumericVersionExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<NumericVersion>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::NUMERIC_VERSION.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        output.write_long(expect_ref::<NumericVersion>(obj)?.version)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(NumericVersion::new(input.read_long()?)))
    }
}

/// Writes [`SimpleClusteredVersion`].
pub struct SimpleClusteredVersionExternalizer;

impl Externalizer for SimpleClusteredVersionExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<SimpleClusteredVersion>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::SIMPLE_CLUSTERED_VERSION.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let version = expect_ref::<SimpleClusteredVersion>(obj)?;
        output.write_int(version.topology_id)?;
        output.write_long(version.version)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let topology_id = input.read_int()?;
        let version = input.read_long()?;
        Ok(Box::new(SimpleClusteredVersion {
            topology_id,
            version,
        }))
    }
}

/// Writes [`EmbeddedMetadata`].
pub struct EmbeddedMetadataExternalizer;

impl EmbeddedMetadataExternalizer {
    pub(crate) fn write_fields(
        output: &mut dyn ObjectOutput,
        metadata: &EmbeddedMetadata,
    ) -> Result<()> {
        output.write_long(metadata.lifespan)?;
        output.write_long(metadata.max_idle)?;
        output.write_object(metadata.version.as_deref())
    }

    pub(crate) fn read_fields(input: &mut dyn ObjectInput) -> Result<EmbeddedMetadata> {
        let lifespan = input.read_long()?;
        let max_idle = input.read_long()?;
        let version = input.read_object()?;
        Ok(EmbeddedMetadata {
            lifespan,
            max_idle,
            version,
        })
    }
}

impl Externalizer for EmbeddedMetadataExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<EmbeddedMetadata>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::EMBEDDED_METADATA.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        Self::write_fields(output, expect_ref::<EmbeddedMetadata>(obj)?)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(Self::read_fields(input)?))
    }
}
