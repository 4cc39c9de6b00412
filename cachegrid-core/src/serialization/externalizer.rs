//! Externalizers and the object streams they write to and read from.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use super::object::{downcast, Marshallable, Object};
use super::{DataInput, DataOutput};
use crate::error::{CacheGridError, Result};

/// An output stream that can also write nested objects.
///
/// Nested objects go through the same type dispatch as top-level values, so
/// an externalizer never needs to know how its fields are encoded.
pub trait ObjectOutput: DataOutput {
    /// Writes a tagged, possibly absent, object.
    fn write_object(&mut self, obj: Option<&dyn Marshallable>) -> Result<()>;
}

/// An input stream that can also read nested objects.
pub trait ObjectInput: DataInput {
    /// Reads a tagged, possibly absent, object.
    fn read_object(&mut self) -> Result<Option<Object>>;
}

/// Codec for one or more runtime types.
///
/// Externalizers are stateless and shared between threads. Internal
/// externalizers always declare an [`id`](Externalizer::id); foreign ones may
/// instead receive their id from configuration.
pub trait Externalizer: Send + Sync + 'static {
    /// The runtime types this externalizer handles.
    fn type_ids(&self) -> Vec<TypeId>;

    /// The id this externalizer declares for itself, if any.
    fn id(&self) -> Option<i32> {
        None
    }

    /// Writes the payload of `obj`.
    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()>;

    /// Reads a payload previously written by [`write_object`](Self::write_object).
    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object>;

    /// Name used in logs and for annotated wire references.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Identifies the implementation, used to tell duplicate registrations
    /// of one externalizer from id conflicts between different ones.
    fn implementation_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// A registered externalizer together with the id it was registered under.
#[derive(Clone)]
pub struct ExternalizerAdapter {
    id: u8,
    foreign_id: Option<u32>,
    externalizer: Arc<dyn Externalizer>,
}

impl ExternalizerAdapter {
    /// Wraps an internal externalizer stored under `id`.
    pub fn internal(id: u8, externalizer: Arc<dyn Externalizer>) -> Self {
        Self {
            id,
            foreign_id: None,
            externalizer,
        }
    }

    /// Wraps a foreign externalizer. Its storage slot is `MAX_ID`.
    pub fn foreign(foreign_id: u32, externalizer: Arc<dyn Externalizer>) -> Self {
        Self {
            id: super::ids::MAX_ID,
            foreign_id: Some(foreign_id),
            externalizer,
        }
    }

    /// The storage slot id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The wire id of a foreign externalizer.
    pub fn foreign_id(&self) -> Option<u32> {
        self.foreign_id
    }

    /// Returns true if this adapter wraps a foreign externalizer.
    pub fn is_foreign(&self) -> bool {
        self.foreign_id.is_some()
    }

    /// The wrapped externalizer.
    pub fn externalizer(&self) -> &dyn Externalizer {
        self.externalizer.as_ref()
    }

    /// Returns true if both adapters use the same id and implementation.
    pub fn same_registration(&self, other: &ExternalizerAdapter) -> bool {
        self.id == other.id
            && self.foreign_id == other.foreign_id
            && self.externalizer.implementation_id() == other.externalizer.implementation_id()
    }

    pub(crate) fn write_object(
        &self,
        output: &mut dyn ObjectOutput,
        obj: &dyn Marshallable,
    ) -> Result<()> {
        self.externalizer.write_object(output, obj)
    }

    pub(crate) fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        self.externalizer.read_object(input)
    }
}

impl fmt::Debug for ExternalizerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalizerAdapter")
            .field("id", &self.id)
            .field("foreign_id", &self.foreign_id)
            .field("externalizer", &self.externalizer.name())
            .finish()
    }
}

/// Reads a nested object that must be present.
pub fn read_required(input: &mut dyn ObjectInput) -> Result<Object> {
    input.read_object()?.ok_or_else(|| {
        CacheGridError::Deserialization("unexpected null where a value is required".to_string())
    })
}

/// Reads a nested object that must be present and of type `T`.
pub fn read_typed<T: Marshallable>(input: &mut dyn ObjectInput) -> Result<T> {
    downcast(read_required(input)?)
}

/// Reads a nested object of type `T` that may be absent.
pub fn read_optional_typed<T: Marshallable>(input: &mut dyn ObjectInput) -> Result<Option<T>> {
    input.read_object()?.map(downcast).transpose()
}
