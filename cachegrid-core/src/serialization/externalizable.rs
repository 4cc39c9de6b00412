//! Types that write their own fields.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use super::externalizer::{Externalizer, ObjectInput, ObjectOutput};
use super::object::{expect_ref, Marshallable, Object};
use crate::error::Result;

/// A type that knows how to write and read its own fields.
///
/// Implementations are usually generated with `#[derive(Externalizable)]`
/// and registered through a [`FieldsExternalizer`], either as a foreign
/// externalizer or as the externalizer of an annotated type.
pub trait Externalizable: Marshallable + Sized {
    /// Writes the fields of `self`.
    fn write_external(&self, output: &mut dyn ObjectOutput) -> Result<()>;

    /// Reads a value written by [`write_external`](Self::write_external).
    fn read_external(input: &mut dyn ObjectInput) -> Result<Self>;
}

/// Adapts an [`Externalizable`] type to [`Externalizer`].
pub struct FieldsExternalizer<T> {
    id: Option<i32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FieldsExternalizer<T> {
    /// Creates an externalizer without a declared id.
    pub fn new() -> Self {
        Self {
            id: None,
            _marker: PhantomData,
        }
    }

    /// Creates an externalizer that declares `id`.
    pub fn with_id(id: i32) -> Self {
        Self {
            id: Some(id),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for FieldsExternalizer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FieldsExternalizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldsExternalizer")
            .field("type", &std::any::type_name::<T>())
            .field("id", &self.id)
            .finish()
    }
}

impl<T: Externalizable> Externalizer for FieldsExternalizer<T> {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn id(&self) -> Option<i32> {
        self.id
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        expect_ref::<T>(obj)?.write_external(output)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(T::read_external(input)?))
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
