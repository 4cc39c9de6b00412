//! Responses returned by remote commands.

use std::any::TypeId;

use crate::error::Result;
use crate::serialization::ids;
use crate::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};

/// The command ran and produced an optional value.
#[derive(Debug, PartialEq)]
pub struct SuccessfulResponse {
    /// Value returned by the command.
    pub value: Option<Object>,
}

impl SuccessfulResponse {
    /// A successful response without a value.
    pub fn empty() -> Self {
        Self { value: None }
    }

    /// A successful response carrying `value`.
    pub fn with_value(value: impl Marshallable) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }
}

/// The command ran but did not succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnsuccessfulResponse;

/// The target could not tell whether the command applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnsureResponse;

/// The cache does not exist on the target member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheNotFoundResponse;

/// The command failed with an error on the target member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionResponse {
    /// Error description reported by the target.
    pub message: String,
}

/// Writes [`SuccessfulResponse`].
pub struct SuccessfulResponseExternalizer;

impl Externalizer for SuccessfulResponseExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<SuccessfulResponse>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::SUCCESSFUL_RESPONSE.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let response = expect_ref::<SuccessfulResponse>(obj)?;
        output.write_object(response.value.as_deref())
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(SuccessfulResponse {
            value: input.read_object()?,
        }))
    }
}

/// Writes the payload-free responses.
///
/// Each of them is fully described by its id, so nothing follows it on the
/// wire.
pub struct StatelessResponseExternalizer<T> {
    id: u8,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> StatelessResponseExternalizer<T> {
    const fn with_id(id: u8) -> Self {
        Self {
            id,
            _marker: std::marker::PhantomData,
        }
    }
}

impl StatelessResponseExternalizer<UnsuccessfulResponse> {
    /// Externalizer for [`UnsuccessfulResponse`].
    pub const fn unsuccessful() -> Self {
        Self::with_id(ids::UNSUCCESSFUL_RESPONSE)
    }
}

impl StatelessResponseExternalizer<UnsureResponse> {
    /// Externalizer for [`UnsureResponse`].
    pub const fn unsure() -> Self {
        Self::with_id(ids::UNSURE_RESPONSE)
    }
}

impl StatelessResponseExternalizer<CacheNotFoundResponse> {
    /// Externalizer for [`CacheNotFoundResponse`].
    pub const fn cache_not_found() -> Self {
        Self::with_id(ids::CACHE_NOT_FOUND_RESPONSE)
    }
}

impl<T> Externalizer for StatelessResponseExternalizer<T>
where
    T: Marshallable + Default,
{
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn id(&self) -> Option<i32> {
        Some(self.id.into())
    }

    fn write_object(&self, _output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        expect_ref::<T>(obj).map(|_| ())
    }

    fn read_object(&self, _input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(T::default()))
    }
}

/// Writes [`ExceptionResponse`].
pub struct ExceptionResponseExternalizer;

impl Externalizer for ExceptionResponseExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<ExceptionResponse>()]
    }

    fn id(&self) -> Option<i32> {
        Some(ids::EXCEPTION_RESPONSE.into())
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        output.write_string(&expect_ref::<ExceptionResponse>(obj)?.message)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(ExceptionResponse {
            message: input.read_string()?,
        }))
    }
}
