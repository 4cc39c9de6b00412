//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::any::TypeId;

use cachegrid_core::serialization::{
    expect_ref, Externalizer, Marshallable, Object, ObjectInput, ObjectOutput,
};
use cachegrid_core::{GlobalMarshaller, Result, SerializationConfig};

/// Starts a marshaller with `config`.
pub fn started(config: SerializationConfig) -> GlobalMarshaller {
    let marshaller = GlobalMarshaller::new(config);
    marshaller.start().expect("marshaller failed to start");
    marshaller
}

/// Starts a marshaller with only the built-in externalizers.
pub fn default_marshaller() -> GlobalMarshaller {
    started(SerializationConfig::default())
}

/// Encodes `value` and decodes it back as the same type.
pub fn round_trip<T: Marshallable>(marshaller: &GlobalMarshaller, value: &T) -> T {
    let bytes = marshaller.to_bytes(value).expect("encode failed");
    marshaller.from_bytes(&bytes).expect("decode failed")
}

/// Encodes `value` and decodes it back as an untyped object.
pub fn round_trip_object(marshaller: &GlobalMarshaller, value: &dyn Marshallable) -> Object {
    let bytes = marshaller.object_to_bytes(Some(value)).expect("encode failed");
    marshaller
        .object_from_bytes(&bytes)
        .expect("decode failed")
        .expect("decoded null")
}

/// A point in the plane, written by [`PointExternalizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Foreign externalizer for [`Point`] declaring id 1000.
#[derive(Debug, Default)]
pub struct PointExternalizer;

impl Externalizer for PointExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Point>()]
    }

    fn id(&self) -> Option<i32> {
        Some(1000)
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        let point = expect_ref::<Point>(obj)?;
        output.write_int(point.x)?;
        output.write_int(point.y)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        let x = input.read_int()?;
        let y = input.read_int()?;
        Ok(Box::new(Point { x, y }))
    }
}

/// A second externalizer that also claims id 1000.
#[derive(Debug, Default)]
pub struct ClashingExternalizer;

impl Externalizer for ClashingExternalizer {
    fn type_ids(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Celsius>()]
    }

    fn id(&self) -> Option<i32> {
        Some(1000)
    }

    fn write_object(&self, output: &mut dyn ObjectOutput, obj: &dyn Marshallable) -> Result<()> {
        output.write_float(expect_ref::<Celsius>(obj)?.0)
    }

    fn read_object(&self, input: &mut dyn ObjectInput) -> Result<Object> {
        Ok(Box::new(Celsius(input.read_float()?)))
    }
}

/// A temperature, marshalled by the fallback marshaller in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Celsius(pub f32);
