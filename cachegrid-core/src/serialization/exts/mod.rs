//! Built-in externalizers for standard library and utility types.

mod collections;
mod misc;

pub use collections::{ListExternalizer, MapExternalizer, OptionalExternalizer, SetExternalizer};
pub use misc::{
    KeyValuePair, KeyValuePairExternalizer, UuidExternalizer, WrappedBytes,
    WrappedBytesExternalizer,
};
